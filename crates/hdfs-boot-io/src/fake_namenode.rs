//! In-process WebHDFS NameNode for tests.
//!
//! Serves the subset of the REST API the WebHDFS client uses, backed by an
//! in-memory tree. Two-step writes answer with a `Location` pointing back at
//! the same server with `datanode=true`.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use url::Url;

/// User name the fake refuses with 403.
pub const DENIED_USER: &str = "denied";

#[derive(Default)]
struct Tree {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    requests: Vec<String>,
}

struct Request {
    method: String,
    url: Url,
    body: Vec<u8>,
}

pub struct FakeNameNode {
    addr: SocketAddr,
    tree: Arc<Mutex<Tree>>,
    shutdown: Arc<AtomicBool>,
}

impl FakeNameNode {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let mut tree = Tree::default();
        tree.dirs.insert("/".to_string());
        let tree = Arc::new(Mutex::new(tree));
        let shutdown = Arc::new(AtomicBool::new(false));

        let tree_clone = tree.clone();
        let shutdown_clone = shutdown.clone();
        thread::spawn(move || {
            listener
                .set_nonblocking(true)
                .expect("set_nonblocking failed");
            while !shutdown_clone.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let tree = tree_clone.clone();
                        thread::spawn(move || handle_connection(stream, addr, tree));
                    }
                    Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });
        FakeNameNode {
            addr,
            tree,
            shutdown,
        }
    }

    /// Value for `dfs.namenode.http-address`.
    pub fn http_address(&self) -> String {
        self.addr.to_string()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.tree.lock().unwrap().dirs.contains(path)
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.tree.lock().unwrap().files.get(path).cloned()
    }

    /// Every request seen so far as `METHOD path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.tree.lock().unwrap().requests.clone()
    }
}

impl Drop for FakeNameNode {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

fn handle_connection(stream: TcpStream, addr: SocketAddr, tree: Arc<Mutex<Tree>>) {
    stream.set_nonblocking(false).ok();
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok();
    let Ok(mut writer) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(stream);
    while let Ok(Some(request)) = read_request(&mut reader) {
        let (status, body) = respond(&request, addr, &tree);
        let header = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: keep-alive\r\n\r\n",
            status,
            reason(status),
            body.len()
        );
        if writer.write_all(header.as_bytes()).is_err() || writer.write_all(&body).is_err() {
            break;
        }
    }
}

fn read_request(reader: &mut BufReader<TcpStream>) -> io::Result<Option<Request>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };
    let method = method.to_string();
    let url = Url::parse(&format!("http://fake{}", target))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let mut content_length = 0usize;
    let mut chunked = false;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("transfer-encoding") {
                chunked = value.eq_ignore_ascii_case("chunked");
            }
        }
    }

    let mut body = Vec::new();
    if chunked {
        loop {
            let mut size = String::new();
            reader.read_line(&mut size)?;
            let size = usize::from_str_radix(size.trim(), 16).unwrap_or(0);
            let mut chunk = vec![0u8; size + 2];
            reader.read_exact(&mut chunk)?;
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    } else {
        body.resize(content_length, 0);
        reader.read_exact(&mut body)?;
    }
    Ok(Some(Request { method, url, body }))
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Bad Request",
    }
}

fn parent(path: &str) -> String {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((p, _)) => p.to_string(),
    }
}

fn add_ancestors(tree: &mut Tree, path: &str) {
    let mut p = path.to_string();
    while p != "/" {
        tree.dirs.insert(p.clone());
        p = parent(&p);
    }
}

fn json_body(value: Value) -> Vec<u8> {
    value.to_string().into_bytes()
}

fn not_found(path: &str) -> (u16, Vec<u8>) {
    (
        404,
        json_body(json!({
            "RemoteException": {
                "exception": "FileNotFoundException",
                "message": format!("File does not exist: {}", path),
            }
        })),
    )
}

fn status_json(kind: &str, length: usize, suffix: &str) -> Value {
    json!({ "pathSuffix": suffix, "type": kind, "length": length })
}

fn respond(request: &Request, addr: SocketAddr, tree: &Mutex<Tree>) -> (u16, Vec<u8>) {
    let mut tree = tree.lock().unwrap();
    let path = request
        .url
        .path()
        .strip_prefix("/webhdfs/v1")
        .filter(|p| !p.is_empty())
        .unwrap_or("/")
        .to_string();
    let query: BTreeMap<String, String> = request.url.query_pairs().into_owned().collect();
    tree.requests.push(format!(
        "{} {}?{}",
        request.method,
        path,
        request.url.query().unwrap_or("")
    ));

    if query.get("user.name").map(String::as_str) == Some(DENIED_USER) {
        return (403, json_body(json!({ "RemoteException": { "exception": "AccessControlException" } })));
    }
    let op = query.get("op").map(String::as_str).unwrap_or("");
    let datanode = query.contains_key("datanode");

    match (request.method.as_str(), op) {
        ("GET", "GETFILESTATUS") => {
            if tree.dirs.contains(&path) {
                (200, json_body(json!({ "FileStatus": status_json("DIRECTORY", 0, "") })))
            } else if let Some(data) = tree.files.get(&path) {
                (200, json_body(json!({ "FileStatus": status_json("FILE", data.len(), "") })))
            } else {
                not_found(&path)
            }
        }
        ("PUT", "MKDIRS") => {
            add_ancestors(&mut tree, &path);
            (200, json_body(json!({ "boolean": true })))
        }
        ("GET", "LISTSTATUS") => {
            if !tree.dirs.contains(&path) {
                return not_found(&path);
            }
            let mut entries: Vec<(String, Value)> = Vec::new();
            for d in tree.dirs.iter().filter(|d| *d != "/" && parent(d) == path) {
                let name = d.rsplit('/').next().unwrap_or("").to_string();
                entries.push((name.clone(), status_json("DIRECTORY", 0, &name)));
            }
            for (f, data) in tree.files.iter().filter(|(f, _)| parent(f) == path) {
                let name = f.rsplit('/').next().unwrap_or("").to_string();
                entries.push((name.clone(), status_json("FILE", data.len(), &name)));
            }
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let statuses: Vec<Value> = entries.into_iter().map(|(_, v)| v).collect();
            (200, json_body(json!({ "FileStatuses": { "FileStatus": statuses } })))
        }
        ("GET", "OPEN") => match tree.files.get(&path) {
            Some(data) => (200, data.clone()),
            None => not_found(&path),
        },
        ("DELETE", "DELETE") => {
            let removed = tree.files.remove(&path).is_some() || tree.dirs.remove(&path);
            (200, json_body(json!({ "boolean": removed })))
        }
        ("PUT", "CREATE") | ("POST", "APPEND") if !datanode => {
            if op == "APPEND" && !tree.files.contains_key(&path) {
                return not_found(&path);
            }
            let mut location = request.url.clone();
            location.set_scheme("http").ok();
            location.set_host(Some(&addr.ip().to_string())).ok();
            location.set_port(Some(addr.port())).ok();
            location.query_pairs_mut().append_pair("datanode", "true");
            (200, json_body(json!({ "Location": location.as_str() })))
        }
        ("PUT", "CREATE") => {
            add_ancestors(&mut tree, &parent(&path));
            tree.files.insert(path, request.body.clone());
            (201, Vec::new())
        }
        ("POST", "APPEND") => match tree.files.get_mut(&path) {
            Some(data) => {
                data.extend_from_slice(&request.body);
                (200, Vec::new())
            }
            None => not_found(&path),
        },
        _ => (400, json_body(json!({ "RemoteException": { "exception": "IllegalArgumentException" } }))),
    }
}
