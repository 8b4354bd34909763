//! Bootstraps a filesystem client and lists its working directory.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use hdfs_boot::{Bootstrapper, Profile};

#[derive(Parser, Debug)]
#[command(name = "hdfs-boot-probe", about = "Check that a filesystem client can be bootstrapped")]
struct Cli {
    /// Profile to bootstrap (cloud, environment, local); defaults to HDFS_BOOT_PROFILE
    #[arg(long)]
    profile: Option<Profile>,

    /// env_logger-style filter string; overrides RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,
}

const DEFAULT_LOG_FILTER: &str = "info";

fn init_logging(cli_filter: Option<&str>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER));
    if let Some(filter) = cli_filter {
        builder.parse_filters(filter);
    }
    builder.format_timestamp_secs();
    builder.init();
}

fn run(cli: &Cli) -> hdfs_boot::Result<()> {
    let mut boot = Bootstrapper::from_process_env();
    let profile = match cli.profile {
        Some(p) => p,
        None => boot.profile()?,
    };
    let handle = boot.bootstrap(profile)?;

    println!("profile:     {}", profile);
    println!("user:        {}", handle.acting_user());
    println!("working dir: {}", handle.working_directory());
    for entry in handle.file_system().list_status(".")? {
        let kind = if entry.is_dir { "d" } else { "-" };
        println!("{} {:>12} {}", kind, entry.length, entry.path);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_filter.as_deref());
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("hdfs-boot-probe: {}", e);
            ExitCode::FAILURE
        }
    }
}
