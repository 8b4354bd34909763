//! The bootstrap result.

use std::fmt;
use std::sync::Arc;

use crate::embedded::EmbeddedCluster;
use crate::vfs::FileSystem;

/// An opened, already authenticated client anchored at its working
/// directory.
///
/// The working directory existed when the handle was built and is where
/// relative paths issued through [`ClientHandle::file_system`] land. The
/// handle is immutable; clones share the same client. A handle from the
/// local profile keeps its embedded cluster alive until the last clone is
/// dropped.
#[derive(Clone)]
pub struct ClientHandle {
    client: Arc<dyn FileSystem>,
    acting_user: String,
    working_directory: String,
    service: Option<Arc<EmbeddedCluster>>,
}

impl ClientHandle {
    pub(crate) fn new(
        client: Box<dyn FileSystem>,
        acting_user: String,
        working_directory: String,
        service: Option<Arc<EmbeddedCluster>>,
    ) -> Self {
        ClientHandle {
            client: Arc::from(client),
            acting_user,
            working_directory,
            service,
        }
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.client.as_ref()
    }

    pub fn acting_user(&self) -> &str {
        &self.acting_user
    }

    /// The target location the handle is rooted at.
    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    /// Qualified path of `name` inside the working directory.
    pub fn path(&self, name: &str) -> String {
        self.client.make_qualified(name)
    }

    pub fn embedded_cluster(&self) -> Option<&EmbeddedCluster> {
        self.service.as_deref()
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("uri", &self.client.uri())
            .field("acting_user", &self.acting_user)
            .field("working_directory", &self.working_directory)
            .field("embedded", &self.service.is_some())
            .finish()
    }
}
