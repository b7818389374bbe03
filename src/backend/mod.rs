//! Object stores the gateway forwards to.
//!
//! [`ObjectStore`] is the only thing the gateway knows about storage. Three implementations are
//! provided:
//!
//! - [`MemoryStore`] keeps blobs in process memory.
//! - [`FsStore`] keeps each container as a directory on disk.
//! - [`SqliteStore`] keeps every container in one SQLite database (feature `sqlite`).

mod fs;
mod helpers;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use self::fs::{FsStore, FsWriter};
pub use self::helpers::CommitOnClose;
pub use self::memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use self::sqlite::SqliteStore;
use crate::config::Container;
use crate::pattern::ListPattern;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tonic::async_trait;

/// An error returned by an [`ObjectStore`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The blob does not exist.
    #[error("blob {name:?} not found in container {container}")]
    NotFound {
        /// The container that was searched.
        container: Container,
        /// The name of the missing blob.
        name: String,
    },
    /// The container does not exist.
    #[error("container {0} not found")]
    ContainerNotFound(Container),
    /// The store cannot address a blob by this name.
    #[error("blob name {name:?} {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },
    /// An I/O error from the store or one of its handles.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// An error from SQLite.
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// A store of named blobs grouped into containers.
///
/// Reads and writes go through handles. A write handle makes its content visible only once it
/// has been shut down; dropping it before then discards everything written.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// A handle reading one blob.
    type Reader: AsyncRead + Send + Unpin + 'static;
    /// A handle writing one blob.
    type Writer: AsyncWrite + Send + Unpin + 'static;

    /// Create a container if it does not already exist.
    async fn create_container(&self, container: &Container) -> Result<(), StoreError>;

    /// The names of all blobs in `container` matching `pattern`, in lexicographic order.
    async fn list(
        &self,
        container: &Container,
        pattern: &ListPattern,
    ) -> Result<Vec<String>, StoreError>;

    /// Open a blob for reading. Fails with [`StoreError::NotFound`] if it does not exist.
    async fn open_read(&self, container: &Container, name: &str)
        -> Result<Self::Reader, StoreError>;

    /// Open a blob for writing, replacing any existing blob with the same name once the handle
    /// is shut down.
    async fn open_write(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Self::Writer, StoreError>;
}
