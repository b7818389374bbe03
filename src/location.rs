use std::path::PathBuf;

/// Where a database-backed object store keeps its data.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    /// In memory, for as long as the store is alive. This is useful for tests and short-lived
    /// gateways.
    InMemory,
    /// A database file on disk. This is permitted to be on a network file system, if desired.
    OnDisk {
        /// The path to the database file.
        path: PathBuf,
    },
}

impl<T> From<T> for Location
where
    T: Into<PathBuf>,
{
    fn from(path: T) -> Self {
        Self::OnDisk { path: path.into() }
    }
}
