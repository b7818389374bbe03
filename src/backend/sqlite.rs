use crate::backend::{CommitOnClose, ObjectStore, StoreError};
use crate::config::Container;
use crate::pattern::ListPattern;
use crate::Location;
use rusqlite::{Connection, OptionalExtension as _};
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tonic::async_trait;

fn lock(connection: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    connection.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An object store kept in a single SQLite database.
///
/// Clones share one connection. For [`Location::InMemory`], the database lives as long as the
/// last clone.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    location: Location,
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (and create if necessary) a store at the given location.
    pub fn at_location(location: Location) -> Result<Self, StoreError> {
        let connection = match &location {
            Location::InMemory => Connection::open_in_memory()?,
            Location::OnDisk { path } => Connection::open(path)?,
        };
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS container(
                name TEXT PRIMARY KEY NOT NULL
            );
            CREATE TABLE IF NOT EXISTS blob(
                container TEXT NOT NULL REFERENCES container(name),
                name TEXT NOT NULL,
                data BLOB NOT NULL,
                PRIMARY KEY (container, name)
            );",
        )?;
        Ok(Self {
            location,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Open (and create if necessary) a store in the database file at `path`.
    #[inline]
    pub fn at_path<P>(path: P) -> Result<Self, StoreError>
    where
        P: Into<PathBuf>,
    {
        Self::at_location(Location::OnDisk { path: path.into() })
    }

    /// A store that is never written to disk.
    #[inline]
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::at_location(Location::InMemory)
    }

    /// Where the database is kept.
    #[inline]
    pub const fn location(&self) -> &Location {
        &self.location
    }
}

fn ensure_container(connection: &Connection, container: &Container) -> Result<(), StoreError> {
    let exists: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM container WHERE name = ?)",
        [container.as_str()],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::ContainerNotFound(container.clone()))
    }
}

#[async_trait]
impl ObjectStore for SqliteStore {
    type Reader = Cursor<Vec<u8>>;
    type Writer = CommitOnClose;

    async fn create_container(&self, container: &Container) -> Result<(), StoreError> {
        let _rows_changed = lock(&self.connection).execute(
            "INSERT OR IGNORE INTO container(name) VALUES (?)",
            [container.as_str()],
        )?;
        Ok(())
    }

    async fn list(
        &self,
        container: &Container,
        pattern: &ListPattern,
    ) -> Result<Vec<String>, StoreError> {
        let connection = lock(&self.connection);
        ensure_container(&connection, container)?;

        let mut statement =
            connection.prepare("SELECT name FROM blob WHERE container = ? ORDER BY name")?;
        let names = statement.query_map([container.as_str()], |row| row.get::<_, String>(0))?;

        let mut matching = Vec::new();
        for name in names {
            let name = name?;
            if pattern.matches(&name) {
                matching.push(name);
            }
        }
        Ok(matching)
    }

    async fn open_read(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Self::Reader, StoreError> {
        let connection = lock(&self.connection);
        ensure_container(&connection, container)?;

        let data: Option<Vec<u8>> = connection
            .query_row(
                "SELECT data FROM blob WHERE container = ? AND name = ?",
                [container.as_str(), name],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(data) => Ok(Cursor::new(data)),
            None => Err(StoreError::NotFound {
                container: container.clone(),
                name: name.to_owned(),
            }),
        }
    }

    async fn open_write(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Self::Writer, StoreError> {
        ensure_container(&lock(&self.connection), container)?;

        let connection = Arc::clone(&self.connection);
        let container = container.clone();
        let name = name.to_owned();
        Ok(CommitOnClose::new(move |data| {
            let _rows_changed = lock(&connection)
                .execute(
                    "INSERT INTO blob(container, name, data) VALUES (?1, ?2, ?3)
                    ON CONFLICT(container, name) DO UPDATE SET data = excluded.data",
                    (container.as_str(), name.as_str(), data),
                )
                .map_err(io::Error::other)?;
            Ok(())
        }))
    }
}
