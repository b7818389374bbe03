use crate::backend::{CommitOnClose, ObjectStore, StoreError};
use crate::config::Container;
use crate::pattern::ListPattern;
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tonic::async_trait;

type Containers = BTreeMap<Container, BTreeMap<String, Vec<u8>>>;

fn lock(containers: &Mutex<Containers>) -> MutexGuard<'_, Containers> {
    containers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An object store held in process memory.
///
/// Clones share the same blobs. Everything is lost when the last clone is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    containers: Arc<Mutex<Containers>>,
}

impl MemoryStore {
    /// An empty store with no containers.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    type Reader = Cursor<Vec<u8>>;
    type Writer = CommitOnClose;

    async fn create_container(&self, container: &Container) -> Result<(), StoreError> {
        let mut containers = lock(&self.containers);
        let _blobs = containers.entry(container.clone()).or_default();
        Ok(())
    }

    async fn list(
        &self,
        container: &Container,
        pattern: &ListPattern,
    ) -> Result<Vec<String>, StoreError> {
        let containers = lock(&self.containers);
        let blobs = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.clone()))?;
        Ok(blobs
            .keys()
            .filter(|name| pattern.matches(name))
            .cloned()
            .collect())
    }

    async fn open_read(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Self::Reader, StoreError> {
        let containers = lock(&self.containers);
        let blobs = containers
            .get(container)
            .ok_or_else(|| StoreError::ContainerNotFound(container.clone()))?;
        match blobs.get(name) {
            Some(bytes) => Ok(Cursor::new(bytes.clone())),
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
        if !lock(&self.containers).contains_key(container) {
            return Err(StoreError::ContainerNotFound(container.clone()));
        }

        let containers = Arc::clone(&self.containers);
        let container = container.clone();
        let name = name.to_owned();
        Ok(CommitOnClose::new(move |bytes| {
            match lock(&containers).get_mut(&container) {
                Some(blobs) => {
                    let _previous = blobs.insert(name, bytes);
                    Ok(())
                }
                None => Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    StoreError::ContainerNotFound(container),
                )),
            }
        }))
    }
}
