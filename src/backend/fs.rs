use crate::backend::{ObjectStore, StoreError};
use crate::config::Container;
use crate::pattern::ListPattern;
use crate::tracing_shim::warn;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{ready, Context, Poll};
use tokio::fs::{self, File};
use tokio::io::AsyncWrite;
use tonic::async_trait;

/// Directory under the root that holds writes which have not been committed yet. Container names
/// cannot start with `.`, so this never collides with a container.
const STAGING_DIR: &str = ".staging";

static NEXT_STAGING_ID: AtomicU64 = AtomicU64::new(0);

/// An object store on the local file system.
///
/// Each container is a directory directly under the root, and each blob is a file within it. A
/// `/` in a blob name maps to a subdirectory, mirroring virtual directories in cloud object
/// stores.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// A store rooted at `root`. The directory is created along with the first container.
    #[inline]
    pub fn new<P>(root: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { root: root.into() }
    }

    /// The directory containing all containers.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_dir(&self, container: &Container) -> PathBuf {
        self.root.join(container.as_str())
    }

    /// The directory of an existing container.
    async fn existing_container_dir(&self, container: &Container) -> Result<PathBuf, StoreError> {
        let dir = self.container_dir(container);
        match fs::metadata(&dir).await {
            Ok(metadata) if metadata.is_dir() => Ok(dir),
            Ok(_) => Err(StoreError::ContainerNotFound(container.clone())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::ContainerNotFound(container.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Map a blob name onto a relative path, rejecting names that would escape the container or
/// that no file could have.
fn relative_path(name: &str) -> Result<PathBuf, StoreError> {
    let invalid = |reason| StoreError::InvalidName {
        name: name.to_owned(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("is empty"));
    }
    if name.contains(['\\', '\0']) {
        return Err(invalid("contains a character not allowed in file names"));
    }

    let mut path = PathBuf::new();
    for segment in name.split('/') {
        match segment {
            "" => return Err(invalid("contains an empty path segment")),
            "." | ".." => return Err(invalid("contains a relative path component")),
            segment => path.push(segment),
        }
    }
    Ok(path)
}

#[async_trait]
impl ObjectStore for FsStore {
    type Reader = File;
    type Writer = FsWriter;

    async fn create_container(&self, container: &Container) -> Result<(), StoreError> {
        fs::create_dir_all(self.container_dir(container)).await?;
        Ok(())
    }

    async fn list(
        &self,
        container: &Container,
        pattern: &ListPattern,
    ) -> Result<Vec<String>, StoreError> {
        let dir = self.existing_container_dir(container).await?;

        let mut names = Vec::new();
        let mut pending = vec![(dir, String::new())];
        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else {
                    warn!(path = ?entry.path(), "skipping file with non-UTF-8 name");
                    continue;
                };
                let name = format!("{prefix}{file_name}");
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), format!("{name}/")));
                } else if file_type.is_file() && pattern.matches(&name) {
                    names.push(name);
                }
            }
        }
        names.sort_unstable();
        Ok(names)
    }

    async fn open_read(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Self::Reader, StoreError> {
        let path = self
            .existing_container_dir(container)
            .await?
            .join(relative_path(name)?);
        let not_found = || StoreError::NotFound {
            container: container.clone(),
            name: name.to_owned(),
        };

        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(File::open(&path).await?),
            Ok(_) => Err(not_found()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(err) => Err(err.into()),
        }
    }

    async fn open_write(
        &self,
        container: &Container,
        name: &str,
    ) -> Result<Self::Writer, StoreError> {
        let target = self
            .existing_container_dir(container)
            .await?
            .join(relative_path(name)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let staging_dir = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging_dir).await?;
        let staging = staging_dir.join(format!(
            "{}-{}",
            std::process::id(),
            NEXT_STAGING_ID.fetch_add(1, Ordering::Relaxed)
        ));
        let file = File::create(&staging).await?;

        Ok(FsWriter {
            file,
            staging,
            target: Some(target),
        })
    }
}

/// A write handle of an [`FsStore`].
///
/// Content is written to a staging file that is renamed over the blob on shutdown, so readers
/// see either the old content or the new content in full.
#[derive(Debug)]
pub struct FsWriter {
    file: File,
    staging: PathBuf,
    /// `None` once committed.
    target: Option<PathBuf>,
}

impl AsyncWrite for FsWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.target.is_none() {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "blob handle already closed",
            )));
        }
        Pin::new(&mut this.file).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(Pin::new(&mut this.file).poll_shutdown(cx))?;
        // The target is only cleared once committed, so a failed rename is cleaned up on drop.
        if let Some(target) = &this.target {
            std::fs::rename(&this.staging, target)?;
            this.target = None;
        }
        Poll::Ready(Ok(()))
    }
}

impl Drop for FsWriter {
    fn drop(&mut self) {
        if self.target.is_some() {
            if let Err(_err) = std::fs::remove_file(&self.staging) {
                warn!(path = ?self.staging, err = %_err, "failed to remove uncommitted blob");
            }
        }
    }
}
