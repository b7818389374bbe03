use anyhow::Result;
use blobgate::backend::ObjectStore;
use blobgate::client::StorageServiceClient;
use blobgate::proto::storage::{
    DownloadRequest, DownloadResponse, ListFilesRequest, ListFilesResponse, UploadRequest,
    UploadResponse,
};
use blobgate::transitive::{storage_client, Transitive};
use blobgate::{Container, GatewayConfig};
use tempfile::TempDir;
use tonic::transport::Channel;

pub(crate) const CONTAINER: &str = "files";

pub(crate) fn config() -> Result<GatewayConfig> {
    Ok(GatewayConfig::new(Container::new(CONTAINER)?))
}

/// A client connected to a gateway over a freshly created container.
pub(crate) struct Fixture {
    pub(crate) client: Transitive<StorageServiceClient<Channel>>,
    /// Keeps on-disk stores alive until the test ends.
    _dir: Option<TempDir>,
}

impl Fixture {
    pub(crate) async fn new<Store>(store: Store, dir: Option<TempDir>) -> Result<Self>
    where
        Store: ObjectStore,
    {
        Self::with_config(store, dir, config()?).await
    }

    pub(crate) async fn with_config<Store>(
        store: Store,
        dir: Option<TempDir>,
        config: GatewayConfig,
    ) -> Result<Self>
    where
        Store: ObjectStore,
    {
        store.create_container(config.container()).await?;
        Ok(Self {
            client: storage_client(store, config).await?,
            _dir: dir,
        })
    }

    pub(crate) async fn upload(&mut self, file_name: &str, file_content: &[u8]) -> Result<String> {
        let UploadResponse { message } = self
            .client
            .upload(UploadRequest {
                file_name: file_name.to_owned(),
                file_content: file_content.to_vec(),
            })
            .await?
            .into_inner();
        Ok(message)
    }

    pub(crate) async fn download(&mut self, file_name: &str) -> Result<Vec<u8>, tonic::Status> {
        let DownloadResponse { file_content } = self
            .client
            .download(DownloadRequest {
                file_name: file_name.to_owned(),
            })
            .await?
            .into_inner();
        Ok(file_content)
    }

    pub(crate) async fn list(&mut self) -> Result<Vec<String>, tonic::Status> {
        let ListFilesResponse { file_names } = self
            .client
            .list_files(ListFilesRequest {})
            .await?
            .into_inner();
        Ok(file_names)
    }
}
