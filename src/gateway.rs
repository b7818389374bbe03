//! The gRPC face of an [`ObjectStore`].

use crate::backend::ObjectStore;
use crate::config::{ContentPolicy, GatewayConfig};
use crate::interop::into_tonic_status;
use crate::proto::storage::{
    DownloadRequest, DownloadResponse, ListFilesRequest, ListFilesResponse, UploadRequest,
    UploadResponse,
};
use crate::server::{StorageService, StorageServiceServer};
use crate::tracing_shim::debug;
use crate::RpcResponse;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tonic::{Code, Request, Response, Status};

/// The message returned by a successful `Upload`.
pub const UPLOAD_MESSAGE: &str = "File uploaded successfully";

/// Forwards `ListFiles`, `Upload` and `Download` to one container of an object store.
///
/// Every request is a single call into the store. Nothing is cached, retried or validated beyond
/// the configured [`ContentPolicy`]; whatever names the store accepts, the gateway accepts.
#[must_use]
#[derive(Debug)]
pub struct StorageGateway<Store> {
    store: Store,
    config: GatewayConfig,
}

impl<Store> StorageGateway<Store>
where
    Store: ObjectStore,
{
    /// A gateway forwarding to `store` as described by `config`.
    #[inline]
    pub const fn new(store: Store, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// The store requests are forwarded to.
    #[inline]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// The configuration of this gateway.
    #[inline]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Wrap the gateway in a tonic service.
    #[inline]
    pub fn into_service(self) -> StorageServiceServer<Self> {
        StorageServiceServer::new(self)
    }

    /// Reject content the policy does not allow, failing with `code`.
    fn check_content(&self, content: &[u8], code: Code) -> Result<(), Status> {
        match self.config.content_policy() {
            ContentPolicy::Binary => Ok(()),
            ContentPolicy::Utf8 => std::str::from_utf8(content)
                .map(|_| ())
                .map_err(|err| Status::new(code, format!("content is not valid UTF-8: {err}"))),
        }
    }
}

#[tonic::async_trait]
impl<Store> StorageService for StorageGateway<Store>
where
    Store: ObjectStore,
{
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    async fn list_files(
        &self,
        _request: Request<ListFilesRequest>,
    ) -> RpcResponse<ListFilesResponse> {
        let file_names = self
            .store
            .list(self.config.container(), self.config.list_pattern())
            .await
            .map_err(into_tonic_status)?;
        debug!(count = file_names.len(), "listed files");
        Ok(Response::new(ListFilesResponse { file_names }))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(file_name = %request.get_ref().file_name))
    )]
    async fn upload(&self, request: Request<UploadRequest>) -> RpcResponse<UploadResponse> {
        let UploadRequest {
            file_name,
            file_content,
        } = request.into_inner();
        self.check_content(&file_content, Code::InvalidArgument)?;

        let mut writer = self
            .store
            .open_write(self.config.container(), &file_name)
            .await
            .map_err(into_tonic_status)?;
        writer
            .write_all(&file_content)
            .await
            .map_err(into_tonic_status)?;
        writer.shutdown().await.map_err(into_tonic_status)?;

        debug!(bytes = file_content.len(), "uploaded file");
        Ok(Response::new(UploadResponse {
            message: UPLOAD_MESSAGE.to_owned(),
        }))
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(file_name = %request.get_ref().file_name))
    )]
    async fn download(&self, request: Request<DownloadRequest>) -> RpcResponse<DownloadResponse> {
        let DownloadRequest { file_name } = request.into_inner();

        let mut reader = self
            .store
            .open_read(self.config.container(), &file_name)
            .await
            .map_err(into_tonic_status)?;
        let mut file_content = Vec::new();
        let _num_bytes = reader
            .read_to_end(&mut file_content)
            .await
            .map_err(into_tonic_status)?;
        self.check_content(&file_content, Code::DataLoss)?;

        debug!(bytes = file_content.len(), "downloaded file");
        Ok(Response::new(DownloadResponse { file_content }))
    }
}
