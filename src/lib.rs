//! A gRPC gateway over a single container of an object store.
//!
//! The gateway exposes three unary RPCs: `ListFiles`, `Upload` and `Download`. Each one is a
//! single call into an [`ObjectStore`](crate::backend::ObjectStore). The store is swappable
//! without touching the gateway; [`backend`] ships in-memory, on-disk and SQLite
//! implementations.

pub mod backend;
pub mod config;
mod gateway;
pub mod interop;
mod location;
pub mod pattern;
mod tracing_shim;
pub mod transitive;

/// Protobuf messages and services generated from `proto/storage.proto`.
pub mod proto {
    /// The `storage.v1` package.
    #[allow(
        missing_docs,
        clippy::missing_docs_in_private_items,
        unreachable_pub,
        unused_qualifications,
        unused_results
    )]
    pub mod storage {
        tonic::include_proto!("storage.v1");
    }
}

/// gRPC clients.
pub mod client {
    pub use crate::proto::storage::storage_service_client::StorageServiceClient;
}

/// gRPC servers.
pub mod server {
    pub use crate::proto::storage::storage_service_server::{
        StorageService, StorageServiceServer,
    };
}

pub use self::config::{Container, ContentPolicy, GatewayConfig};
pub use self::gateway::{StorageGateway, UPLOAD_MESSAGE};
pub use self::location::Location;

/// The response of a unary RPC.
pub type RpcResponse<T> = Result<tonic::Response<T>, tonic::Status>;
