//! Conversion of store errors into gRPC statuses.

use crate::backend::StoreError;
use std::io;
use std::sync::Arc;
use tonic::{Code, Status};

/// An error that can be returned to a gRPC caller.
pub trait IntoTonicStatus {
    /// Convert the error into a status. The original error is kept as the status's source.
    fn into_tonic_status(self) -> Status;
}

impl IntoTonicStatus for StoreError {
    fn into_tonic_status(self) -> Status {
        let code = match &self {
            Self::NotFound { .. } | Self::ContainerNotFound(_) => Code::NotFound,
            Self::InvalidName { .. } => Code::InvalidArgument,
            Self::Io(err) => match err.kind() {
                io::ErrorKind::NotFound => Code::NotFound,
                io::ErrorKind::PermissionDenied => Code::PermissionDenied,
                _ => Code::Internal,
            },
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => Code::Internal,
        };
        let mut status = Status::new(code, self.to_string());
        status.set_source(Arc::new(self));
        status
    }
}

impl IntoTonicStatus for io::Error {
    fn into_tonic_status(self) -> Status {
        StoreError::Io(self).into_tonic_status()
    }
}

/// Shorthand for `map_err(into_tonic_status)`.
pub(crate) fn into_tonic_status<E>(err: E) -> Status
where
    E: IntoTonicStatus,
{
    err.into_tonic_status()
}
