//! A client and server in the same process, joined by an in-memory pipe.
//!
//! This lets the gRPC surface be driven without binding a socket, which is what the command-line
//! client does when no remote address is given.

use crate::backend::ObjectStore;
use crate::client::StorageServiceClient;
use crate::config::GatewayConfig;
use crate::gateway::StorageGateway;
use crate::tracing_shim::{info_span, warn, Instrument as _};
use hyper_util::rt::TokioIo;
use std::ops::{Deref, DerefMut};
use tonic::transport::{Channel, Endpoint, Server};

const DUPLEX_SIZE: usize = 64 * 1024;

/// A client whose server runs on a background task of the current runtime.
// TODO shut the server down when the client is dropped instead of when the runtime is
#[derive(Debug)]
pub struct Transitive<T> {
    client: T,
}

impl<T> Transitive<T> {
    /// The client, detached from this wrapper. The server keeps running.
    #[inline]
    pub fn into_inner(self) -> T {
        self.client
    }
}

impl<T> Deref for Transitive<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl<T> DerefMut for Transitive<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.client
    }
}

/// Serve a gateway over `store` on a background task and connect a client to it.
pub async fn storage_client<Store>(
    store: Store,
    config: GatewayConfig,
) -> Result<Transitive<StorageServiceClient<Channel>>, tonic::transport::Error>
where
    Store: ObjectStore,
{
    let (client, server) = tokio::io::duplex(DUPLEX_SIZE);
    let span = info_span!("transitive_server", container = %config.container());
    let service = StorageGateway::new(store, config).into_service();

    let _join_handle = tokio::spawn(
        async move {
            let result = Server::builder()
                .add_service(service)
                .serve_with_incoming(tokio_stream::once(Ok::<_, std::io::Error>(server)))
                .await;
            if let Err(_err) = result {
                warn!(err = %_err, "transitive server stopped");
            }
        }
        .instrument(span),
    );

    let mut client = Some(client);
    let channel = Endpoint::try_from("http://[::]:50051")?
        .connect_with_connector(tower::service_fn(move |_| {
            let client = client.take();
            async move {
                if let Some(client) = client {
                    Ok(TokioIo::new(client))
                } else {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "Client already taken",
                    ))
                }
            }
        }))
        .await?;

    Ok(Transitive {
        client: StorageServiceClient::new(channel),
    })
}
