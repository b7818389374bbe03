//! A command-line interface for serving and calling a blobgate gateway.
//!
//! For usage, run `cargo run --features binary -- --help`.

mod cli;

use crate::cli::{Args, Backend, Local, Mode, Operation};
use blobgate::backend::{FsStore, MemoryStore, ObjectStore};
#[cfg(feature = "sqlite")]
use blobgate::backend::SqliteStore;
use blobgate::client::StorageServiceClient;
use blobgate::proto::storage::{
    DownloadRequest, DownloadResponse, ListFilesRequest, ListFilesResponse, UploadRequest,
    UploadResponse,
};
use blobgate::transitive::storage_client;
use blobgate::{GatewayConfig, StorageGateway};
use clap::Parser as _;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::fs;
use tokio::io::{self, AsyncReadExt as _, AsyncWriteExt as _};
use tonic::transport::{Channel, Server};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Args {
        backend,
        store,
        gateway,
        command,
    } = Args::parse();

    // stdout carries file content, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (config, create_container) = gateway.into_config();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(execute(
            backend,
            store,
            config,
            create_container,
            command.into_mode(),
        ))
}

async fn execute(
    backend: Backend,
    store: PathBuf,
    config: GatewayConfig,
    create_container: bool,
    mode: Mode,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let local = match mode {
        Mode::Remote { url, operation } => {
            return call(StorageServiceClient::connect(url).await?, operation).await
        }
        Mode::Local(local) => local,
    };

    match backend {
        Backend::Memory => execute_local(MemoryStore::new(), config, create_container, local).await,
        Backend::Fs => execute_local(FsStore::new(store), config, create_container, local).await,
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            execute_local(SqliteStore::at_path(store)?, config, create_container, local).await
        }
    }
}

async fn execute_local<Store>(
    store: Store,
    config: GatewayConfig,
    create_container: bool,
    local: Local,
) -> Result<ExitCode, Box<dyn std::error::Error>>
where
    Store: ObjectStore,
{
    if create_container {
        store.create_container(config.container()).await?;
    }

    match local {
        Local::Serve(addr) => run(store, config, addr).await,
        Local::Call(operation) => {
            call(storage_client(store, config).await?.into_inner(), operation).await
        }
    }
}

/// Run blobgate as a server. This function will block until the server is shut down.
async fn run<Store>(
    store: Store,
    config: GatewayConfig,
    addr: SocketAddr,
) -> Result<ExitCode, Box<dyn std::error::Error>>
where
    Store: ObjectStore,
{
    tracing::info!(
        %addr,
        container = %config.container(),
        list_pattern = %config.list_pattern(),
        content_policy = %config.content_policy(),
        "serving",
    );
    Server::builder()
        .add_service(StorageGateway::new(store, config).into_service())
        .serve(addr)
        .await?;

    Ok(ExitCode::SUCCESS)
}

async fn call(
    client: StorageServiceClient<Channel>,
    operation: Operation,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match operation {
        Operation::List => list(client).await,
        Operation::Upload { name, file_path } => upload(client, name, file_path).await,
        Operation::Download { name } => download(client, name).await,
    }
}

/// Print the names of the listed files, one per line.
async fn list(
    mut client: StorageServiceClient<Channel>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let ListFilesResponse { file_names } = client
        .list_files(ListFilesRequest {})
        .await?
        .into_inner();

    let mut stdout = io::stdout();
    for name in file_names {
        stdout.write_all(name.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(ExitCode::SUCCESS)
}

/// Upload a file and print the server's confirmation.
async fn upload(
    mut client: StorageServiceClient<Channel>,
    file_name: String,
    file_path: PathBuf,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let UploadResponse { message } = client
        .upload(UploadRequest {
            file_name,
            file_content: read_file_or_stdin(file_path).await?,
        })
        .await?
        .into_inner();

    #[allow(clippy::print_stdout)]
    {
        println!("{message}");
    }
    Ok(ExitCode::SUCCESS)
}

/// Download a file, writing its raw content to stdout.
async fn download(
    mut client: StorageServiceClient<Channel>,
    file_name: String,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let DownloadResponse { file_content } = client
        .download(DownloadRequest { file_name })
        .await?
        .into_inner();

    let mut stdout = io::stdout();
    stdout.write_all(&file_content).await?;
    stdout.flush().await?;
    Ok(ExitCode::SUCCESS)
}

/// Given a path, read from stdin if the path is "-". Otherwise, read the file at that path.
async fn read_file_or_stdin(file_path: PathBuf) -> io::Result<Vec<u8>> {
    if file_path == PathBuf::from("-") {
        let mut bytes = Vec::new();
        let _num_bytes = io::stdin().read_to_end(&mut bytes).await?;
        Ok(bytes)
    } else {
        Ok(fs::read(file_path).await?)
    }
}
