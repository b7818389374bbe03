//! Command-line interface for blobgate.

use blobgate::config::Container;
use blobgate::pattern::{ListPattern, DEFAULT_LIST_PATTERN};
use blobgate::{ContentPolicy, GatewayConfig};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The object store to forward to.
///
/// Note that the SQLite backend must be enabled at compile time for it to be used.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum Backend {
    /// Blobs kept in memory; lost on exit.
    Memory,
    /// A directory per container under `--store`.
    #[clap(alias = "filesystem")]
    Fs,
    /// A SQLite database at `--store`.
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl Default for Backend {
    #[allow(unreachable_code)] // simpler than more complex cfgs
    fn default() -> Self {
        #[cfg(feature = "sqlite")]
        return Self::Sqlite;

        Self::Fs
    }
}

/// Command-line arguments for blobgate.
#[derive(Debug, Parser)]
#[command(version, propagate_version = true)]
pub(crate) struct Args {
    /// The object store to forward to.
    #[arg(value_enum, short, long, default_value_t = Backend::default(), env = "BLOBGATE_BACKEND")]
    pub(crate) backend: Backend,
    /// Where the store keeps its data: a directory for `fs`, a database file for `sqlite`.
    /// Ignored by `memory`.
    #[arg(short, long, default_value = "blobgate_store", env = "BLOBGATE_STORE")]
    pub(crate) store: PathBuf,
    /// How requests are forwarded.
    #[command(flatten)]
    pub(crate) gateway: GatewayArgs,
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Configuration of the gateway, fixed for the lifetime of the process.
#[derive(Debug, ClapArgs)]
pub(crate) struct GatewayArgs {
    /// The container all requests are forwarded to.
    #[arg(short, long, env = "BLOBGATE_CONTAINER")]
    pub(crate) container: Container,
    /// Only files whose names match this glob are listed. `*` does not match `/`.
    #[arg(long, default_value = DEFAULT_LIST_PATTERN, env = "BLOBGATE_LIST_PATTERN")]
    pub(crate) list_pattern: ListPattern,
    /// What content is accepted and served.
    #[arg(value_enum, long, default_value_t, env = "BLOBGATE_CONTENT_POLICY")]
    pub(crate) content_policy: ContentPolicy,
    /// Create the container on startup if it does not exist.
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "BLOBGATE_CREATE_CONTAINER"
    )]
    pub(crate) create_container: bool,
}

impl GatewayArgs {
    /// Split into the gateway configuration and whether to create the container.
    pub(crate) fn into_config(self) -> (GatewayConfig, bool) {
        let Self {
            container,
            list_pattern,
            content_policy,
            create_container,
        } = self;
        let config = GatewayConfig::new(container)
            .with_list_pattern(list_pattern)
            .with_content_policy(content_policy);
        (config, create_container)
    }
}

/// What operation to perform.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Run blobgate as a server.
    ///
    /// This will start a gRPC server exposing `ListFiles`, `Upload` and `Download` for the
    /// configured container. The server will listen on the given address until it is stopped.
    #[clap(alias = "serve")]
    Run(RunArgs),
    /// List the files in the container that match the listing pattern, one per line.
    #[clap(alias = "ls")]
    List(ClientArgs),
    /// Upload a file, replacing any file with the same name.
    #[clap(aliases = ["put", "store"])]
    Upload {
        /// Where to send the request.
        #[command(flatten)]
        client: ClientArgs,
        /// The name to store the file under.
        name: String,
        /// The file to upload.
        ///
        /// If `-`, the data is read from stdin.
        file_path: PathBuf,
    },
    /// Download a file, writing its content to stdout.
    #[clap(aliases = ["get", "fetch"])]
    Download {
        /// Where to send the request.
        #[command(flatten)]
        client: ClientArgs,
        /// The name of the file to download.
        name: String,
    },
}

/// Run blobgate as a server.
#[derive(Debug, ClapArgs)]
pub(crate) struct RunArgs {
    /// The address to listen on.
    #[clap(default_value = "[::1]:50051", env = "BLOBGATE_ADDR")]
    pub(crate) addr: SocketAddr,
}

/// Where a client operation is sent.
#[derive(Debug, ClapArgs)]
pub(crate) struct ClientArgs {
    /// The URL of a running blobgate server, such as `http://[::1]:50051`.
    ///
    /// If omitted, the operation runs against the local store in this process.
    #[arg(long)]
    pub(crate) remote: Option<String>,
}

/// A client operation, independent of where it is sent.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Operation {
    List,
    Upload { name: String, file_path: PathBuf },
    Download { name: String },
}

/// Whether a command runs against a remote server or against the local store.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Send the operation to a running server. The local store is never opened.
    Remote { url: String, operation: Operation },
    /// Open the local store.
    Local(Local),
}

/// What to do with the local store.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Local {
    Serve(SocketAddr),
    Call(Operation),
}

impl Command {
    /// Resolve where the command runs and what it does there.
    pub(crate) fn into_mode(self) -> Mode {
        let (ClientArgs { remote }, operation) = match self {
            Self::Run(RunArgs { addr }) => return Mode::Local(Local::Serve(addr)),
            Self::List(client) => (client, Operation::List),
            Self::Upload {
                client,
                name,
                file_path,
            } => (client, Operation::Upload { name, file_path }),
            Self::Download { client, name } => (client, Operation::Download { name }),
        };
        match remote {
            Some(url) => Mode::Remote { url, operation },
            None => Mode::Local(Local::Call(operation)),
        }
    }
}
