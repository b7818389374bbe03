mod gateway;
mod helpers;
mod properties;

use crate::helpers::Fixture;
use anyhow::Result;
#[cfg(feature = "sqlite")]
use blobgate::backend::SqliteStore;
use blobgate::backend::{FsStore, MemoryStore};

async fn memory_fixture() -> Result<Fixture> {
    Fixture::new(MemoryStore::new(), None).await
}

async fn fs_fixture() -> Result<Fixture> {
    let dir = tempfile::tempdir()?;
    let store = FsStore::new(dir.path());
    Fixture::new(store, Some(dir)).await
}

#[cfg(feature = "sqlite")]
async fn sqlite_fixture() -> Result<Fixture> {
    let dir = tempfile::tempdir()?;
    let store = SqliteStore::at_path(dir.path().join("blobs.db"))?;
    Fixture::new(store, Some(dir)).await
}

/// One `#[tokio::test]` per property, each on a fresh fixture.
macro_rules! property_tests {
    ($fixture:path => $($property:ident),* $(,)?) => {$(
        #[tokio::test]
        async fn $property() -> anyhow::Result<()> {
            crate::properties::$property($fixture().await?).await
        }
    )*};
}

/// Run every property against one backend.
macro_rules! backend_tests {
    ($(#[$attr:meta])* mod $backend:ident = $fixture:path;) => {
        $(#[$attr])*
        mod $backend {
            property_tests!($fixture =>
                upload_then_download_round_trips,
                listing_filters_by_pattern,
                listing_skips_nested_names,
                upload_overwrites,
                download_of_missing_file_is_not_found,
                listing_empty_container,
                upload_list_download_scenario,
                binary_content_passes_through,
                empty_content,
            );
        }
    };
}

backend_tests! { mod memory = crate::memory_fixture; }
backend_tests! { mod fs = crate::fs_fixture; }
backend_tests! {
    #[cfg(feature = "sqlite")]
    mod sqlite = crate::sqlite_fixture;
}
