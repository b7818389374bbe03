use crate::helpers::{config, Fixture, CONTAINER};
use anyhow::Result;
use blobgate::backend::{FsStore, MemoryStore, ObjectStore as _};
use blobgate::pattern::ListPattern;
use blobgate::transitive::storage_client;
use blobgate::{Container, ContentPolicy};
use tokio::io::AsyncWriteExt as _;
use tonic::Code;

#[tokio::test]
async fn configured_pattern_replaces_default() -> Result<()> {
    let config = config()?.with_list_pattern(ListPattern::new("*.md")?);
    let mut fixture = Fixture::with_config(MemoryStore::new(), None, config).await?;
    for name in ["a.txt", "b.md", "c.md"] {
        let _message = fixture.upload(name, b"content").await?;
    }

    assert_eq!(fixture.list().await?, ["b.md", "c.md"]);
    Ok(())
}

#[tokio::test]
async fn fs_rejects_names_escaping_the_container() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path().join("root");
    let mut fixture = Fixture::new(FsStore::new(&root), Some(dir)).await?;

    let status = fixture.upload("../escaped.txt", b"nope").await.unwrap_err();
    let status = status.downcast::<tonic::Status>()?;
    assert_eq!(status.code(), Code::InvalidArgument);
    assert!(!root.join("escaped.txt").exists());

    let status = fixture.download("../escaped.txt").await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    Ok(())
}

#[tokio::test]
async fn names_are_forwarded_unchecked() -> Result<()> {
    let mut fixture = Fixture::new(MemoryStore::new(), None).await?;

    let _message = fixture.upload("", b"nameless").await?;
    assert_eq!(fixture.download("").await?, b"nameless");
    let _message = fixture.upload("../up.txt", b"up").await?;
    assert_eq!(fixture.download("../up.txt").await?, b"up");
    Ok(())
}

#[tokio::test]
async fn utf8_policy_guards_both_directions() -> Result<()> {
    let store = MemoryStore::new();
    let container = Container::new(CONTAINER)?;
    let config = config()?.with_content_policy(ContentPolicy::Utf8);
    let mut fixture = Fixture::with_config(store.clone(), None, config).await?;

    let status = fixture
        .upload("latin1.txt", b"caf\xe9")
        .await
        .unwrap_err()
        .downcast::<tonic::Status>()?;
    assert_eq!(status.code(), Code::InvalidArgument);

    assert_eq!(fixture.upload("utf8.txt", "café".as_bytes()).await?, blobgate::UPLOAD_MESSAGE);
    assert_eq!(fixture.download("utf8.txt").await?, "café".as_bytes());

    // Written behind the gateway's back.
    let mut writer = store.open_write(&container, "latin1.txt").await?;
    writer.write_all(b"caf\xe9").await?;
    writer.shutdown().await?;
    let status = fixture.download("latin1.txt").await.unwrap_err();
    assert_eq!(status.code(), Code::DataLoss);
    Ok(())
}

#[tokio::test]
async fn missing_container_fails_every_operation() -> Result<()> {
    let mut client = storage_client(MemoryStore::new(), config()?).await?;

    let status = client
        .list_files(blobgate::proto::storage::ListFilesRequest {})
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let status = client
        .upload(blobgate::proto::storage::UploadRequest {
            file_name: "a.txt".to_owned(),
            file_content: b"hello".to_vec(),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    Ok(())
}

#[tokio::test]
async fn store_is_shared_with_other_gateways() -> Result<()> {
    let store = MemoryStore::new();
    let mut first = Fixture::new(store.clone(), None).await?;
    let mut second = Fixture::new(store, None).await?;

    let _message = first.upload("shared.txt", b"from first").await?;
    assert_eq!(second.download("shared.txt").await?, b"from first");
    Ok(())
}
