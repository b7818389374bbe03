//! Behavior every backend must show through the gateway.

use crate::helpers::Fixture;
use anyhow::Result;
use blobgate::UPLOAD_MESSAGE;
use tonic::Code;

pub(crate) async fn upload_then_download_round_trips(mut fixture: Fixture) -> Result<()> {
    let content = "line one\nline two\n".repeat(100);
    let _message = fixture.upload("notes.txt", content.as_bytes()).await?;

    assert_eq!(fixture.download("notes.txt").await?, content.as_bytes());
    Ok(())
}

pub(crate) async fn listing_filters_by_pattern(mut fixture: Fixture) -> Result<()> {
    for name in ["b.txt", "a.txt", "c.md", "d.txt.bak", "e.TXT", "f"] {
        let _message = fixture.upload(name, b"content").await?;
    }

    assert_eq!(fixture.list().await?, ["a.txt", "b.txt"]);
    Ok(())
}

pub(crate) async fn listing_skips_nested_names(mut fixture: Fixture) -> Result<()> {
    let _message = fixture.upload("top.txt", b"top").await?;
    let _message = fixture.upload("dir/nested.txt", b"nested").await?;

    assert_eq!(fixture.list().await?, ["top.txt"]);
    assert_eq!(fixture.download("dir/nested.txt").await?, b"nested");
    Ok(())
}

pub(crate) async fn upload_overwrites(mut fixture: Fixture) -> Result<()> {
    let _message = fixture.upload("a.txt", b"a much longer first version").await?;
    let _message = fixture.upload("a.txt", b"second").await?;

    assert_eq!(fixture.download("a.txt").await?, b"second");
    assert_eq!(fixture.list().await?, ["a.txt"]);
    Ok(())
}

pub(crate) async fn download_of_missing_file_is_not_found(mut fixture: Fixture) -> Result<()> {
    let _message = fixture.upload("present.txt", b"here").await?;

    let status = fixture.download("absent.txt").await.unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    Ok(())
}

pub(crate) async fn listing_empty_container(mut fixture: Fixture) -> Result<()> {
    assert!(fixture.list().await?.is_empty());
    Ok(())
}

pub(crate) async fn upload_list_download_scenario(mut fixture: Fixture) -> Result<()> {
    assert_eq!(fixture.upload("a.txt", b"hello").await?, UPLOAD_MESSAGE);
    assert!(fixture.list().await?.contains(&"a.txt".to_owned()));
    assert_eq!(fixture.download("a.txt").await?, b"hello");
    Ok(())
}

pub(crate) async fn binary_content_passes_through(mut fixture: Fixture) -> Result<()> {
    let content: Vec<u8> = (0..=255).collect();
    let _message = fixture.upload("bytes.bin", &content).await?;

    assert_eq!(fixture.download("bytes.bin").await?, content);
    Ok(())
}

pub(crate) async fn empty_content(mut fixture: Fixture) -> Result<()> {
    let _message = fixture.upload("empty.txt", b"").await?;

    assert!(fixture.download("empty.txt").await?.is_empty());
    assert_eq!(fixture.list().await?, ["empty.txt"]);
    Ok(())
}
