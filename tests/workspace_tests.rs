use std::io::ErrorKind;

use anyhow::Result;
use campaign_service::{
    models::template::Attachment,
    workspace::{CampaignWorkspace, sanitize_filename},
};

/// Test: Uploaded filenames are reduced to a safe basename
#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("resume.pdf", "x"), "resume.pdf");
    assert_eq!(sanitize_filename("My Resume (final).pdf", "x"), "My_Resume_final.pdf");
    assert_eq!(sanitize_filename("../../etc/passwd", "x"), "passwd");
    assert_eq!(sanitize_filename("C:\\Users\\jane\\cv.docx", "x"), "cv.docx");
    assert_eq!(sanitize_filename(".hidden", "x"), "hidden");
    assert_eq!(sanitize_filename("...", "fallback.csv"), "fallback.csv");
    assert_eq!(sanitize_filename("", "fallback.csv"), "fallback.csv");
}

/// Test: A stored attachment comes back with its name and content type
#[tokio::test]
async fn test_store_and_load_attachment() -> Result<()> {
    let mut workspace = CampaignWorkspace::create()?;
    workspace.store_attachment("my resume.pdf", b"%PDF-1.4").await?;

    let attachment = workspace.load_attachment().await?.expect("attachment stored");

    assert_eq!(attachment.filename, "my_resume.pdf");
    assert_eq!(attachment.content_type, "application/pdf");
    assert_eq!(&*attachment.data, b"%PDF-1.4");

    Ok(())
}

/// Test: No attachment stored means none loaded
#[tokio::test]
async fn test_no_attachment() -> Result<()> {
    let workspace = CampaignWorkspace::create()?;

    assert!(workspace.load_attachment().await?.is_none());

    Ok(())
}

/// Test: Reading contacts before any were stored is a not-found error
#[tokio::test]
async fn test_read_contacts_without_upload() -> Result<()> {
    let workspace = CampaignWorkspace::create()?;

    let error = workspace.read_contacts().await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::NotFound);

    Ok(())
}

/// Test: Stored contacts are read back byte for byte
#[tokio::test]
async fn test_store_and_read_contacts() -> Result<()> {
    let mut workspace = CampaignWorkspace::create()?;
    let csv = b"name,email,company\nJane,jane@co.com,Acme\n";

    workspace.store_contacts("contacts.csv", csv).await?;

    assert_eq!(workspace.read_contacts().await?, csv.to_vec());

    Ok(())
}

/// Test: Releasing removes the directory and its files
#[tokio::test]
async fn test_release_removes_directory() -> Result<()> {
    let mut workspace = CampaignWorkspace::create()?;
    workspace.store_contacts("contacts.csv", b"a,b,c\n").await?;
    let path = workspace.path().to_path_buf();
    assert!(path.exists());

    workspace.release()?;

    assert!(!path.exists());

    Ok(())
}

/// Test: Dropping the workspace also removes the directory
#[tokio::test]
async fn test_drop_removes_directory() -> Result<()> {
    let path = {
        let mut workspace = CampaignWorkspace::create()?;
        workspace.store_attachment("cv.docx", b"doc").await?;
        workspace.path().to_path_buf()
    };

    assert!(!path.exists());

    Ok(())
}

/// Test: Contacts and attachment never share a path, whatever their names
#[tokio::test]
async fn test_uploads_do_not_overwrite_each_other() -> Result<()> {
    let mut workspace = CampaignWorkspace::create()?;
    let csv = b"name,email,company\nJane,jane@co.com,Acme\n";

    workspace.store_contacts("attachment_resume.pdf", csv).await?;
    workspace.store_attachment("resume.pdf", b"%PDF-1.4").await?;

    assert_eq!(workspace.read_contacts().await?, csv.to_vec());
    let attachment = workspace.load_attachment().await?.expect("attachment stored");
    assert_eq!(&*attachment.data, b"%PDF-1.4");

    Ok(())
}

/// Test: Attachment content type is guessed from the extension
#[test]
fn test_attachment_content_types() {
    let cases = [
        ("resume.pdf", "application/pdf"),
        ("resume.PDF", "application/pdf"),
        ("resume.doc", "application/msword"),
        (
            "resume.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        ("resume.odt", "application/vnd.oasis.opendocument.text"),
        ("resume.png", "image/png"),
        ("cv.html", "text/html"),
        ("notes.txt", "text/plain"),
        ("resume", "application/octet-stream"),
    ];

    for (filename, expected) in cases {
        let attachment = Attachment::new(filename, b"data".to_vec());
        assert_eq!(attachment.content_type, expected, "{}", filename);
    }
}
