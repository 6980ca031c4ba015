use spordl::{
    downloader::{Downloader, LinkMode, save_link_file, write_link_file},
    error::DownloadError,
};
use tempfile::tempdir;

fn links() -> Vec<String> {
    vec![
        "http://youtube.com/watch?v=abc123".to_string(),
        "http://youtube.com/watch?v=def456".to_string(),
    ]
}

#[test]
fn test_write_link_file_is_newline_delimited() {
    let file = write_link_file(&links()).unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(
        content,
        "http://youtube.com/watch?v=abc123\nhttp://youtube.com/watch?v=def456\n"
    );
}

#[test]
fn test_link_file_is_removed_when_dropped() {
    let file = write_link_file(&links()).unwrap();
    let path = file.path().to_path_buf();
    assert!(path.exists());

    drop(file);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_save_link_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("links.txt");

    save_link_file(&path, &links()).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.ends_with('\n'));
}

#[tokio::test]
async fn test_missing_program_is_a_spawn_error() {
    let downloader = Downloader::new("spordl-no-such-downloader", LinkMode::Args);

    let result = downloader.download(&links()).await;

    assert!(matches!(result, Err(DownloadError::Spawn { .. })));
}

#[cfg(unix)]
#[tokio::test]
async fn test_successful_downloader_run() {
    for mode in [LinkMode::Args, LinkMode::File] {
        let downloader = Downloader::new("true", mode);
        let status = downloader.download(&links()).await.unwrap();
        assert!(status.success());
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_downloader_is_reported() {
    let downloader = Downloader::new("false", LinkMode::File);

    let result = downloader.download(&links()).await;

    assert!(matches!(result, Err(DownloadError::Failed { .. })));
}
