use std::io;
use std::path::{Path, PathBuf};

/// Location of an uploaded file under `root`, or `root` itself when no
/// filename is given.
pub fn upload_path(root: &Path, filename: Option<&str>) -> PathBuf {
    match filename {
        Some(name) => root.join(name),
        None => root.to_path_buf(),
    }
}

pub fn upload_url(base_url: &str, name: &str) -> String {
    format!("{}/uploads/{}", base_url.trim_end_matches('/'), name)
}

/// Reduces a client-supplied filename to something safe to join onto the
/// upload root. Returns `None` when nothing usable is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub async fn save_upload(root: &Path, name: &str, data: &[u8]) -> io::Result<()> {
    tokio::fs::write(upload_path(root, Some(name)), data).await
}

/// Missing files are not an error.
pub async fn remove_upload(root: &Path, name: &str) -> io::Result<()> {
    match tokio::fs::remove_file(upload_path(root, Some(name))).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_path_with_and_without_name() {
        let root = Path::new("/srv/uploads");

        assert_eq!(upload_path(root, None), PathBuf::from("/srv/uploads"));
        assert_eq!(
            upload_path(root, Some("test.txt")),
            PathBuf::from("/srv/uploads/test.txt")
        );
    }

    #[test]
    fn test_upload_url_trims_trailing_slash() {
        assert_eq!(
            upload_url("http://localhost:8080/", "test.txt"),
            "http://localhost:8080/uploads/test.txt"
        );
    }

    #[test]
    fn test_secure_filename_keeps_plain_names() {
        assert_eq!(secure_filename("test.txt").as_deref(), Some("test.txt"));
        assert_eq!(secure_filename("my-song_01.mp3").as_deref(), Some("my-song_01.mp3"));
    }

    #[test]
    fn test_secure_filename_joins_whitespace() {
        assert_eq!(
            secure_filename("My cool  song.mp3").as_deref(),
            Some("My_cool_song.mp3")
        );
    }

    #[test]
    fn test_secure_filename_strips_traversal() {
        assert_eq!(
            secure_filename("../../../etc/passwd").as_deref(),
            Some("etc_passwd")
        );
        assert_eq!(
            secure_filename("..\\windows\\system.ini").as_deref(),
            Some("windows_system.ini")
        );
    }

    #[test]
    fn test_secure_filename_drops_non_ascii() {
        assert_eq!(secure_filename("café.mp3").as_deref(), Some("caf.mp3"));
    }

    #[test]
    fn test_secure_filename_rejects_empty_result() {
        assert_eq!(secure_filename(""), None);
        assert_eq!(secure_filename("../.."), None);
        assert_eq!(secure_filename("ü"), None);
    }

    #[tokio::test]
    async fn test_save_and_remove_upload() {
        let dir = tempfile::tempdir().unwrap();

        save_upload(dir.path(), "a.txt", b"abc").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"abc");

        remove_upload(dir.path(), "a.txt").await.unwrap();
        assert!(!dir.path().join("a.txt").exists());

        remove_upload(dir.path(), "a.txt").await.unwrap();
    }
}
