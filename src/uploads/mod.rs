use std::path::{Path, PathBuf};

use bytes::Bytes;
use fs_err as fs;
use uuid::Uuid;

use crate::errors::ApiError;

/// Public mount point for stored images; the router serves the upload
/// directory under this path.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Fetch-then-store area for shared images. Filenames are random UUIDs, never
/// derived from user input.
pub struct Uploads {
    dir: PathBuf,
}

impl Uploads {
    pub fn new(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download image bytes from a remote or temporary URL. A failed fetch is
    /// a download error (500), not an upstream AI failure.
    pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Bytes, ApiError> {
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Download(e.to_string()))?;
        let resp = resp
            .error_for_status()
            .map_err(|e| ApiError::Download(e.to_string()))?;
        resp.bytes().await.map_err(|e| ApiError::Download(e.to_string()))
    }

    /// Write image bytes under a fresh UUID filename and return the public
    /// URL path. The write completes before the path is handed out.
    pub fn save_png(&self, data: &[u8]) -> anyhow::Result<String> {
        let filename = format!("{}.png", Uuid::new_v4());
        fs::write(self.dir.join(&filename), data)?;
        Ok(format!("{PUBLIC_PREFIX}/{filename}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_png_writes_the_bytes_under_a_uuid_name() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(dir.path()).unwrap();
        let url = uploads.save_png(b"not really a png").unwrap();

        let filename = url.strip_prefix("/uploads/").unwrap();
        assert!(filename.ends_with(".png"));
        let stem = filename.strip_suffix(".png").unwrap();
        assert!(Uuid::parse_str(stem).is_ok());

        let stored = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(stored, b"not really a png");
    }

    #[test]
    fn save_png_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = Uploads::new(dir.path()).unwrap();
        let a = uploads.save_png(b"a").unwrap();
        let b = uploads.save_png(b"b").unwrap();
        assert_ne!(a, b);
    }
}
