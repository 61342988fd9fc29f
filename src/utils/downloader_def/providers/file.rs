use std::path::{Path, PathBuf};

use crate::utils::downloader_def::r#trait::SourceProvider;
use crate::utils::errors::EmptyResult;

/// Serves `file://` URLs and plain local paths.
#[derive(Debug, Default)]
pub struct FileSourceProvider;

impl FileSourceProvider {
    pub fn local_path(url: &str) -> Option<PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if url.contains("://") {
            return None;
        }
        Some(PathBuf::from(url))
    }
}

impl SourceProvider for FileSourceProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    fn supports(&self, url: &str) -> bool {
        Self::local_path(url).is_some()
    }

    fn download(&self, url: &str, dest_path: &Path) -> EmptyResult {
        let src = Self::local_path(url).ok_or_else(|| format!("Not a local URL: {}", url))?;
        if !src.is_file() {
            return Err(format!("No such file: {}", src.display()).into());
        }
        std::fs::copy(&src, dest_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_urls_to_paths() {
        assert_eq!(
            FileSourceProvider::local_path("file:///tmp/a.tar.gz"),
            Some(PathBuf::from("/tmp/a.tar.gz"))
        );
        assert_eq!(
            FileSourceProvider::local_path("./a.tar.gz"),
            Some(PathBuf::from("./a.tar.gz"))
        );
        assert_eq!(FileSourceProvider::local_path("https://x/a.tar.gz"), None);
    }

    #[test]
    fn copies_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dest = dir.path().join("dest.bin");
        std::fs::write(&src, b"payload").unwrap();

        let url = format!("file://{}", src.display());
        FileSourceProvider.download(&url, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");

        let missing = format!("file://{}", dir.path().join("nope").display());
        assert!(FileSourceProvider.download(&missing, &dest).is_err());
    }
}
