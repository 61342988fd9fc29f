use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    models::formula::Resolved,
    utils::{
        checksum::ChecksumUtils,
        command::CommandUtils,
        downloader_def::{
            providers::{file::FileSourceProvider, http::HttpSourceProvider},
            r#trait::SourceProvider,
        },
        errors::{FormulaError, FormulaResult, ResultWithError},
    },
};

/// Fetches artifacts into a content-verified download cache.
pub struct Downloader {
    providers: Vec<Box<dyn SourceProvider>>,
    cache_dir: PathBuf,
}

impl Downloader {
    pub fn new(cache_dir: PathBuf) -> ResultWithError<Self> {
        Ok(Self::with_providers(
            vec![
                Box::new(HttpSourceProvider::new()?),
                Box::new(FileSourceProvider),
            ],
            cache_dir,
        ))
    }

    pub fn with_providers(providers: Vec<Box<dyn SourceProvider>>, cache_dir: PathBuf) -> Self {
        Self {
            providers,
            cache_dir,
        }
    }

    pub fn provider_for(&self, url: &str) -> Option<&dyn SourceProvider> {
        self.providers
            .iter()
            .find(|p| p.supports(url))
            .map(|p| p.as_ref())
    }

    pub fn cache_path(&self, name: &str, resolved: &Resolved) -> PathBuf {
        self.cache_dir.join(format!(
            "{}--{}--{}",
            name,
            resolved.version,
            Self::basename(&resolved.url)
        ))
    }

    /// Last path segment of a URL, without query or fragment.
    pub fn basename(url: &str) -> String {
        let without_query = url.split(['?', '#']).next().unwrap_or(url);
        let path = match without_query.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
            None => without_query,
        };
        match path.trim_end_matches('/').rsplit('/').next() {
            Some(segment) if !segment.is_empty() => segment.to_string(),
            _ => "download".to_string(),
        }
    }

    /// Returns a cached file whose SHA-256 equals `resolved.sha256`,
    /// downloading it first if needed. A mismatching download is deleted.
    pub fn fetch_verified(&self, name: &str, resolved: &Resolved) -> FormulaResult<PathBuf> {
        let url = resolved.url.as_str();
        fs::create_dir_all(&self.cache_dir).map_err(|e| FormulaError::fetch(url, e))?;

        let dest = self.cache_path(name, resolved);
        if dest.is_file() {
            let actual =
                ChecksumUtils::sha256_file(&dest).map_err(|e| FormulaError::fetch(url, e))?;
            if ChecksumUtils::matches(&resolved.sha256, &actual) {
                info!("Using cached download {}", dest.display());
                return Ok(dest);
            }
            warn!(
                "Cached download {} does not match its checksum, fetching again",
                dest.display()
            );
            fs::remove_file(&dest).map_err(|e| FormulaError::fetch(url, e))?;
        }

        let provider = self
            .provider_for(url)
            .ok_or_else(|| FormulaError::fetch(url, "no provider supports this URL"))?;

        let part = Self::part_path(&dest);
        debug!("Downloading {} via {} into {:?}", url, provider.name(), part);

        let spinner = CommandUtils::display_loader(format!("Downloading {url}"));
        let downloaded = provider.download(url, &part);
        spinner.finish_and_clear();

        if let Err(err) = downloaded {
            Self::discard(&part);
            return Err(FormulaError::fetch(url, err));
        }

        let actual = match ChecksumUtils::sha256_file(&part) {
            Ok(actual) => actual,
            Err(err) => {
                Self::discard(&part);
                return Err(FormulaError::fetch(url, err));
            }
        };

        if !ChecksumUtils::matches(&resolved.sha256, &actual) {
            Self::discard(&part);
            return Err(FormulaError::ChecksumMismatch {
                url: url.to_string(),
                expected: resolved.sha256.to_lowercase(),
                actual,
            });
        }

        fs::rename(&part, &dest).map_err(|e| FormulaError::fetch(url, e))?;
        info!("✅ Downloaded and verified {}", dest.display());
        Ok(dest)
    }

    fn part_path(dest: &Path) -> PathBuf {
        let mut part = dest.as_os_str().to_os_string();
        part.push(".part");
        PathBuf::from(part)
    }

    fn discard(path: &Path) {
        if path.exists()
            && let Err(err) = fs::remove_file(path)
        {
            warn!("Failed to remove {}: {}", path.display(), err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::ErrorKind;

    fn resolved_for(path: &Path, sha256: &str) -> Resolved {
        Resolved {
            url: format!("file://{}", path.display()),
            sha256: sha256.to_string(),
            version: "1.0.0".to_string(),
        }
    }

    #[test]
    fn basename_strips_query_and_falls_back() {
        assert_eq!(
            Downloader::basename("https://x.io/archive/refs/tags/v1.0.0.tar.gz?raw=1"),
            "v1.0.0.tar.gz"
        );
        assert_eq!(Downloader::basename("https://x.io/"), "download");
    }

    #[test]
    fn fetches_into_cache_and_reuses_it() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tool.tar.gz");
        fs::write(&src, b"archive bytes").unwrap();
        let sha = ChecksumUtils::sha256_bytes(b"archive bytes");

        let downloader = Downloader::new(dir.path().join("cache")).unwrap();
        let resolved = resolved_for(&src, &sha);
        let cached = downloader.fetch_verified("tool", &resolved).unwrap();
        assert_eq!(cached, dir.path().join("cache/tool--1.0.0--tool.tar.gz"));

        // Source gone: the verified cache entry must still satisfy the fetch.
        fs::remove_file(&src).unwrap();
        assert_eq!(downloader.fetch_verified("tool", &resolved).unwrap(), cached);
    }

    #[test]
    fn checksum_mismatch_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tool.tar.gz");
        fs::write(&src, b"archive bytes").unwrap();
        let mut sha = ChecksumUtils::sha256_bytes(b"archive bytes");
        let last = if sha.ends_with('0') { "1" } else { "0" };
        sha.replace_range(63.., last);

        let cache = dir.path().join("cache");
        let downloader = Downloader::new(cache.clone()).unwrap();
        let err = downloader
            .fetch_verified("tool", &resolved_for(&src, &sha))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::FetchError);
        assert!(matches!(err, FormulaError::ChecksumMismatch { .. }));
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
    }

    /// Answers one HTTP request with `404 Not Found` and returns its URL.
    fn serve_not_found() -> (String, std::thread::JoinHandle<()>) {
        use std::io::{BufRead as _, BufReader, Write as _};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1.0.0.tar.gz", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = concat!(
                "HTTP/1.1 404 Not Found\r\n",
                "Content-Length: 0\r\n",
                "Connection: close\r\n\r\n"
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        (url, handle)
    }

    #[test]
    fn http_error_status_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        let downloader = Downloader::with_providers(
            vec![Box::new(HttpSourceProvider::with_client(client))],
            cache.clone(),
        );

        let (url, server) = serve_not_found();
        let resolved = Resolved {
            url,
            sha256: "ab".repeat(32),
            version: "1.0.0".into(),
        };
        let err = downloader.fetch_verified("tool", &resolved).unwrap_err();
        server.join().unwrap();

        assert_eq!(err.kind(), ErrorKind::FetchError);
        assert!(err.to_string().contains("404"), "{err}");
        assert_eq!(fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[test]
    fn unsupported_url_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::with_providers(vec![], dir.path().to_path_buf());
        let resolved = Resolved {
            url: "ftp://example.com/a.tar.gz".into(),
            sha256: "0".repeat(64),
            version: "1.0.0".into(),
        };
        let err = downloader.fetch_verified("a", &resolved).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FetchError);
    }
}
