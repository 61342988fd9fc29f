use reqwest::blocking::Client;
use std::fs::File;
use std::io::copy;
use std::path::Path;

use crate::utils::downloader_def::r#trait::SourceProvider;
use crate::utils::errors::{EmptyResult, ResultWithError};

#[derive(Debug)]
pub struct HttpSourceProvider {
    client: Client,
}

impl HttpSourceProvider {
    pub fn new() -> ResultWithError<Self> {
        let client = Client::builder()
            .user_agent(concat!("formulary/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl SourceProvider for HttpSourceProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    fn supports(&self, url: &str) -> bool {
        url.starts_with("https://") || url.starts_with("http://")
    }

    fn download(&self, url: &str, dest_path: &Path) -> EmptyResult {
        let mut resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(format!("Server returned status {}", resp.status()).into());
        }

        let mut file = File::create(dest_path)?;
        copy(&mut resp, &mut file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_handles_http_schemes() {
        let provider = HttpSourceProvider::new().unwrap();
        assert!(provider.supports("https://github.com/x/y.tar.gz"));
        assert!(provider.supports("http://example.com/y.tar.gz"));
        assert!(!provider.supports("file:///tmp/y.tar.gz"));
        assert!(!provider.supports("/tmp/y.tar.gz"));
    }
}
