use std::path::Path;

use crate::utils::errors::EmptyResult;

/// A place artifacts can be fetched from, selected by URL.
pub trait SourceProvider {
    fn name(&self) -> &'static str;
    fn supports(&self, url: &str) -> bool;
    fn download(&self, url: &str, dest_path: &Path) -> EmptyResult;
}
