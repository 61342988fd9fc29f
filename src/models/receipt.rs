use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::utils::errors::{EmptyResult, ResultTrait as _, ResultWithError};

/// Record of what an install placed on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub name: String,
    pub version: String,
    pub url: String,
    pub sha256: String,
    pub files: Vec<PathBuf>,
    pub installed_at: String,
}

/// Directory of `<name>.json` receipts.
pub struct ReceiptStore {
    dir: PathBuf,
}

impl ReceiptStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn save(&self, receipt: &Receipt) -> EmptyResult {
        fs::create_dir_all(&self.dir).auto_err("Could not create receipts directory")?;
        let content = serde_json::to_string_pretty(receipt)?;
        fs::write(self.path_for(&receipt.name), content).auto_err("Could not write receipt")?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> ResultWithError<Option<Receipt>> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    pub fn remove(&self, name: &str) -> EmptyResult {
        let path = self.path_for(name);
        if path.exists() {
            fs::remove_file(&path).auto_err("Could not remove receipt")?;
        }
        Ok(())
    }

    /// All receipts, sorted by name.
    pub fn list(&self) -> ResultWithError<Vec<Receipt>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut receipts = Vec::new();
        for entry in fs::read_dir(&self.dir).auto_err("Could not read receipts directory")? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                receipts.push(Self::read(&path)?);
            }
        }
        receipts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(receipts)
    }

    fn read(path: &Path) -> ResultWithError<Receipt> {
        let content = fs::read_to_string(path).auto_err("Could not read receipt")?;
        serde_json::from_str(&content).auto_err(&format!("Invalid receipt {}", path.display()))
    }
}
