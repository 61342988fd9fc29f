use std::{fs, io::ErrorKind};

use tracing::{info, warn};

use crate::{
    models::{
        config::Config,
        receipt::{Receipt, ReceiptStore},
    },
    utils::{errors::EmptyResult, file_logger::FileLogger},
};

/// Removes what an install recorded in its receipt.
pub struct Uninstall<'a> {
    config: &'a Config,
    history: FileLogger,
}

impl<'a> Uninstall<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self::with_history(config, FileLogger::new("history.log", config.history_log))
    }

    pub fn with_history(config: &'a Config, history: FileLogger) -> Self {
        Self { config, history }
    }

    pub fn execute(&self, name: &str, yes: bool) -> EmptyResult {
        let store = ReceiptStore::new(self.config.receipts_dir());
        let Some(receipt) = store.load(name)? else {
            return Err(format!(
                "'{}' is not installed in {}",
                name,
                self.config.prefix.display()
            )
            .into());
        };

        if !yes && !Self::confirm(&receipt)? {
            info!("Uninstall of {} cancelled", name);
            return Ok(());
        }

        self.remove(&store, &receipt)
    }

    fn confirm(receipt: &Receipt) -> Result<bool, inquire::InquireError> {
        inquire::Confirm::new(&format!(
            "Remove {} {} ({} file(s))?",
            receipt.name,
            receipt.version,
            receipt.files.len()
        ))
        .with_default(false)
        .prompt()
    }

    pub fn remove(&self, store: &ReceiptStore, receipt: &Receipt) -> EmptyResult {
        for file in &receipt.files {
            match fs::remove_file(file) {
                Ok(()) => info!("Removed {}", file.display()),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!("{} was already gone", file.display())
                }
                Err(err) => {
                    return Err(format!("Could not remove {}: {}", file.display(), err).into());
                }
            }
        }

        store.remove(&receipt.name)?;
        self.history
            .log(&format!("uninstalled {} {}", receipt.name, receipt.version));
        info!("✅ Uninstalled {} {}", receipt.name, receipt.version);
        Ok(())
    }
}
