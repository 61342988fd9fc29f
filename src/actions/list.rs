use crate::{
    models::{config::Config, receipt::ReceiptStore},
    utils::errors::EmptyResult,
};

pub struct List<'a> {
    config: &'a Config,
}

impl<'a> List<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> EmptyResult {
        let receipts = ReceiptStore::new(self.config.receipts_dir()).list()?;
        if receipts.is_empty() {
            println!("No formulae installed in {}", self.config.prefix.display());
            return Ok(());
        }

        for receipt in receipts {
            println!("{} {}", receipt.name, receipt.version);
        }
        Ok(())
    }
}
