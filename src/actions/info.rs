use crate::{
    models::{config::Config, formula::Formula, receipt::ReceiptStore},
    utils::errors::{EmptyResult, ResultWithError},
};

pub struct Info<'a> {
    config: &'a Config,
}

impl<'a> Info<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn execute(&self, formula: &Formula) -> EmptyResult {
        println!("{}", self.render(formula)?);
        Ok(())
    }

    pub fn render(&self, formula: &Formula) -> ResultWithError<String> {
        let version = formula.version().unwrap_or_else(|| "unknown".to_string());
        let mut out = vec![
            format!("{} {}", formula.name, version),
            formula.desc.clone(),
            formula.homepage.clone(),
            format!("From: {}", formula.url),
            format!("SHA-256: {}", formula.sha256),
            "Installs:".to_string(),
        ];

        let bin_dir = self.config.bin_dir();
        for entry in &formula.install {
            out.push(format!(
                "  {} -> {}",
                entry.from,
                bin_dir.join(entry.target_name()).display()
            ));
        }
        if let Some(test) = formula.test_command() {
            out.push(format!("Test: {test}"));
        }

        match ReceiptStore::new(self.config.receipts_dir()).load(&formula.name)? {
            Some(receipt) => out.push(format!(
                "Installed: {} ({})",
                receipt.version, receipt.installed_at
            )),
            None => out.push("Not installed".to_string()),
        }

        Ok(out.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{formula::test_support::formula, receipt::Receipt};

    #[test]
    fn renders_descriptor_and_install_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            prefix: dir.path().join("prefix"),
            cache_dir: dir.path().join("cache"),
            tap: dir.path().join("Formula"),
            history_log: false,
        };
        let f = formula(
            "https://x.io/v1.0.0.tar.gz",
            &"ab".repeat(32),
            "create_flutter_app.sh",
            Some("create_flutter_app"),
        );

        let info = Info::new(&config);
        let text = info.render(&f).unwrap();
        assert!(text.starts_with("create-flutter-app 1.0.0"));
        assert!(text.contains("create_flutter_app.sh -> "));
        assert!(text.contains("Test: create_flutter_app -h"));
        assert!(text.ends_with("Not installed"));

        ReceiptStore::new(config.receipts_dir())
            .save(&Receipt {
                name: f.name.clone(),
                version: "1.0.0".into(),
                url: f.url.clone(),
                sha256: f.sha256.clone(),
                files: vec![config.bin_dir().join("create_flutter_app")],
                installed_at: "2026-10-16T10:00:00+00:00".into(),
            })
            .unwrap();
        assert!(info.render(&f).unwrap().contains("Installed: 1.0.0"));
    }
}
