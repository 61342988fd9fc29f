use std::fmt;

use tracing::{error, info, warn};

use crate::{
    models::formula::Formula,
    tap::{Tap, TapEntry},
    utils::{
        checksum::ChecksumUtils,
        downloader_def::downloader::Downloader,
        errors::{EmptyResult, ResultWithError},
        semver::SemverUtils,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub formula: String,
    pub severity: Severity,
    pub message: String,
}

/// Lints formulae of a tap.
pub struct Audit<'a> {
    tap: &'a Tap,
    downloader: &'a Downloader,
}

impl<'a> Audit<'a> {
    pub fn new(tap: &'a Tap, downloader: &'a Downloader) -> Self {
        Self { tap, downloader }
    }

    /// Logs every finding and fails if any of them is an error.
    pub fn execute(&self, names: &[String]) -> EmptyResult {
        let findings = self.run(names)?;
        for finding in &findings {
            match finding.severity {
                Severity::Error => error!("{}: {}", finding.formula, finding.message),
                Severity::Warning => warn!("{}: {}", finding.formula, finding.message),
            }
        }

        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        if errors > 0 {
            return Err(format!("Audit found {} error(s)", errors).into());
        }

        info!("✅ Audit passed with {} warning(s)", findings.len());
        Ok(())
    }

    /// Findings for the named formulae, or the whole tap when `names` is
    /// empty. Errors sort before warnings.
    pub fn run(&self, names: &[String]) -> ResultWithError<Vec<Finding>> {
        for name in names {
            let unparsable = self.tap.failures().iter().any(|f| &f.file_name == name);
            if self.tap.revisions(name).is_empty() && !unparsable {
                return Err(format!(
                    "No formula named '{}' in tap {}",
                    name,
                    self.tap.dir().display()
                )
                .into());
            }
        }
        let selected = |name: &str| names.is_empty() || names.iter().any(|n| n == name);

        let mut findings: Vec<Finding> = self
            .tap
            .entries()
            .iter()
            .filter(|e| selected(&e.formula.name))
            .flat_map(|e| self.audit_entry(e))
            .collect();

        for failure in self.tap.failures() {
            if !selected(&failure.file_name) {
                continue;
            }
            findings.push(Finding {
                formula: failure.file_name.clone(),
                severity: Severity::Error,
                message: format!(
                    "{} cannot be parsed: {}",
                    failure.path.display(),
                    failure.reason
                ),
            });
        }

        for conflict in self.tap.conflicts() {
            if !selected(&conflict.name) {
                continue;
            }
            let paths: Vec<_> = conflict
                .paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            findings.push(Finding {
                formula: conflict.name.clone(),
                severity: Severity::Error,
                message: format!(
                    "version {} is defined by {} with different {}",
                    conflict.version,
                    paths.join(", "),
                    conflict.fields.join(", ")
                ),
            });
        }

        findings.sort_by(|a, b| {
            a.severity
                .cmp(&b.severity)
                .then(a.formula.cmp(&b.formula))
        });
        Ok(findings)
    }

    pub fn audit_entry(&self, entry: &TapEntry) -> Vec<Finding> {
        let formula = &entry.formula;
        let mut findings = Vec::new();
        let mut push = |severity: Severity, message: String| {
            findings.push(Finding {
                formula: formula.name.clone(),
                severity,
                message,
            })
        };

        if !Formula::is_valid_name(&formula.name) {
            push(
                Severity::Error,
                format!("name '{}' must be lowercase kebab-case", formula.name),
            );
        }
        if formula.name != entry.file_stem {
            push(
                Severity::Error,
                format!(
                    "name '{}' does not match file name '{}'",
                    formula.name, entry.file_stem
                ),
            );
        }

        Self::audit_desc(formula, &mut push);
        self.audit_urls(formula, &mut push);
        Self::audit_checksum(formula, &mut push);
        Self::audit_version(formula, &mut push);
        Self::audit_install(formula, &mut push);

        findings
    }

    fn audit_desc(formula: &Formula, push: &mut impl FnMut(Severity, String)) {
        let desc = formula.desc.trim();
        if desc.is_empty() {
            push(Severity::Error, "desc is empty".to_string());
            return;
        }

        let first_word = desc.split_whitespace().next().unwrap_or_default();
        if ["a", "an", "the"].contains(&first_word.to_lowercase().as_str()) {
            push(
                Severity::Warning,
                format!("desc should not start with the article '{first_word}'"),
            );
        }
        if desc.ends_with('.') {
            push(Severity::Warning, "desc should not end with a period".to_string());
        }
    }

    fn audit_urls(&self, formula: &Formula, push: &mut impl FnMut(Severity, String)) {
        if self.downloader.provider_for(&formula.url).is_none() {
            push(Severity::Error, format!("url '{}' has an unsupported scheme", formula.url));
        } else if formula.url.starts_with("http://") {
            push(Severity::Warning, "url should use https".to_string());
        }

        if !formula.homepage.starts_with("https://") && !formula.homepage.starts_with("http://") {
            push(
                Severity::Warning,
                format!("homepage '{}' is not an http(s) URL", formula.homepage),
            );
        }
    }

    fn audit_checksum(formula: &Formula, push: &mut impl FnMut(Severity, String)) {
        if ChecksumUtils::is_placeholder(&formula.sha256) {
            push(
                Severity::Error,
                format!("sha256 is a placeholder: '{}'", formula.sha256),
            );
        } else if !ChecksumUtils::is_valid_sha256(formula.sha256.trim()) {
            push(
                Severity::Error,
                "sha256 must be 64 hex characters".to_string(),
            );
        }
    }

    fn audit_version(formula: &Formula, push: &mut impl FnMut(Severity, String)) {
        match formula.version() {
            None => push(
                Severity::Error,
                "version is missing and cannot be inferred from url".to_string(),
            ),
            Some(version) => {
                if !SemverUtils::is_valid_version(&version) {
                    push(
                        Severity::Warning,
                        format!("version '{version}' is not semantic"),
                    );
                }
                if let Some(in_url) = SemverUtils::extract_version(&formula.url)
                    && formula.version.is_some()
                    && in_url.to_string() != version.trim_start_matches('v')
                {
                    push(
                        Severity::Warning,
                        format!("version '{version}' differs from '{in_url}' found in url"),
                    );
                }
            }
        }
    }

    fn audit_install(formula: &Formula, push: &mut impl FnMut(Severity, String)) {
        for problem in formula.install_problems() {
            push(Severity::Error, problem);
        }

        if let Some(test) = &formula.test
            && test.run.trim().is_empty()
        {
            push(Severity::Error, "test command is empty".to_string());
        }
    }
}
