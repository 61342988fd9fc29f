use std::{collections::HashSet, path::Path};

use lazy_static::lazy_static;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::utils::{
    archive::ArchiveUtils,
    checksum::ChecksumUtils,
    errors::{FormulaError, FormulaResult, ResultTrait as _, ResultWithError},
    semver::SemverUtils,
};

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[a-z0-9]+(?:[-@+.][a-z0-9]+)*$").unwrap();
}

/// Declarative description of a single-binary package: where to fetch it,
/// what it must hash to, what to place in the bin directory and how to
/// smoke-test the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Formula {
    /// Kebab-case identifier, equal to the formula file stem
    pub name: String,
    /// Human readable description
    pub desc: String,
    /// Project homepage, informational only
    pub homepage: String,
    /// Artifact location: https://, http://, file:// or a local path
    pub url: String,
    /// Expected SHA-256 of the artifact, 64 hex characters
    pub sha256: String,
    /// Release version. Inferred from the first X.Y.Z in `url` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Files to copy from the staged artifact into the bin directory
    pub install: Vec<InstallEntry>,
    /// Post-install smoke test. Defaults to `<first installed binary> -h`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InstallEntry {
    /// Path relative to the staged root, e.g. `bin/create_flutter_app`
    pub from: String,
    /// File name in the bin directory; defaults to the basename of `from`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl InstallEntry {
    pub fn target_name(&self) -> String {
        if let Some(to) = &self.to {
            return to.clone();
        }
        Path::new(&self.from)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TestStep {
    /// Command line; a bare program name is looked up in the bin directory
    pub run: String,
}

/// What a host needs to fetch a formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub url: String,
    pub sha256: String,
    pub version: String,
}

impl Formula {
    pub fn from_yaml(content: &str) -> ResultWithError<Self> {
        serde_yaml::from_str(content).auto_err("Invalid formula format")
    }

    /// Declared version, or the one embedded in the URL.
    pub fn version(&self) -> Option<String> {
        match &self.version {
            Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            _ => SemverUtils::extract_version(&self.url).map(|v| v.to_string()),
        }
    }

    pub fn resolve(&self) -> FormulaResult<Resolved> {
        let version = self.version().ok_or_else(|| {
            FormulaError::invalid(&self.name, "no version declared or inferable from url")
        })?;
        Ok(Resolved {
            url: self.url.clone(),
            sha256: self.sha256.trim().to_lowercase(),
            version,
        })
    }

    pub fn targets(&self) -> Vec<String> {
        self.install.iter().map(InstallEntry::target_name).collect()
    }

    pub fn test_command(&self) -> Option<String> {
        match &self.test {
            Some(test) => Some(test.run.clone()),
            None => self.targets().first().map(|bin| format!("{bin} -h")),
        }
    }

    /// Checks everything an install relies on. Style issues are left to
    /// the audit.
    pub fn validate(&self) -> FormulaResult<()> {
        let invalid = |reason: String| Err(FormulaError::invalid(&self.name, reason));

        if !Self::is_valid_name(&self.name) {
            return invalid(format!("name '{}' must be lowercase kebab-case", self.name));
        }
        if ChecksumUtils::is_placeholder(&self.sha256) {
            return invalid(format!("sha256 is a placeholder: '{}'", self.sha256));
        }
        if !ChecksumUtils::is_valid_sha256(self.sha256.trim()) {
            return invalid(format!(
                "sha256 must be 64 hex characters, got '{}'",
                self.sha256
            ));
        }
        if self.version().is_none() {
            return invalid("no version declared or inferable from url".to_string());
        }
        if let Some(problem) = self.install_problems().into_iter().next() {
            return invalid(problem);
        }

        Ok(())
    }

    /// Names end up in file names (receipts, cache entries), so only
    /// lowercase kebab-case with `@`, `+` or `.` separators is allowed.
    pub fn is_valid_name(name: &str) -> bool {
        NAME_RE.is_match(name)
    }

    /// Every problem with the `install` list, in declaration order.
    pub fn install_problems(&self) -> Vec<String> {
        if self.install.is_empty() {
            return vec!["install lists no files".to_string()];
        }

        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for entry in &self.install {
            match ArchiveUtils::sanitize(Path::new(&entry.from)) {
                Some(clean) if !clean.as_os_str().is_empty() => {}
                _ => problems.push(format!(
                    "install path '{}' is not a relative path inside the archive",
                    entry.from
                )),
            }

            let target = entry.target_name();
            if !Self::is_plain_file_name(&target) {
                problems.push(format!(
                    "install target '{target}' is not a plain file name"
                ));
            } else if !seen.insert(target.clone()) {
                problems.push(format!("install target '{target}' is listed twice"));
            }
        }

        problems
    }

    fn is_plain_file_name(name: &str) -> bool {
        !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
    }
}
