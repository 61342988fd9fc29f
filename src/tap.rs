use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    models::formula::Formula,
    utils::{
        dir::{DirUtils, YamlFailure},
        errors::ResultWithError,
    },
};

#[derive(Debug, Clone)]
pub struct TapEntry {
    pub path: PathBuf,
    pub file_stem: String,
    pub formula: Formula,
}

/// Revisions of one `name`/`version` pair that disagree with each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub name: String,
    pub version: String,
    pub paths: Vec<PathBuf>,
    pub fields: Vec<&'static str>,
}

/// A directory of formula files.
pub struct Tap {
    dir: PathBuf,
    entries: Vec<TapEntry>,
    failures: Vec<YamlFailure>,
}

impl Tap {
    pub fn load(dir: &Path) -> ResultWithError<Self> {
        let scan = DirUtils::parse_all_yaml::<Formula>(dir)?;
        let entries = scan
            .parsed
            .into_iter()
            .map(|res| TapEntry {
                path: res.path,
                file_stem: res.file_name,
                formula: res.content,
            })
            .collect::<Vec<_>>();

        debug!(
            "Loaded {} formula file(s) from {:?}, {} unreadable",
            entries.len(),
            dir,
            scan.failed.len()
        );
        let mut tap = Self::from_entries(dir.to_path_buf(), entries);
        tap.failures = scan.failed;
        Ok(tap)
    }

    pub fn from_entries(dir: PathBuf, entries: Vec<TapEntry>) -> Self {
        Self {
            dir,
            entries,
            failures: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[TapEntry] {
        &self.entries
    }

    /// Formula files that could not be read or parsed.
    pub fn failures(&self) -> &[YamlFailure] {
        &self.failures
    }

    pub fn revisions(&self, name: &str) -> Vec<&TapEntry> {
        self.entries
            .iter()
            .filter(|e| e.formula.name == name)
            .collect()
    }

    /// The canonical revision of `name`: the first one in path order.
    pub fn get(&self, name: &str) -> ResultWithError<&Formula> {
        let revisions = self.revisions(name);
        let Some(first) = revisions.first() else {
            if let Some(failure) = self.failures.iter().find(|f| f.file_name == name) {
                return Err(format!(
                    "Formula file {} cannot be parsed: {}",
                    failure.path.display(),
                    failure.reason
                )
                .into());
            }
            return Err(format!(
                "No formula named '{}' in tap {}",
                name,
                self.dir.display()
            )
            .into());
        };

        if revisions.len() > 1 {
            let others: Vec<_> = revisions[1..]
                .iter()
                .map(|e| e.path.display().to_string())
                .collect();
            warn!(
                "Formula '{}' is defined {} times; using {} and ignoring {}",
                name,
                revisions.len(),
                first.path.display(),
                others.join(", ")
            );
        }

        Ok(&first.formula)
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut groups: BTreeMap<(String, String), Vec<&TapEntry>> = BTreeMap::new();
        for entry in &self.entries {
            let version = entry.formula.version().unwrap_or_default();
            groups
                .entry((entry.formula.name.clone(), version))
                .or_default()
                .push(entry);
        }

        groups
            .into_iter()
            .filter(|(_, revisions)| revisions.len() > 1)
            .filter_map(|((name, version), revisions)| {
                let fields = Self::differing_fields(&revisions);
                if fields.is_empty() {
                    return None;
                }
                Some(Conflict {
                    name,
                    version,
                    paths: revisions.iter().map(|e| e.path.clone()).collect(),
                    fields,
                })
            })
            .collect()
    }

    fn differing_fields(revisions: &[&TapEntry]) -> Vec<&'static str> {
        let first = &revisions[0].formula;
        let rest = &revisions[1..];
        let mut fields = Vec::new();

        if rest.iter().any(|e| e.formula.url != first.url) {
            fields.push("url");
        }
        if rest
            .iter()
            .any(|e| !e.formula.sha256.eq_ignore_ascii_case(&first.sha256))
        {
            fields.push("sha256");
        }
        if rest.iter().any(|e| e.formula.install != first.install) {
            fields.push("install");
        }
        if rest.iter().any(|e| e.formula.homepage != first.homepage) {
            fields.push("homepage");
        }
        fields
    }
}
