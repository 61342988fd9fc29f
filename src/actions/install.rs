use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    actions::smoke_test::SmokeTest,
    models::{
        config::Config,
        formula::Formula,
        receipt::{Receipt, ReceiptStore},
    },
    utils::{
        archive::ArchiveUtils,
        downloader_def::downloader::Downloader,
        errors::{FormulaError, FormulaResult, ResultWithError},
        file_logger::FileLogger,
    },
};

/// Full install pipeline: validate, fetch, verify, stage, copy, record and
/// optionally smoke-test.
pub struct Install<'a> {
    config: &'a Config,
    downloader: Downloader,
    history: FileLogger,
}

impl<'a> Install<'a> {
    pub fn new(config: &'a Config) -> ResultWithError<Self> {
        Ok(Self::with_parts(
            config,
            Downloader::new(config.cache_dir.clone())?,
            FileLogger::new("history.log", config.history_log),
        ))
    }

    pub fn with_parts(
        config: &'a Config,
        downloader: Downloader,
        history: FileLogger,
    ) -> Self {
        Self {
            config,
            downloader,
            history,
        }
    }

    pub fn execute(&self, formula: &Formula, skip_test: bool) -> FormulaResult<Receipt> {
        formula.validate()?;
        let resolved = formula.resolve()?;
        info!("Installing {} {}", formula.name, resolved.version);

        // Nothing is staged or copied until the artifact is verified.
        let artifact = self.downloader.fetch_verified(&formula.name, &resolved)?;

        let staging = tempfile::Builder::new()
            .prefix("formulary-stage-")
            .tempdir()
            .map_err(|e| FormulaError::install(&formula.name, e.to_string()))?;
        let staged_root = ArchiveUtils::stage(
            &artifact,
            &Downloader::basename(&resolved.url),
            staging.path(),
        )
        .map_err(|e| FormulaError::install(&formula.name, format!("could not unpack: {e}")))?;

        let bin_dir = self.config.bin_dir();
        let files = Self::install_files(formula, &staged_root, &bin_dir)?;

        let receipt = Receipt {
            name: formula.name.clone(),
            version: resolved.version.clone(),
            url: resolved.url.clone(),
            sha256: resolved.sha256.clone(),
            files,
            installed_at: chrono::Local::now().to_rfc3339(),
        };
        ReceiptStore::new(self.config.receipts_dir())
            .save(&receipt)
            .map_err(|e| FormulaError::install(&formula.name, e.to_string()))?;
        self.history
            .log(&format!("installed {} {}", receipt.name, receipt.version));
        info!(
            "✅ Installed {} {} into {}",
            formula.name,
            resolved.version,
            bin_dir.display()
        );

        if skip_test {
            debug!("Skipping smoke test of {}", formula.name);
        } else {
            SmokeTest::run(formula, &bin_dir)?;
        }

        Ok(receipt)
    }

    /// Copies every install entry from `staged_root` into `bin_dir`, marking
    /// the results executable. Every source is checked before the first copy,
    /// and each copy replaces its target atomically, so repeating the call
    /// leaves the same end state.
    pub fn install_files(
        formula: &Formula,
        staged_root: &Path,
        bin_dir: &Path,
    ) -> FormulaResult<Vec<PathBuf>> {
        let fail = |reason: String| FormulaError::install(&formula.name, reason);

        let root = staged_root
            .canonicalize()
            .map_err(|e| fail(format!("cannot read {}: {e}", staged_root.display())))?;

        let mut plan = Vec::with_capacity(formula.install.len());
        for entry in &formula.install {
            let source = staged_root.join(&entry.from);
            let missing = || {
                fail(format!(
                    "'{}' does not exist in the downloaded archive",
                    entry.from
                ))
            };

            let meta = fs::symlink_metadata(&source).map_err(|_| missing())?;
            if meta.file_type().is_symlink() {
                return Err(fail(format!("'{}' is a symbolic link", entry.from)));
            }
            if !meta.is_file() {
                return Err(missing());
            }
            // A symlinked parent directory could still lead out of the archive.
            match source.canonicalize() {
                Ok(real) if real.starts_with(&root) => {}
                _ => {
                    return Err(fail(format!(
                        "'{}' resolves outside the downloaded archive",
                        entry.from
                    )));
                }
            }
            plan.push((source, bin_dir.join(entry.target_name())));
        }

        fs::create_dir_all(bin_dir)
            .map_err(|e| fail(format!("cannot create {}: {e}", bin_dir.display())))?;

        let mut installed = Vec::with_capacity(plan.len());
        for (source, target) in plan {
            Self::copy_executable(&source, &target, bin_dir)
                .map_err(|e| fail(format!("cannot write {}: {e}", target.display())))?;
            debug!("Installed {} -> {}", source.display(), target.display());
            installed.push(target);
        }

        Ok(installed)
    }

    fn copy_executable(source: &Path, target: &Path, bin_dir: &Path) -> io::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".formulary-")
            .tempfile_in(bin_dir)?;
        io::copy(&mut File::open(source)?, tmp.as_file_mut())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o755))?;
        }

        tmp.persist(target).map_err(|e| e.error)?;
        Ok(())
    }
}
