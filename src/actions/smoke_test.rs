use std::path::Path;

use tracing::{error, info};

use crate::{
    models::formula::Formula,
    utils::{
        command::CommandUtils,
        errors::{FormulaError, FormulaResult},
        shlex::ShlexUtils,
    },
};

/// Post-install check: the formula's test command must exit with status 0.
pub struct SmokeTest {}

impl SmokeTest {
    pub fn run(formula: &Formula, bin_dir: &Path) -> FormulaResult<()> {
        let command = formula.test_command().ok_or_else(|| FormulaError::TestFailure {
            command: String::new(),
            reason: format!("formula '{}' installs nothing to test", formula.name),
        })?;
        let failure = |reason: String| FormulaError::TestFailure {
            command: command.clone(),
            reason,
        };

        let (program, args) =
            ShlexUtils::parse_command(&command, bin_dir).map_err(|e| failure(e.to_string()))?;
        if !program.is_file() {
            return Err(failure(format!("{} is not installed", program.display())));
        }

        // Run from a scratch directory so the test cannot litter the cwd.
        let scratch = tempfile::Builder::new()
            .prefix("formulary-test-")
            .tempdir()
            .map_err(|e| failure(e.to_string()))?;

        info!("Testing {}: {}", formula.name, command);
        let output = CommandUtils::run_command(&program, &args, Some(scratch.path()))
            .map_err(|e| failure(format!("could not spawn: {e}")))?;

        if output.success() {
            info!("✅ Smoke test of '{}' passed", formula.name);
            return Ok(());
        }

        let reason = match output.status {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by a signal".to_string(),
        };
        error!(
            "❌ Smoke test of '{}' {}\nstdout: {}\nstderr: {}",
            formula.name, reason, output.stdout, output.stderr
        );
        Err(failure(reason))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt as _;

    use super::*;
    use crate::models::formula::{TestStep, test_support::formula};
    use crate::utils::errors::ErrorKind;

    const SHA: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    fn install_script(bin_dir: &Path, name: &str, body: &str) {
        let path = bin_dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn subject() -> Formula {
        formula(
            "https://x.io/v1.0.0.tar.gz",
            SHA,
            "bin/create_flutter_app",
            None,
        )
    }

    #[test]
    fn passes_on_exit_zero() {
        let bin = tempfile::tempdir().unwrap();
        install_script(bin.path(), "create_flutter_app", r#"[ "$1" = "-h" ] && exit 0; exit 2"#);
        assert!(SmokeTest::run(&subject(), bin.path()).is_ok());
    }

    #[test]
    fn fails_on_any_non_zero_exit() {
        let bin = tempfile::tempdir().unwrap();
        install_script(bin.path(), "create_flutter_app", "exit 1");
        let err = SmokeTest::run(&subject(), bin.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TestFailure);
        assert!(err.to_string().contains("status 1"));
    }

    #[test]
    fn fails_when_killed_by_signal() {
        let bin = tempfile::tempdir().unwrap();
        install_script(bin.path(), "create_flutter_app", "kill -9 $$");
        let err = SmokeTest::run(&subject(), bin.path()).unwrap_err();
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn fails_when_binary_is_missing() {
        let bin = tempfile::tempdir().unwrap();
        let err = SmokeTest::run(&subject(), bin.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TestFailure);
        assert!(err.to_string().contains("not installed"));
    }

    #[test]
    fn uses_custom_test_command() {
        let bin = tempfile::tempdir().unwrap();
        install_script(bin.path(), "create_flutter_app", r#"[ "$1" = "--version" ] || exit 5"#);
        let mut f = subject();
        f.test = Some(TestStep {
            run: "create_flutter_app --version".into(),
        });
        assert!(SmokeTest::run(&f, bin.path()).is_ok());
    }
}
