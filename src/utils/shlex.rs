use std::path::{Path, PathBuf};

use shlex::Shlex;

use crate::utils::errors::{OptionResultTrait as _, ResultWithError};

pub struct ShlexUtils {}

impl ShlexUtils {
    /// Splits a command line into a program and its arguments. A bare
    /// program name (no path separator) is resolved inside `bin_dir`.
    pub fn parse_command(input: &str, bin_dir: &Path) -> ResultWithError<(PathBuf, Vec<String>)> {
        let mut lexer = Shlex::new(input);
        let parts: Vec<_> = lexer.by_ref().collect();
        if lexer.had_error {
            return Err(format!("Unbalanced quoting in command: {}", input).into());
        }

        let (program, args) = parts
            .split_first()
            .auto_err(format!("Failed to split command: {}", input).as_str())?;

        let program = if program.contains('/') {
            PathBuf::from(program)
        } else {
            bin_dir.join(program)
        };

        Ok((program, args.to_vec()))
    }
}
