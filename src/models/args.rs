use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch, verify and install a formula, then run its smoke test
    Install {
        /// Formula name
        name: String,
        /// Do not run the smoke test after installing
        #[arg(long)]
        skip_test: bool,
    },
    /// Run the smoke test of an installed formula
    Test {
        /// Formula name
        name: String,
    },
    /// Show a formula and whether it is installed
    Info {
        /// Formula name
        name: String,
    },
    /// List installed formulae
    List,
    /// Remove the files an install placed
    Uninstall {
        /// Formula name
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Check formulae for problems. Audits the whole tap when no name is given
    Audit {
        /// Formula names
        names: Vec<String>,
    },
    /// Write the JSON schema of the formula format
    Schema {
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "formulary",
    version,
    about = "Install single-binary tools from YAML formula files.",
    long_about = r#"
formulary reads package formulae from a tap directory and installs them.

Each formula names an artifact URL and its SHA-256. An install downloads the
artifact into a cache, refuses it unless the checksum matches, unpacks it into
a private staging directory, copies the listed files into <prefix>/bin and runs
a smoke test (by default the installed binary with -h).

Common use cases include:
  • Installing a helper script such as create-flutter-app
  • Auditing formulae before publishing them
  • Removing what an earlier install placed
"#
)]
pub struct AppArgs {
    /// Directory holding formula files (default: ./Formula)
    #[arg(long, global = true)]
    pub tap: Option<PathBuf>,

    /// Installation prefix; binaries go to <prefix>/bin (default: ~/.local)
    #[arg(long, global = true)]
    pub prefix: Option<PathBuf>,

    /// Configuration file (default: <config dir>/formulary/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}
