use clap::Parser as _;
use tracing::{debug, error};

use crate::{
    actions::{
        audit::Audit, info::Info, install::Install, list::List, smoke_test::SmokeTest,
        uninstall::Uninstall,
    },
    models::{
        args::{AppArgs, Command},
        config::Config,
    },
    schemas::schema_gen::SchemaGen,
    tap::Tap,
    utils::{
        downloader_def::downloader::Downloader,
        errors::{EmptyResult, FormulaError},
        logger::LoggerUtils,
    },
};

mod actions;
mod models;
mod schemas;
mod tap;
mod utils;

fn main() {
    let args = AppArgs::parse();
    LoggerUtils::init(args.verbose);

    let version = env!("CARGO_PKG_VERSION");
    debug!("formulary, Version: {version}");

    let res = execute(&args);

    if let Err(err) = res {
        match err.downcast_ref::<FormulaError>() {
            Some(formula_err) => error!("{:?}: {}", formula_err.kind(), formula_err),
            None => error!("{err}"),
        }
        std::process::exit(1);
    }
}

/// Only `schema` runs without a config; every other command loads it first.
fn execute(args: &AppArgs) -> EmptyResult {
    let config = || Config::load(args);

    match &args.command {
        Command::Schema { output } => SchemaGen::new().execute(output.as_deref())?,
        Command::Install { name, skip_test } => {
            let config = config()?;
            let tap = Tap::load(&config.tap)?;
            Install::new(&config)?.execute(tap.get(name)?, *skip_test)?;
        }
        Command::Test { name } => {
            let config = config()?;
            let tap = Tap::load(&config.tap)?;
            SmokeTest::run(tap.get(name)?, &config.bin_dir())?;
        }
        Command::Info { name } => {
            let config = config()?;
            let tap = Tap::load(&config.tap)?;
            Info::new(&config).execute(tap.get(name)?)?;
        }
        Command::List => List::new(&config()?).execute()?,
        Command::Uninstall { name, yes } => Uninstall::new(&config()?).execute(name, *yes)?,
        Command::Audit { names } => {
            let config = config()?;
            let tap = Tap::load(&config.tap)?;
            let downloader = Downloader::new(config.cache_dir.clone())?;
            Audit::new(&tap, &downloader).execute(names)?;
        }
    }

    Ok(())
}
