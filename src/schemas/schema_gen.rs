use std::{fs, path::Path};

use schemars::{JsonSchema, schema_for};
use tracing::info;

use crate::{
    models::{config::ConfigFile, formula::Formula},
    utils::errors::{EmptyResult, ResultWithError},
};

pub struct SchemaGen {}

impl SchemaGen {
    pub fn new() -> Self {
        Self {}
    }

    /// Writes the formula schema to `output`, or prints it. The config file
    /// schema goes next to it as `config.schema.json`.
    pub fn execute(&self, output: Option<&Path>) -> EmptyResult {
        let formula_schema = Self::render::<Formula>()?;
        let Some(output) = output else {
            println!("{formula_schema}");
            return Ok(());
        };

        Self::write(output, &formula_schema)?;
        let config_path = output.with_file_name("config.schema.json");
        Self::write(&config_path, &Self::render::<ConfigFile>()?)?;
        Ok(())
    }

    pub fn render<T>() -> ResultWithError<String>
    where
        T: JsonSchema,
    {
        let schema = schema_for!(T);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    fn write(path: &Path, content: &str) -> EmptyResult {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        info!("✅ Schema generated successfully at {}", path.display());
        Ok(())
    }
}
