use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser};
use graphfold_rewriter::RewriterOptions;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, Parser)]
#[clap(name = "graphfold", about = "Rewrites a GraphQL operation into its normalized form.")]
pub struct Config {
    /// Path of the config file
    #[clap(long = "config", env = "CONFIG_FILE", default_value = "graphfold.toml")]
    #[serde(skip)]
    pub file: PathBuf,

    /// Path of the composed schema
    #[clap(long, env = "GRAPHFOLD_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Path of the document holding the operation
    #[clap(long, env = "GRAPHFOLD_QUERY")]
    pub query: Option<PathBuf>,

    /// Operation to rewrite when the document holds several
    #[clap(long, env = "GRAPHFOLD_OPERATION_NAME")]
    pub operation_name: Option<String>,

    #[clap(flatten)]
    #[serde(default)]
    pub rewriter: RewriterConfig,
}

#[derive(Args, Debug, Default, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Drop selections excluded by a literal `@skip` / `@include`
    #[clap(long = "remove-statically-excluded", env = "REMOVE_STATICALLY_EXCLUDED")]
    pub remove_statically_excluded_selections: bool,

    /// Do not fail on fields or types missing from the schema
    #[clap(long, env = "IGNORE_MISSING_TYPE_SYSTEM_MEMBERS")]
    pub ignore_missing_type_system_members: bool,
}

impl From<RewriterConfig> for RewriterOptions {
    fn from(config: RewriterConfig) -> Self {
        RewriterOptions {
            remove_statically_excluded_selections: config.remove_statically_excluded_selections,
            ignore_missing_type_system_members: config.ignore_missing_type_system_members,
        }
    }
}

impl Config {
    /// Parse the command line, environment variables and config file.
    /// If the config file exists, it will be parsed and the command line and
    /// environment variables are ignored.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(std::env::args_os())
    }

    pub fn load_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let env_config = Config::parse_from(args);
        if !Path::exists(&env_config.file) {
            return Ok(env_config);
        }

        let file_config = std::fs::read_to_string(&env_config.file)
            .with_context(|| format!("Failed to read config file '{}'.", env_config.file.display()))?;
        let mut file_config: Config = toml::from_str(&file_config)
            .with_context(|| format!("Failed to parse config file '{}'.", env_config.file.display()))?;
        tracing::debug!(file = %env_config.file.display(), "Loaded config file");
        file_config.file = env_config.file;
        Ok(file_config)
    }
}
