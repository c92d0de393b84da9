#![forbid(unsafe_code)]

mod config;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use config::Config;
use graphfold_rewriter::{print_document, DocumentRewriter};
use graphfold_schema::ComposedSchema;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn read_file<'a>(path: Option<&'a Path>, what: &str) -> Result<(&'a Path, String)> {
    let path = path.with_context(|| format!("No {} file given.", what))?;
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to load {} file '{}'.", what, path.display()))?;
    Ok((path, content))
}

/// Loads the schema and the operation named by the config and returns the
/// rewritten operation as GraphQL text.
fn run(config: &Config) -> Result<String> {
    let (schema_path, sdl) = read_file(config.schema.as_deref(), "schema")?;
    let schema = ComposedSchema::parse(&sdl)
        .with_context(|| format!("Failed to parse schema file '{}'.", schema_path.display()))?;

    let (query_path, query) = read_file(config.query.as_deref(), "query")?;
    let document =
        parser::parse_query(query).with_context(|| format!("Failed to parse query file '{}'.", query_path.display()))?;

    let rewritten = DocumentRewriter::new(&schema)
        .options(config.rewriter.into())
        .rewrite_document(&document, config.operation_name.as_deref())
        .with_context(|| format!("Failed to rewrite the operation in '{}'.", query_path.display()))?;
    tracing::info!(query = %query_path.display(), "Operation rewritten");

    Ok(print_document(&rewritten))
}

fn main() -> Result<()> {
    init_tracing();

    let config = Config::load()?;
    println!("{}", run(&config)?);
    Ok(())
}
