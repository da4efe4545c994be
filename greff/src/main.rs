//! # Greff CLI Entry Point
//!
//! The main executable for the Greff tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs the
//!    log subscriber (filtered by `GREFF_LOG`, written to stderr).
//! 2. **Loading**: Declares every type of the schema document into a fresh registry.
//! 3. **Execution**: Compiles a selection, decodes a payload or describes the declared types.
//! 4. **Presentation**: Formats and prints the result to standard output, or the error to
//!    standard error.

mod cli;
mod formatter;
mod selection;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use formatter::{FormattedString, TypeDescription, TypeList};
use greff_core::{
    query, response,
    schema::{Registry, document::SchemaDocument},
};
use selection::SelectionDocument;
use std::{path::Path, process};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GREFF_LOG";

fn main() {
    let args = Cli::parse();

    init_tracing();

    let registry = or_exit(load_registry(&args.schema));

    match args.command {
        Commands::Compile {
            selection,
            mutation,
        } => compile(&registry, &selection, mutation),
        Commands::Decode { payload } => decode(&registry, &payload),
        Commands::Describe { type_name } => describe(&registry, type_name.as_deref()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn or_exit<T>(result: anyhow::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn load_registry(path: &Path) -> anyhow::Result<Registry> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema document '{}'", path.display()))?;

    let registry = SchemaDocument::from_json(&source)
        .and_then(SchemaDocument::into_registry)
        .with_context(|| format!("Failed to load schema document '{}'", path.display()))?;

    tracing::debug!(
        types = registry.types().count(),
        path = %path.display(),
        "loaded schema document"
    );

    Ok(registry)
}

fn compile(registry: &Registry, path: &Path, mutation: bool) {
    let (selections, fragments) = or_exit(
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selection document '{}'", path.display()))
            .and_then(|source| SelectionDocument::from_json(&source))
            .and_then(|document| document.resolve(registry)),
    );

    let document = if mutation {
        query::compile_mutation(&selections, &fragments)
    } else {
        query::compile(&selections, &fragments)
    };

    match document {
        Ok(document) => println!("{}", FormattedString(document)),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn decode(registry: &Registry, path: &Path) {
    let payload = or_exit(read_payload(path));

    match response::decode(registry, payload) {
        Ok(results) => println!("{}", FormattedString::from(results)),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn read_payload(path: &Path) -> anyhow::Result<serde_json::Value> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read payload '{}'", path.display()))?;

    serde_json::from_str(&source)
        .with_context(|| format!("Payload '{}' is not valid JSON", path.display()))
}

fn describe(registry: &Registry, type_name: Option<&str>) {
    let Some(name) = type_name else {
        println!("{}", FormattedString::from(TypeList(registry)));
        return;
    };

    match registry.resolve_by_name(name) {
        Some(descriptor) => println!(
            "{}",
            FormattedString::from(TypeDescription {
                registry,
                descriptor,
            })
        ),
        None => {
            eprintln!(
                "{}",
                FormattedString::from(anyhow::anyhow!("Type '{name}' is not declared"))
            );
            process::exit(1);
        }
    }
}
