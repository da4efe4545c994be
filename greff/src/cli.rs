//! # CLI
//!
//! This module defines the command-line interface of `greff` using `clap`.
//!
//! Every command works offline against a JSON schema document, so a selection can be checked
//! and a captured payload decoded without reaching a server.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "greff", version, about = "Declarative GraphQL query builder")]
pub struct Cli {
    /// Path to the JSON schema document declaring the types
    #[arg(short, long, global = true, default_value = "schema.json")]
    pub schema: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a selection document into query text
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// greff compile --schema schema.json --selection books.json
    /// ```
    Compile {
        /// Path to the JSON selection document
        #[arg(long, value_parser = parse_document_path)]
        selection: PathBuf,

        /// Emit a `mutation{...}` document using the mutation root names
        #[arg(long)]
        mutation: bool,
    },

    /// Decode a captured GraphQL response into typed instances
    Decode {
        /// Path to the JSON payload (`{"data": ..., "errors": ...}`)
        #[arg(long, value_parser = parse_document_path)]
        payload: PathBuf,
    },

    /// Describe the declared types
    Describe {
        /// Declared name of a single type to describe
        #[arg(value_parser = parse_type_name)]
        type_name: Option<String>,
    },
}

fn parse_document_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);

    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(path),
        _ => Err(format!("Invalid document path: '{value}'. Expected a .json file")),
    }
}

fn parse_type_name(value: &str) -> Result<String, String> {
    let name = value.trim();

    if name.is_empty() {
        return Err("Type name cannot be empty".to_string());
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_path_must_be_json() {
        assert!(parse_document_path("books.json").is_ok());
        assert!(parse_document_path("books.JSON").is_ok());
        assert!(parse_document_path("books.yaml").is_err());
        assert!(parse_document_path("books").is_err());
    }

    #[test]
    fn test_type_name_is_trimmed() {
        assert_eq!(parse_type_name(" Book ").unwrap(), "Book");
        assert!(parse_type_name("   ").is_err());
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from([
            "greff",
            "compile",
            "--schema",
            "library.json",
            "--selection",
            "books.json",
            "--mutation",
        ])
        .unwrap();

        assert_eq!(cli.schema, PathBuf::from("library.json"));
        match cli.command {
            Commands::Compile {
                selection,
                mutation,
            } => {
                assert_eq!(selection, PathBuf::from("books.json"));
                assert!(mutation);
            }
            _ => panic!("Expected the compile command"),
        }

        let cli = Cli::try_parse_from(["greff", "describe", "Book"]).unwrap();
        assert_eq!(cli.schema, PathBuf::from("schema.json"));
        assert!(matches!(
            cli.command,
            Commands::Describe { type_name: Some(name) } if name == "Book"
        ));
    }
}
