pub mod commands;
pub mod errors;
pub mod tracing_init;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Output as JSON (default)
    #[default]
    Json,
    /// Output as YAML
    Yaml,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "aperture-oas: load, resolve and query OpenAPI 3.x documents",
    long_about = "aperture-oas loads OpenAPI 3.0/3.1 documents (JSON or YAML), resolves their\n\
                  $ref graph, including references into other documents, and answers\n\
                  JSON Pointer lookups against the result.\n\n\
                  Examples:\n  \
                  aperture-oas roundtrip petstore.yaml --format json\n  \
                  aperture-oas resolve petstore.yaml\n  \
                  aperture-oas find petstore.yaml '/paths/~1pets/get'\n  \
                  aperture-oas validate petstore.yaml '/components/schemas/Pet' pet.json"
)]
pub struct Cli {
    /// Output all errors as structured JSON to stderr
    #[arg(long, global = true, help = "Output errors in JSON format")]
    pub json_errors: bool,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        global = true,
        action = ArgAction::Count,
        help = "Increase logging verbosity (-v for debug, -vv for trace)"
    )]
    pub verbosity: u8,

    /// Configuration file (defaults to $APERTURE_OAS_CONFIG when set)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat any reference into another document as an error
    #[arg(long, global = true)]
    pub no_remote: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a document and write it back out
    Roundtrip {
        /// Path to the `OpenAPI` document
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Resolve every $ref and report what stayed unresolved
    Resolve {
        /// Path to the `OpenAPI` document
        file: PathBuf,
        /// Exit with an error when any reference stays unresolved
        #[arg(long)]
        strict: bool,
    },
    /// Look up the node at a JSON Pointer after resolving references
    Find {
        /// Path to the `OpenAPI` document
        file: PathBuf,
        /// JSON Pointer such as `/paths/~1pets/get`
        pointer: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Validate a JSON/YAML instance against a schema in the document
    Validate {
        /// Path to the `OpenAPI` document
        file: PathBuf,
        /// JSON Pointer to the schema, such as `/components/schemas/Pet`
        pointer: String,
        /// Instance to validate (JSON or YAML)
        instance: PathBuf,
    },
}
