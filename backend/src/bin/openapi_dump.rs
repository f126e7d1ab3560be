//! Print the OpenAPI document.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};

use clap::{Parser, ValueEnum};
use storefront::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Print the storefront OpenAPI document", version)]
struct CliArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    let doc = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Json => doc.to_pretty_json().map_err(io::Error::other)?,
        Format::Yaml => doc.to_yaml().map_err(io::Error::other)?,
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")
}
