// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sciwire::formats::{json, msgpack};
use sciwire::{Config, Value};

#[derive(Parser)]
#[command(name = "sciwire-convert")]
#[command(about = "Convert sciwire documents between JSON and MessagePack")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Decode unclaimed values through the opaque fallback (same-build only)
    #[arg(long, global = true)]
    allow_opaque: bool,

    /// Override the reserved envelope type key
    #[arg(long, global = true, value_name = "KEY")]
    type_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to the other wire format
    Convert {
        /// Input file (.json or .mpk/.msgpack)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file; format inferred from its extension
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Input format (inferred from the extension if not given)
        #[arg(long, value_enum)]
        from: Option<WireFormat>,

        /// Output format (inferred from the extension if not given)
        #[arg(long, value_enum)]
        to: Option<WireFormat>,
    },

    /// Pretty-print a document as JSON on stdout
    Show {
        /// Input file (.json or .mpk/.msgpack)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Input format (inferred from the extension if not given)
        #[arg(long, value_enum)]
        from: Option<WireFormat>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum WireFormat {
    Json,
    Msgpack,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::new().with_opaque_fallback(cli.allow_opaque);
    if let Some(key) = &cli.type_key {
        config = config.with_type_key(key.clone());
    }

    match cli.command {
        Commands::Convert {
            input,
            output,
            from,
            to,
        } => cmd_convert(&input, &output, from, to, &config),
        Commands::Show { input, from } => cmd_show(&input, from, &config),
    }
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    from: Option<WireFormat>,
    to: Option<WireFormat>,
    config: &Config,
) -> anyhow::Result<()> {
    let value = read_document(input, from, config)?;
    let to = resolve_format(output, to)?;
    match to {
        WireFormat::Json => json::to_file(output, &value, config)
            .with_context(|| format!("writing {}", output.display()))?,
        WireFormat::Msgpack => msgpack::to_file(output, &value, config)
            .with_context(|| format!("writing {}", output.display()))?,
    }
    println!("{} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_show(input: &Path, from: Option<WireFormat>, config: &Config) -> anyhow::Result<()> {
    let value = read_document(input, from, config)?;
    let text = json::to_string_pretty(&value, config)?;
    println!("{}", text);
    Ok(())
}

fn read_document(
    input: &Path,
    from: Option<WireFormat>,
    config: &Config,
) -> anyhow::Result<Value> {
    let format = resolve_format(input, from)?;
    let value = match format {
        WireFormat::Json => json::from_file(input, config)
            .with_context(|| format!("reading {}", input.display()))?,
        WireFormat::Msgpack => msgpack::from_file(input, config)
            .with_context(|| format!("reading {}", input.display()))?,
    };
    Ok(value)
}

fn resolve_format(path: &Path, explicit: Option<WireFormat>) -> anyhow::Result<WireFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(WireFormat::Json),
        Some("mpk") | Some("msgpack") => Ok(WireFormat::Msgpack),
        _ => bail!(
            "cannot infer wire format of '{}'; pass --from/--to",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_format_by_extension() {
        let json = resolve_format(Path::new("a/tree.json"), None).expect("json extension");
        assert_eq!(json, WireFormat::Json);
        let mpk = resolve_format(Path::new("tree.mpk"), None).expect("mpk extension");
        assert_eq!(mpk, WireFormat::Msgpack);
        assert!(resolve_format(Path::new("tree.bin"), None).is_err());
        let explicit = resolve_format(Path::new("tree.bin"), Some(WireFormat::Json))
            .expect("explicit format");
        assert_eq!(explicit, WireFormat::Json);
    }

    #[test]
    fn test_convert_roundtrip_between_formats() {
        let config = Config::default();
        let dir = tempfile::tempdir().expect("temp dir");
        let json_path = dir.path().join("doc.json");
        let mpk_path = dir.path().join("doc.mpk");

        let mut tree = sciwire::Map::new();
        tree.insert("n".to_string(), Value::from(3i64));
        tree.insert("raw".to_string(), Value::Bytes(vec![1, 2, 3]));
        let tree = Value::Map(tree);
        json::to_file(&json_path, &tree, &config).expect("seed json file");

        cmd_convert(&json_path, &mpk_path, None, None, &config).expect("convert");
        assert_eq!(
            msgpack::from_file(&mpk_path, &config).expect("read converted file"),
            tree
        );
    }
}
