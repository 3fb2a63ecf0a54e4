//! `avro-interop` command-line tool.
//!
//! - `write`: JSON datums (one or more, whitespace separated) → Avro binary
//! - `read`: Avro binary → one JSON line per datum
//! - `schema`: validate a schema and print it normalized

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use avro_interop_buffers::{BufferError, ByteSource, IoSink, IoSource};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value as JsonValue;

use crate::config::{CodecConfig, ConfigError};
use crate::error::{DecodeError, EncodeError, JsonError, SchemaError};
use crate::json::{value_from_json, value_to_json};
use crate::schema::Schema;
use crate::schema_decoder::SchemaDecoder;
use crate::schema_encoder::SchemaEncoder;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid JSON input: {0}")]
    Json(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("datum {index}: {source}")]
    Encode { index: usize, source: EncodeError },
    #[error("datum {index}: {source}")]
    Decode { index: usize, source: DecodeError },
    #[error("datum {index}: {source}")]
    Datum { index: usize, source: JsonError },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn io_error(path: &str, err: impl ToString) -> CliError {
    CliError::Io {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Encode and decode Avro binary datums.
#[derive(Parser, Debug)]
#[command(name = "avro-interop")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode JSON datums as Avro binary
    Write {
        /// Schema file (.avsc)
        #[arg(long, value_name = "AVSC")]
        schema: PathBuf,
        /// JSON input (default: stdin)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Binary output (default: stdout)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Codec configuration (TOML)
        #[arg(long, value_name = "TOML")]
        config: Option<PathBuf>,
    },
    /// Decode Avro binary datums to JSON lines
    Read {
        /// Schema file (.avsc)
        #[arg(long, value_name = "AVSC")]
        schema: PathBuf,
        /// Binary input (default: stdin)
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Codec configuration (TOML)
        #[arg(long, value_name = "TOML")]
        config: Option<PathBuf>,
    },
    /// Validate a schema and print its normalized form
    Schema {
        /// Schema file (.avsc)
        #[arg(long, value_name = "AVSC")]
        schema: PathBuf,
    },
}

pub fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Write {
            schema,
            input,
            output,
            config,
        } => {
            let schema = load_schema(&schema)?;
            let config = load_config(config.as_deref())?;
            let input = open_input(input.as_deref())?;
            let (output, name) = open_output(output.as_deref())?;
            let count = write_datums(&schema, &config, input, output)?;
            tracing::info!(count, output = %name, "encoded datums");
        }
        Command::Read {
            schema,
            input,
            config,
        } => {
            let schema = load_schema(&schema)?;
            let config = load_config(config.as_deref())?;
            let input = open_input(input.as_deref())?;
            let count = read_datums(&schema, &config, input, io::stdout().lock())?;
            tracing::info!(count, "decoded datums");
        }
        Command::Schema { schema } => {
            let schema = load_schema(&schema)?;
            print_schema(&schema, io::stdout().lock())?;
        }
    }
    Ok(())
}

pub fn load_schema(path: &Path) -> Result<Schema, CliError> {
    let text = fs::read_to_string(path).map_err(|e| io_error(&path.display().to_string(), e))?;
    Ok(Schema::parse(&text)?)
}

fn load_config(path: Option<&Path>) -> Result<CodecConfig, CliError> {
    Ok(match path {
        Some(path) => CodecConfig::load(path)?,
        None => CodecConfig::default(),
    })
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>, CliError> {
    Ok(match path {
        Some(path) => {
            let file = File::open(path).map_err(|e| io_error(&path.display().to_string(), e))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(path: Option<&Path>) -> Result<(Box<dyn Write>, String), CliError> {
    Ok(match path {
        Some(path) => {
            let name = path.display().to_string();
            let file = File::create(path).map_err(|e| io_error(&name, e))?;
            (Box::new(BufWriter::new(file)), name)
        }
        None => (Box::new(io::stdout().lock()), "<stdout>".to_string()),
    })
}

/// Encodes every JSON datum in `input` back to back into `output`.
pub fn write_datums<R: Read, W: Write>(
    schema: &Schema,
    config: &CodecConfig,
    input: R,
    output: W,
) -> Result<usize, CliError> {
    let encoder = SchemaEncoder::with_config(schema, &config.encoder)?;
    let mut sink = IoSink::new(output);
    let mut count = 0;
    for json in serde_json::Deserializer::from_reader(input).into_iter::<JsonValue>() {
        let json = json.map_err(|e| CliError::Json(e.to_string()))?;
        let value = value_from_json(&json, schema).map_err(|source| CliError::Datum {
            index: count,
            source,
        })?;
        encoder
            .encode(&value, &mut sink)
            .map_err(|source| CliError::Encode {
                index: count,
                source,
            })?;
        count += 1;
    }
    sink.flush().map_err(|e| io_error("<output>", e))?;
    Ok(count)
}

/// Decodes datums from `input` until it is exhausted, writing one JSON line
/// per datum.
pub fn read_datums<R: Read, W: Write>(
    schema: &Schema,
    config: &CodecConfig,
    input: R,
    mut output: W,
) -> Result<usize, CliError> {
    let decoder = SchemaDecoder::with_config(schema, &config.decoder)?;
    let mut source = IoSource::new(input);
    let mut count = 0;
    loop {
        let exhausted = source.is_exhausted().map_err(|e: BufferError| CliError::Decode {
            index: count,
            source: e.into(),
        })?;
        if exhausted {
            break;
        }
        let value = decoder
            .decode(&mut source)
            .map_err(|source| CliError::Decode {
                index: count,
                source,
            })?;
        let json = value_to_json(&value, schema).map_err(|source| CliError::Datum {
            index: count,
            source,
        })?;
        writeln!(output, "{json}").map_err(|e| io_error("<output>", e))?;
        count += 1;
    }
    output.flush().map_err(|e| io_error("<output>", e))?;
    Ok(count)
}

pub fn print_schema<W: Write>(schema: &Schema, mut output: W) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(&schema.to_json())
        .map_err(|e| CliError::Json(e.to_string()))?;
    writeln!(output, "{text}").map_err(|e| io_error("<output>", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{"type": "record", "name": "Pair", "fields": [
        {"name": "key", "type": "string"},
        {"name": "value", "type": ["null", "long", "double"]}
    ]}"#;

    #[test]
    fn write_then_read() {
        let schema = Schema::parse(SCHEMA).unwrap();
        let config = CodecConfig::default();
        let input = r#"{"key": "a", "value": 1} {"key": "b", "value": 2.5}
            {"key": "c"}"#;
        let mut encoded = Vec::new();
        let written = write_datums(&schema, &config, input.as_bytes(), &mut encoded).unwrap();
        assert_eq!(written, 3);
        assert_eq!(&encoded[..4], [0x02, b'a', 0x02, 0x02]);

        let mut lines = Vec::new();
        let read = read_datums(&schema, &config, &encoded[..], &mut lines).unwrap();
        assert_eq!(read, 3);
        assert_eq!(
            String::from_utf8(lines).unwrap(),
            "{\"key\":\"a\",\"value\":1}\n{\"key\":\"b\",\"value\":2.5}\n{\"key\":\"c\",\"value\":null}\n"
        );
    }

    #[test]
    fn reports_the_failing_datum() {
        let schema = Schema::parse(SCHEMA).unwrap();
        let config = CodecConfig::default();
        let err = write_datums(&schema, &config, r#"{"key": "a"} {"key": 1}"#.as_bytes(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, CliError::Datum { index: 1, .. }), "{err}");

        let err = read_datums(&schema, &config, &[0x02, b'a', 0x08][..], Vec::new()).unwrap_err();
        assert!(
            matches!(
                err,
                CliError::Decode {
                    index: 0,
                    source: DecodeError::InvalidUnionBranch { index: 4, .. }
                }
            ),
            "{err}"
        );
    }

    #[test]
    fn schema_is_printed_normalized() {
        let schema = Schema::parse(SCHEMA).unwrap();
        let mut out = Vec::new();
        print_schema(&schema, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert_eq!(Schema::parse(&printed).unwrap(), schema);
    }

    #[test]
    fn parses_subcommands() {
        let args = Args::try_parse_from([
            "avro-interop",
            "-v",
            "write",
            "--schema",
            "a.avsc",
            "--output",
            "out.bin",
        ])
        .unwrap();
        assert_eq!(args.verbose, 1);
        assert!(matches!(args.command, Command::Write { output: Some(_), input: None, .. }));
    }
}
