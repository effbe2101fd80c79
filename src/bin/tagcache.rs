//! tagcache CLI
//!
//! Inspect how values are encoded, decode raw entries, and run a demo
//! session against the in-memory store.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use num_bigint::BigInt;
use tagcache::{
    decode, encode, ClientConfig, Datum, EncodedEntry, MemoryStore, Tag, TypedClient, Value,
};
use tracing_subscriber::{fmt, EnvFilter};

/// tagcache CLI
#[derive(Parser, Debug)]
#[command(name = "tagcache")]
#[command(about = "Inspect the tagcache value codec")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a value and print its tag and payload
    Encode {
        /// How to interpret the input
        #[arg(short, long, value_enum, default_value = "text")]
        kind: InputKind,

        /// The value to encode
        input: String,
    },

    /// Decode a hex payload stored under the given tag
    Decode {
        /// Stored tag (flags)
        #[arg(short, long, default_value = "0")]
        tag: u32,

        /// Payload as hex
        payload: String,
    },

    /// Run a set/get/add/replace/delete/incr/get_multi session in memory
    Demo {
        /// Server address to register with the in-memory store
        #[arg(short, long, default_value = tagcache::config::DEFAULT_SERVER)]
        server: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputKind {
    Text,
    Int,
    Json,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tagcache=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    let outcome = match args.command {
        Commands::Encode { kind, input } => run_encode(kind, &input),
        Commands::Decode { tag, payload } => run_decode(tag, &payload),
        Commands::Demo { server } => run_demo(&server),
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_encode(kind: InputKind, input: &str) -> tagcache::Result<()> {
    let value = match kind {
        InputKind::Text => Value::from(input),
        InputKind::Int => {
            let n = input.trim().parse::<BigInt>().map_err(|e| {
                tagcache::TagCacheError::Config(format!("not an integer: {}", e))
            })?;
            Value::integer(n)
        }
        InputKind::Json => {
            let json: serde_json::Value = serde_json::from_str(input)
                .map_err(|e| tagcache::TagCacheError::Config(format!("invalid JSON: {}", e)))?;
            Value::Structured(Datum::from_json(json))
        }
    };

    let entry = encode(&value)?;
    println!("category: {:?}", value.category());
    println!("tag:      {}", entry.tag);
    println!("payload:  {}", hex::encode(&entry.payload));
    Ok(())
}

fn run_decode(tag: u32, payload: &str) -> tagcache::Result<()> {
    let bytes = hex::decode(payload.trim())
        .map_err(|e| tagcache::TagCacheError::Config(format!("invalid hex payload: {}", e)))?;

    match decode(&EncodedEntry::new(bytes, Tag::from_bits(tag)))? {
        Some(value) => println!("{}", render(&value)),
        None => println!("(no value)"),
    }
    Ok(())
}

fn run_demo(server: &str) -> tagcache::Result<()> {
    let config = ClientConfig::builder().server_addrs([server])?.build();
    let client = TypedClient::connect(config, Arc::new(MemoryStore::new()))?;

    let status = client.set("blo", "blu", None)?;
    tracing::info!("set blo = blu -> {:?}", status);

    let status = client.replace("blo", "replace", None)?;
    tracing::info!("replace blo -> {:?}", status);

    let status = client.add("blo", "will be NOT set", None)?;
    tracing::info!("add blo -> {:?} (key exists)", status);

    client.set("number", "5", None)?;
    tracing::info!("incr number 3 -> {:?}", client.incr("number", 3)?);
    tracing::info!("decr number 2 -> {:?}", client.decr("number", 2)?);

    client.set("answer", 42, None)?;
    client.set_serialized(
        "record",
        &serde_json::json!({ "bla": "bli", "blo": 12 }),
        None,
    )?;

    let found = client.get_multi(&["blo", "number", "answer", "record", "doesnotexist"])?;
    let mut keys: Vec<_> = found.keys().cloned().collect();
    keys.sort();
    for key in keys {
        tracing::info!("get_multi {} = {}", key, render(&found[&key]));
    }

    for stats in client.stats()? {
        tracing::info!(
            "stats {}: curr_items={} cmd_get={} get_hits={}",
            stats.server,
            stats.get("curr_items").unwrap_or("?"),
            stats.get("cmd_get").unwrap_or("?"),
            stats.get("get_hits").unwrap_or("?"),
        );
    }

    client.flush_all()?;
    Ok(())
}

/// Human-readable rendering of a decoded value
fn render(value: &Value) -> String {
    match value {
        Value::Text(bytes) => format!("text {:?}", bytes.escape_ascii().to_string()),
        Value::SmallInteger(n) => format!("int {}", n),
        Value::LargeInteger(n) => format!("bigint {}", n),
        Value::Structured(datum) => format!("structured {}", datum.to_json()),
    }
}
