//! CLI command implementations
//!
//! `decode` answers with exactly one JSON object on stdout, success or
//! failure. Only configuration problems (bad config file, a registry that
//! cannot be built) end the process with an error.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::codec::{
    json_type_name, CodecError, CodecResult, ModelSchema, Tagged, UnionCodec, VariantRegistry,
};
use crate::config::{CodecConfig, Config};
use crate::loadable::{from_async_operation, settle, Loadable};
use crate::models::api::{fetch_note_from_offline_service, fetch_updated_note};
use crate::models::{Author, Message, Note, User, UserEmail, VerifiedEmail};
use crate::observability::{init_logging, log_event_with_fields, Event};

use super::args::{Command, Target};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_debug, write_error, write_response, write_section};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Decode { target, config } => decode(target, config.as_deref()),
        Command::Demo { config, latency_ms } => {
            demo(config.as_deref(), Duration::from_millis(latency_ms))
        }
    }
}

/// Load the config file (or defaults) and install logging
fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    init_logging(&config.log_filter);
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("source", &source), ("tag_field", &config.codec.tag_field)],
    );

    Ok(config)
}

/// Decode one object from stdin and write it back re-encoded
pub fn decode(target: Target, config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let request = read_request(io::stdin().lock())?;
    let mut out = io::stdout().lock();

    match decode_value(target, &config.codec, &request) {
        Ok(data) => write_response(&mut out, data),
        Err(err) if err.is_configuration() => Err(err.into()),
        Err(err) => write_error(&mut out, err.code(), &err.to_string()),
    }
}

/// Decode a wire value with the selected registry and re-encode it
pub fn decode_value(target: Target, config: &CodecConfig, wire: &Value) -> CodecResult<Value> {
    match target {
        Target::Email => round_trip(&UserEmail::registry(config.clone())?, wire),
        Target::NoteState => round_trip(
            &Loadable::registry_with_config(Note::schema(), config.clone())?,
            wire,
        ),
        Target::User => {
            let schema = User::schema(config)?;
            let user = decode_object(&schema, wire)?;
            Ok(Value::Object(schema.to_object(&user)?))
        }
    }
}

fn round_trip<U: Tagged>(registry: &VariantRegistry<U>, wire: &Value) -> CodecResult<Value> {
    let codec = UnionCodec::new(registry);
    let value = codec.deserialize(wire)?;
    codec.serialize(&value)
}

fn decode_object<V>(schema: &ModelSchema<V>, wire: &Value) -> CodecResult<V> {
    let object = wire
        .as_object()
        .ok_or_else(|| CodecError::NotAnObject(json_type_name(wire)))?;
    schema.from_object(object)
}

/// Run the sample scenario
///
/// 1. Round-trip a verified user with an available note
/// 2. Decode a user sent as JSON without any note state
/// 3. Load a note through the adapter, then fail one
/// 4. Encode a message with a nested comment
pub fn demo(config_path: Option<&Path>, latency: Duration) -> CliResult<()> {
    let config = load_config(config_path)?;
    run_demo(&config, latency, &mut io::stdout().lock())
}

fn run_demo(config: &Config, latency: Duration, out: &mut impl Write) -> CliResult<()> {
    let schema = User::schema(&config.codec)?;

    let mut sample = User::new(
        "David Sample",
        UserEmail::Verified(VerifiedEmail::new("verified@example.com", Utc::now())),
    );
    sample.note = Loadable::Available(Note::new("id1234", "This is a cool product"));

    let deserialized = schema.from_object(&schema.to_object(&sample)?)?;
    write_debug(out, "Deserialized", &deserialized)?;
    write_section(
        out,
        "Serialized",
        &Value::Object(schema.to_object(&deserialized)?),
    )?;

    let from_json = decode_object(&schema, &sample_wire_user(&config.codec.tag_field))?;
    write_debug(out, "DeserializedFromJson", &from_json)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let (loading, loaded, failed) = runtime.block_on(async {
        let mut handle = from_async_operation(fetch_updated_note(latency));
        let loading = handle.current();
        let loaded = handle.settled().await;
        let failed = settle(fetch_note_from_offline_service(latency)).await;
        (loading, loaded, failed)
    });

    let registry = Loadable::registry_with_config(Note::schema(), config.codec.clone())?;
    let codec = UnionCodec::new(&registry);
    write_section(out, "NoteWhileLoading", &codec.serialize(&loading)?)?;
    write_section(out, "NoteLoaded", &codec.serialize(&loaded)?)?;
    write_section(out, "NoteFailed", &codec.serialize(&failed)?)?;

    let mut reply = Message::new("Thanks!");
    reply.author = Loadable::Available(Author::new("Jason Sample"));
    let thread = Message::new("Welcome to the product").with_comment(reply);
    let message_schema = Message::schema(&config.codec)?;
    write_section(
        out,
        "MessageWithComments",
        &Value::Object(message_schema.to_object(&thread)?),
    )?;

    Ok(())
}

/// A user as it arrives over the network: no note state at all
fn sample_wire_user(tag_field: &str) -> Value {
    let mut email = Map::new();
    email.insert(tag_field.to_string(), json!("unverified"));
    email.insert("address".to_string(), json!("unverified@example.com"));

    json!({
        "name": "Jason Sample",
        "email": Value::Object(email),
    })
}
