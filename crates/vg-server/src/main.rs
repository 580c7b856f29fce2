//! Voice greeting command line
//!
//! Loads `voice.yaml`, generates greeting/decision pairs and prints them
//! as JSON lines. Host states can be preloaded so `api_key_state` lookups
//! and command writes work without a running automation host.

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vg_config::VoiceConfig;
use vg_core::events::StateChangedData;
use vg_core::StateId;
use vg_event_bus::EventBus;
use vg_state_store::{MemoryStateStore, StateStore, StateStoreExt, DEFAULT_COMMAND_DELAY};
use vg_voice::{GenerationSource, GreetingRequest, VoiceService};

#[derive(Parser, Debug)]
#[command(name = "voice-greeting", version, about = "Generate a spoken greeting and decision")]
struct Args {
    /// Directory containing voice.yaml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Room to greet in
    #[arg(long)]
    room: Option<String>,

    /// Station that is about to start
    #[arg(long)]
    station: Option<String>,

    /// Whether it is dark in the room
    #[arg(long)]
    dark: bool,

    /// Extra context for the model
    #[arg(long)]
    extra: Option<String>,

    /// Preload a host state, may repeat
    #[arg(long = "state", value_name = "ID=VALUE")]
    states: Vec<String>,

    /// Write each decision to this state as a command
    #[arg(long, value_name = "ID")]
    speak_state: Option<String>,

    /// Number of pairs to generate
    #[arg(long, default_value_t = 1)]
    count: usize,
}

/// Split `id=value`; values that parse as JSON keep their type
fn parse_state(arg: &str) -> Result<(StateId, Value)> {
    let Some((id, raw)) = arg.split_once('=') else {
        bail!("expected ID=VALUE, got '{}'", arg);
    };
    let id: StateId = id
        .trim()
        .parse()
        .with_context(|| format!("invalid state id '{}'", id))?;
    let val = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((id, val))
}

fn source_json(source: &GenerationSource) -> Value {
    match source {
        GenerationSource::Remote { model } => json!({ "source": "remote", "model": model }),
        GenerationSource::Local { reason } => {
            json!({ "source": "local", "reason": reason.to_string() })
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = VoiceConfig::load_or_default(&args.config_dir)
        .with_context(|| format!("loading config from {}", args.config_dir.display()))?;
    debug!(?config, "Configuration loaded");

    let bus = Arc::new(EventBus::new());
    let store = Arc::new(MemoryStateStore::new(bus.clone()));

    let mut changes = bus.subscribe_typed::<StateChangedData>();
    tokio::spawn(async move {
        while let Ok(event) = changes.recv().await {
            debug!(id = %event.data.id, val = %event.data.new_state.val, "State changed");
        }
    });

    for arg in &args.states {
        let (id, val) = parse_state(arg)?;
        store.set(&id, val, true).await?;
    }

    let service = VoiceService::from_config(&config).with_state_store(store.clone());

    let mut request = GreetingRequest::from_config(&config).dark(args.dark);
    if let Some(room) = args.room {
        request.room = Some(room);
    }
    if let Some(station) = args.station {
        request.station = Some(station);
    }
    if let Some(extra) = args.extra {
        request.extra_context = Some(extra);
    }

    info!(count = args.count, "Generating greetings");
    for _ in 0..args.count {
        let (output, source) = service.generate(&request).await;

        if let Some(state) = &args.speak_state {
            store
                .write_command(state, &output.decision, DEFAULT_COMMAND_DELAY)
                .await;
        }

        let mut line = json!({ "greeting": output.greeting, "decision": output.decision });
        if let (Some(obj), Value::Object(extra)) = (line.as_object_mut(), source_json(&source)) {
            obj.extend(extra);
        }
        println!("{}", line);
    }

    Ok(())
}
