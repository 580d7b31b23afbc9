//! Command-line front end: every facade operation as a subcommand, results
//! printed as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use sp_app::MediaActivityFacade;
use sp_core::binding::{BindingSettingsPatch, NewActivityBinding};
use sp_core::ids::{BindingId, SpaceId};
use sp_core::ActivityKey;

use crate::bootstrap::MediaRuntime;

#[derive(Parser, Debug)]
#[command(name = "smart-panel-media")]
#[command(author, version, about = "Smart panel media activity engine", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SpaceArg {
    /// Space (room) id
    pub space: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List media capabilities per device
    Capabilities(SpaceArg),
    /// List derived media endpoints
    Endpoints(SpaceArg),
    /// Manage activity bindings
    Bindings {
        #[command(subcommand)]
        action: BindingAction,
    },
    /// Create bindings for activities that have none
    ApplyDefaults(SpaceArg),
    /// Check every activity's binding against the current endpoints
    Validate(SpaceArg),
    /// Show the plan an activation would run, without dispatching it
    Preview {
        #[command(flatten)]
        space: SpaceArg,
        /// watch, listen, gaming, background or off
        key: String,
    },
    /// Activate an activity
    Activate {
        #[command(flatten)]
        space: SpaceArg,
        /// watch, listen, gaming, background or off
        key: String,
        /// Also print the lifecycle events emitted during activation
        #[arg(short, long)]
        events: bool,
    },
    /// Deactivate the current activity
    Deactivate(SpaceArg),
    /// Show the active activity record
    Active(SpaceArg),
}

#[derive(Subcommand, Debug)]
pub enum BindingAction {
    /// List bindings
    List(SpaceArg),
    /// Show one binding
    Get {
        #[command(flatten)]
        space: SpaceArg,
        id: String,
    },
    /// Create a binding from JSON (`{"activity_key": "watch", ...}`)
    Create {
        #[command(flatten)]
        space: SpaceArg,
        json: String,
    },
    /// Patch a binding from JSON; `null` clears a slot
    Update {
        #[command(flatten)]
        space: SpaceArg,
        id: String,
        json: String,
    },
    /// Delete a binding
    Delete {
        #[command(flatten)]
        space: SpaceArg,
        id: String,
    },
}

fn to_value<T: Serialize>(value: &T) -> anyhow::Result<Value> {
    serde_json::to_value(value).context("Failed to serialize output")
}

fn parse_key(key: &str) -> anyhow::Result<ActivityKey> {
    key.parse::<ActivityKey>()
        .with_context(|| format!("Invalid activity key: {key}"))
}

fn space_id(arg: &SpaceArg) -> SpaceId {
    SpaceId::from(arg.space.as_str())
}

/// Run one command against a wired runtime.
///
/// Returns the JSON documents to print, in order. `activate --events` yields
/// each emitted event before the activation result.
pub async fn execute(command: Commands, runtime: &MediaRuntime) -> anyhow::Result<Vec<Value>> {
    let service = &runtime.service;

    let output = match command {
        Commands::Capabilities(arg) => to_value(&service.get_capabilities(&space_id(&arg)).await?)?,
        Commands::Endpoints(arg) => to_value(&service.derive_endpoints(&space_id(&arg)).await?)?,
        Commands::Bindings { action } => return execute_binding(action, runtime).await,
        Commands::ApplyDefaults(arg) => to_value(&service.apply_defaults(&space_id(&arg)).await?)?,
        Commands::Validate(arg) => to_value(&service.validate_bindings(&space_id(&arg)).await?)?,
        Commands::Preview { space, key } => {
            to_value(&service.preview(&space_id(&space), parse_key(&key)?).await?)?
        }
        Commands::Activate { space, key, events } => {
            let key = parse_key(&key)?;
            let mut receiver = runtime.events.subscribe();
            let result = service.activate(&space_id(&space), key).await?;

            let mut documents = Vec::new();
            if events {
                while let Ok(event) = receiver.try_recv() {
                    documents.push(to_value(&event)?);
                }
            }
            documents.push(to_value(&result)?);
            return Ok(documents);
        }
        Commands::Deactivate(arg) => to_value(&service.deactivate(&space_id(&arg)).await?)?,
        Commands::Active(arg) => to_value(&service.get_active(&space_id(&arg)).await?)?,
    };

    Ok(vec![output])
}

async fn execute_binding(action: BindingAction, runtime: &MediaRuntime) -> anyhow::Result<Vec<Value>> {
    let service = &runtime.service;

    let output = match action {
        BindingAction::List(arg) => to_value(&service.list_bindings(&space_id(&arg)).await?)?,
        BindingAction::Get { space, id } => {
            let binding_id = BindingId::from(id.as_str());
            to_value(&service.get_binding(&space_id(&space), &binding_id).await?)?
        }
        BindingAction::Create { space, json } => {
            let request: NewActivityBinding =
                serde_json::from_str(&json).context("Invalid binding JSON")?;
            to_value(&service.create_binding(&space_id(&space), request).await?)?
        }
        BindingAction::Update { space, id, json } => {
            let patch: BindingSettingsPatch =
                serde_json::from_str(&json).context("Invalid binding patch JSON")?;
            let binding_id = BindingId::from(id.as_str());
            to_value(&service.update_binding(&space_id(&space), &binding_id, patch).await?)?
        }
        BindingAction::Delete { space, id } => {
            let binding_id = BindingId::from(id.as_str());
            service.delete_binding(&space_id(&space), &binding_id).await?;
            serde_json::json!({ "deleted": id })
        }
    };

    Ok(vec![output])
}
