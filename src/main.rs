//! Query CLI for model files.
//!
//! Loads a JSON model (classes, slots, connection endpoints), builds a
//! resolver over it, and answers one-off structural queries:
//!
//! - `containment`: which slot on a container class holds a contained class
//! - `endpoints`: the source/target endpoint slots of a connection class
//! - `can-connect`: whether a connection class may join instances of two
//!   classes (instances are synthesized from the named classes)
//!
//! `--json` switches output to a machine-readable form.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use modelgraph_meta::{schema, ClassId, InMemoryMetamodel, Instance, Metamodel, SlotId};
use modelgraph_resolver::MetamodelResolver;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the model JSON file.
    #[arg(long, value_name = "PATH", global = true)]
    model: Option<PathBuf>,

    /// Emit JSON instead of plain text.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve the containment slot of a container class for a contained class.
    Containment {
        /// Container class name.
        #[arg(long)]
        container: String,
        /// Contained class name.
        #[arg(long)]
        contained: String,
    },
    /// Resolve the source/target endpoint slots of a connection class.
    Endpoints {
        /// Connection class name.
        #[arg(long)]
        class: String,
    },
    /// Check whether a connection class may join instances of two classes.
    CanConnect {
        /// Source instance class name.
        #[arg(long)]
        source: String,
        /// Target instance class name.
        #[arg(long)]
        target: String,
        /// Connection class name.
        #[arg(long)]
        conn: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let model_path = args
        .model
        .as_deref()
        .context("--model <PATH> is required")?;
    let (meta, resolver) = load_model(model_path)?;

    match &args.command {
        Command::Containment {
            container,
            contained,
        } => {
            let container_id = class_id(&meta, container)?;
            let contained_id = class_id(&meta, contained)?;
            let slot = resolver.resolve_containment(container_id, contained_id);
            if args.json {
                println!(
                    "{}",
                    json!({
                        "container": container,
                        "contained": contained,
                        "slot": slot.map(|s| meta.slot_name(s)),
                    })
                );
            } else {
                match slot {
                    Some(slot) => println!(
                        "containment {} -> {}: {}",
                        container,
                        contained,
                        meta.slot_name(slot)
                    ),
                    None => println!("containment {} -> {}: not found", container, contained),
                }
            }
        }
        Command::Endpoints { class } => {
            let class_id = class_id(&meta, class)?;
            let source = resolver.resolve_source_slot(class_id);
            let target = resolver.resolve_target_slot(class_id);
            if args.json {
                println!(
                    "{}",
                    json!({
                        "class": class,
                        "source": source.map(|s| meta.slot_name(s)),
                        "target": target.map(|s| meta.slot_name(s)),
                    })
                );
            } else {
                println!("source: {}", slot_or_dash(&meta, source));
                println!("target: {}", slot_or_dash(&meta, target));
            }
        }
        Command::CanConnect {
            source,
            target,
            conn,
        } => {
            let source_obj = Instance::of(class_id(&meta, source)?);
            let target_obj = Instance::of(class_id(&meta, target)?);
            let conn_id = class_id(&meta, conn)?;
            let verdict = resolver.can_connect(&source_obj, &target_obj, conn_id);
            if args.json {
                println!(
                    "{}",
                    json!({
                        "source": source,
                        "target": target,
                        "connection": conn,
                        "can_connect": verdict,
                    })
                );
            } else {
                println!("can-connect: {}", verdict);
            }
        }
    }

    Ok(())
}

fn load_model(path: &Path) -> Result<(Arc<InMemoryMetamodel>, MetamodelResolver)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;
    let loaded = schema::load_str(&text)
        .with_context(|| format!("failed to load model {}", path.display()))?;
    let meta = Arc::new(loaded.metamodel);
    let mut builder = MetamodelResolver::builder(meta.clone() as Arc<dyn Metamodel>);
    for registration in &loaded.endpoints {
        builder = builder.connection_endpoints(
            registration.class,
            registration.source,
            registration.target,
        );
    }
    Ok((meta, builder.build()))
}

fn class_id(meta: &InMemoryMetamodel, name: &str) -> Result<ClassId> {
    meta.class_by_name(name)
        .with_context(|| format!("unknown class: {}", name))
}

fn slot_or_dash(meta: &InMemoryMetamodel, slot: Option<SlotId>) -> String {
    match slot {
        Some(slot) => meta.slot_name(slot).to_string(),
        None => "-".to_string(),
    }
}
