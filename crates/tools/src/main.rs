use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use foundation::math::Vec2;
use identify::{IdentifyEngine, PointEvent};
use layers::InMemoryLayerRegistry;
use runtime::QueryGate;
use scene::LocalScene;
use streaming::HttpTransport;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Map feature query tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Identify features at a point across WMS layers and local vector data
    Identify {
        /// JSON array of layer descriptors
        #[arg(long)]
        layers: PathBuf,

        /// JSON file with client-held vector layers
        #[arg(long)]
        scene: Option<PathBuf>,

        /// JSON identify configuration (IDENTIFY_* env vars override it)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Map x coordinate in CRS units
        #[arg(long, allow_hyphen_values = true)]
        x: f64,

        /// Map y coordinate in CRS units
        #[arg(long, allow_hyphen_values = true)]
        y: f64,

        /// Current zoom level
        #[arg(long)]
        zoom: f64,

        /// Map units per pixel
        #[arg(long)]
        resolution: f64,

        #[arg(long, default_value = "EPSG:3857")]
        crs: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Identify {
            layers,
            scene,
            config,
            x,
            y,
            zoom,
            resolution,
            crs,
        } => {
            let mut config = tools::load_config(config.as_deref())?;
            tools::apply_env_overrides(&mut config, |key| env::var(key).ok());

            let registry = InMemoryLayerRegistry::new(tools::load_layers(&layers)?);
            let scene = match &scene {
                Some(path) => tools::load_scene(path)?,
                None => LocalScene::new(),
            };
            info!(layers = registry.len(), "loaded layer registry");

            let engine =
                IdentifyEngine::new(Arc::new(HttpTransport::new()), QueryGate::new(), config);
            let event = PointEvent::new(Vec2::new(x, y), resolution, zoom, crs);

            let groups = engine
                .identify_collect(&registry, &scene, &event)
                .await?
                .unwrap_or_default();

            let out = serde_json::to_string_pretty(&groups).context("serialize result groups")?;
            println!("{out}");
        }
    }
    Ok(())
}
