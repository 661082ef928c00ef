use anyhow::Context;
use clap::{Parser, Subcommand};
use hangar_assets::{LoadEvent, LoadedModel, import_file};
use hangar_input::MoveAction;
use hangar_kernel::{HangarConfig, Session};
use hangar_render::{DebugTextRenderer, RenderView, Renderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hangar-cli", about = "CLI tool for hangar assets and movement")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Import a glTF file and print its geometry summary
    Inspect {
        /// Path to a .gltf or .glb file
        path: PathBuf,
    },
    /// Hold keys for a number of frames and print the resulting scene
    Simulate {
        /// Keys held for the whole run, comma separated
        #[arg(short, long, value_delimiter = ',', default_value = "w")]
        keys: Vec<String>,
        /// Number of frames to run
        #[arg(short, long, default_value = "10")]
        frames: u64,
        /// glTF asset to place in the scene; an empty model when omitted
        #[arg(long)]
        asset: Option<PathBuf>,
        /// YAML tuning file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("hangar-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", hangar_kernel::crate_info());
            println!("input: {}", hangar_input::crate_info());
            println!("assets: {}", hangar_assets::crate_info());
            println!("render: {}", hangar_render::crate_info());
        }
        Commands::Inspect { path } => {
            let model = import_file(&path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            print!("{}", describe_model(&model));
        }
        Commands::Simulate {
            keys,
            frames,
            asset,
            config,
        } => {
            let config = match &config {
                Some(path) => HangarConfig::load(path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => HangarConfig::default(),
            };
            let model = match &asset {
                Some(path) => import_file(path)
                    .with_context(|| format!("failed to import {}", path.display()))?,
                None => LoadedModel::empty("model"),
            };
            let output = simulate(&config, model, &keys, frames);
            print!("{output}");
        }
    }

    Ok(())
}

fn describe_model(model: &LoadedModel) -> String {
    let mut out = format!(
        "Model: {} meshes={} vertices={} triangles={}\n",
        model.name,
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    for mesh in &model.meshes {
        out.push_str(&format!(
            "  {}: vertices={} triangles={}\n",
            mesh.name,
            mesh.positions.len(),
            mesh.triangle_count()
        ));
    }
    match model.bounds() {
        Some((min, max)) => out.push_str(&format!(
            "Bounds: min=({:.3}, {:.3}, {:.3}) max=({:.3}, {:.3}, {:.3})\n",
            min.x, min.y, min.z, max.x, max.y, max.z
        )),
        None => out.push_str("Bounds: <empty>\n"),
    }
    out
}

/// Place `model` as a finished load, hold `keys` and run `frames` updates.
fn simulate(config: &HangarConfig, model: LoadedModel, keys: &[String], frames: u64) -> String {
    let mut session = Session::new(config);
    session.apply_load_event(LoadEvent::Loaded(model));

    for key in keys {
        if MoveAction::from_key(key).is_none() {
            tracing::warn!(key = %key, "key has no movement binding");
        }
        session.key_down(key);
    }

    let mut applied = 0;
    for _ in 0..frames {
        applied += session.tick().unwrap_or(0);
    }
    tracing::debug!(frames, applied, "simulation finished");

    DebugTextRenderer::new().render(session.scene(), &RenderView::default())
}
