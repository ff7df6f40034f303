//! zenview - asset inspector
//!
//! Mounts every archive under a data directory and prints what the
//! conversion pipeline makes of models, meshes and worlds.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use zenview_core::{AssetStore, Assets, Config, Model, config};
use zenview_shared::ARCHIVE_FORMAT;

#[derive(Parser)]
#[command(name = "zenview")]
#[command(about = "Inspect converted ZenGin assets")]
#[command(version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory scanned recursively for archives
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List mounted record names
    List {
        /// Only names containing this substring (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Summarize a model (.MDS)
    Model {
        name: String,
    },

    /// Summarize a static mesh (.MRM)
    Mesh {
        name: String,
    },

    /// Partition a world (.ZEN) and print per-cell counts
    World {
        name: String,

        /// Cells per side (overrides config)
        #[arg(short, long)]
        grid: Option<u32>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    if let Commands::World { grid: Some(grid), .. } = &cli.command {
        config.world.grid_size = *grid;
        config.validate()?;
    }

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
        return Ok(());
    }

    let assets = Assets::new(mount(&cli.data_dir)?, config);

    match cli.command {
        Commands::List { filter } => {
            let filter = filter.map(|f| f.to_uppercase());
            for key in assets.keys() {
                if filter.as_ref().is_none_or(|f| key.contains(f.as_str())) {
                    println!("{}", key);
                }
            }
        }

        Commands::Model { name } => {
            let model = assets.get_model(&name)?;
            print_model(&model);
        }

        Commands::Mesh { name } => {
            let mesh = assets.get_multi_mesh(&name)?;
            println!("{}", name.to_uppercase());
            println!("  Parts:     {}", mesh.parts.len());
            println!("  Vertices:  {}", mesh.vertex_count());
            println!("  Triangles: {}", mesh.triangle_count());
            let bounds = mesh.bounds();
            println!("  Bounds:    {:?} .. {:?}", bounds.min, bounds.max);
            for (i, part) in mesh.parts.iter().enumerate() {
                let texture = part
                    .material
                    .as_ref()
                    .map(|m| m.texture_name.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or("(untextured)");
                println!("  [{}] {} tris, {}", i, part.triangle_count(), texture);
            }
        }

        Commands::World { name, .. } => {
            let world = assets.get_world(&name)?;
            println!("{}", name.to_uppercase());
            println!("  Bounds:   {:?} .. {:?}", world.bounds.min, world.bounds.max);
            println!("  Grid:     {0} x {0}", world.size);
            println!("  Polygons: {}", world.polygon_count());
            println!("  Batches:  {}", world.batch_count());
            for x in 0..world.size {
                let row: Vec<String> = (0..world.size)
                    .filter_map(|z| world.cell(x, z))
                    .map(|cell| format!("{:>5}/{:<2}", cell.polygon_count, cell.batches.len()))
                    .collect();
                println!("  {}", row.join(" "));
            }
        }

        Commands::Config => {}
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_strict(path),
        None => {
            let config = config::default_path()
                .map(|p| config::load(&p))
                .unwrap_or_default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn mount(data_dir: &Path) -> Result<AssetStore> {
    let mut store = AssetStore::new();
    let archives = store
        .mount_dir(data_dir, ARCHIVE_FORMAT.extension)
        .with_context(|| format!("Failed to mount archives under {}", data_dir.display()))?;
    if archives == 0 {
        tracing::warn!(
            "No .{} archives found under {}",
            ARCHIVE_FORMAT.extension,
            data_dir.display()
        );
    }
    tracing::info!("{} archives, {} records", archives, store.len());
    Ok(store)
}

fn print_model(model: &Model) {
    println!("{}", model.name);
    println!("  Bones:  {}", model.skeleton.len());
    for bone in &model.skeleton.bones {
        let depth = model.skeleton.depth(bone.index).unwrap_or(0);
        let mesh = bone.mesh.map(|m| format!(" [mesh {}]", m)).unwrap_or_default();
        println!("    {}{}{}", "  ".repeat(depth), bone.name, mesh);
    }
    println!("  Meshes: {} ({} parts)", model.meshes.len(), model.part_count());
    for (i, skin) in model.skins.iter().enumerate() {
        println!("  Skin {}: {} joints", i, skin.len());
    }

    let mut clips: Vec<_> = model.animations.values().collect();
    clips.sort_by(|a, b| a.name.cmp(&b.name));
    println!("  Clips:  {}", clips.len());
    for clip in clips {
        println!(
            "    {} ({:.2}s, {} channels)",
            clip.name,
            clip.duration,
            clip.channels.len()
        );
    }
}
