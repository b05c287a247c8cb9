use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vista_assets::{Font, text_geometry};
use vista_demos::{Stage, TextDemo};
use vista_render::{DebugTextRenderer, Renderer};
use vista_render_wgpu::PerspectiveCamera;
use vista_tools::SceneInspector;

#[derive(Parser)]
#[command(name = "vista-cli", about = "Inspect vista demo scenes and typeface fonts")]
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
    /// Build a demo scene, load its assets and print it
    Describe {
        /// Demo to build: materials or text
        #[arg(short, long, default_value = "materials")]
        demo: String,
        /// Material kind for the materials demo
        #[arg(short, long, default_value = "standard")]
        material: String,
        /// Directory holding the textures/ and fonts/ trees
        #[arg(short, long, default_value = "./static")]
        assets: PathBuf,
        /// Seed for random placement
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Seconds of animation to apply before printing
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// List every node
        #[arg(long)]
        nodes: bool,
    },
    /// Summarise a typeface JSON font and the text mesh it produces
    Font {
        /// Path to a *.typeface.json file
        path: PathBuf,
        /// Text to extrude
        #[arg(short, long, default_value = "Hello There")]
        text: String,
        /// Glyph size in scene units
        #[arg(short, long, default_value = "0.5")]
        size: f32,
    },
}

const ASSET_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("vista-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", vista_assets::crate_info());
            println!("scene: {}", vista_scene::crate_info());
            println!("render: {}", vista_render::crate_info());
            println!("render-wgpu: {}", vista_render_wgpu::crate_info());
            println!("input: {}", vista_input::crate_info());
            println!("tools: {}", vista_tools::crate_info());
            println!("demos: {}", vista_demos::crate_info());
        }
        Commands::Describe {
            demo,
            material,
            assets,
            seed,
            time,
            nodes,
        } => {
            tracing::debug!(%demo, %material, seed, "building demo");
            let demo = vista_demos::create(&demo, &material, seed)?;
            let mut stage = Stage::new(demo, assets)?;
            let delivered = stage.wait_for_assets(ASSET_TIMEOUT)?;
            stage.advance(time)?;

            let renderer = if nodes {
                DebugTextRenderer::verbose()
            } else {
                DebugTextRenderer::new()
            };
            let view = PerspectiveCamera::default().render_view();
            print!("{}", renderer.render(stage.scene(), &view));
            println!("{}", SceneInspector::summary(stage.scene()));
            println!(
                "Assets: delivered={delivered} failed={} pending={}",
                stage.failed_assets(),
                stage.pending_assets()
            );
            for tweak in stage.panel().tweaks() {
                println!(
                    "Tweak {}: {} in [{}, {}] step {}",
                    tweak.key,
                    tweak.value(),
                    tweak.min,
                    tweak.max,
                    tweak.step
                );
            }
        }
        Commands::Font { path, text, size } => {
            let font = Font::from_file(&path)
                .with_context(|| format!("reading font {}", path.display()))?;
            let (ascender, descender) = font.metrics(size);
            println!(
                "Font: family={:?} glyphs={} resolution={}",
                font.family_name(),
                font.glyph_count(),
                font.resolution()
            );
            println!(
                "Metrics at size {size}: ascender={ascender:.4} descender={descender:.4} line_height={:.4}",
                font.line_height(size)
            );

            let missing = font.missing_glyphs(&text);
            if !missing.is_empty() {
                let list: String = missing.iter().collect();
                println!("Missing glyphs: {list:?} ({} of the text's characters fall back to '?')", missing.len());
            }

            let mut options = *TextDemo::new(0).options();
            options.size = size;
            let mut mesh = text_geometry(&font, &text, &options)?;
            mesh.center();
            match mesh.bounding_box() {
                Some(bounds) => println!(
                    "Text {text:?}: vertices={} triangles={} size=({:.3}, {:.3}, {:.3})",
                    mesh.vertex_count(),
                    mesh.triangle_count(),
                    bounds.size().x,
                    bounds.size().y,
                    bounds.size().z
                ),
                None => println!("Text {text:?}: no glyph outlines"),
            }
        }
    }

    Ok(())
}
