//! Koala CLI
//!
//! Paints a laid-out render tree described as JSON.
//!
//! Usage:
//!   koala render <tree.json> -o out.png    Paint the tree into a PNG
//!   koala inspect <tree.json>              Print the render tree outline

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use koala_common::{ColorValue, Rect};
use koala_paint::{
    ApproximateShaper, ChildFailurePolicy, EngineConfig, FontdueShaper, PaintContext,
    PaintEngine, SkiaCanvas, TextShaper,
};
use koala_tree::{NodeDocument, NodeId, RenderTree};
use owo_colors::OwoColorize;

/// Koala paint stage driver
#[derive(Parser, Debug)]
#[command(name = "koala")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Render a tree at 800x600
    koala render page.json -o page.png

    # Render for a 2x display with debug outlines
    koala render page.json -o page@2x.png --scale 2 --debug

    # Print the tree
    koala inspect page.json
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Paint a render tree into a PNG file
    Render(RenderArgs),
    /// Print the render tree as an indented outline
    Inspect {
        /// Path to the JSON render tree
        #[arg(value_name = "TREE")]
        input: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Path to the JSON render tree
    #[arg(value_name = "TREE")]
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Viewport width in CSS pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Device pixels per CSS pixel
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// Draw box outlines and tag labels
    #[arg(long)]
    debug: bool,

    /// Surface color behind the tree (hex or named color)
    #[arg(long, value_name = "COLOR")]
    background: Option<String>,

    /// Fail if any node fails to paint
    #[arg(long)]
    strict: bool,

    /// Use fixed-ratio box glyphs instead of a system font
    #[arg(long)]
    approximate_text: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => render(&args),
        Command::Inspect { input } => {
            let tree = load_tree(&input)?;
            if let Some(root) = tree.root() {
                print_tree(&tree, root, 0);
            }
            Ok(())
        }
    }
}

/// Read and build the render tree stored at `path`.
fn load_tree(path: &Path) -> Result<RenderTree> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let doc: NodeDocument = serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not a valid render tree", path.display()))?;
    koala_common::warning::clear_warnings();
    let tree = RenderTree::from_document(&doc).context("failed to build render tree")?;
    log::info!("loaded {} nodes from '{}'", tree.len(), path.display());
    Ok(tree)
}

fn text_shaper(approximate: bool) -> Arc<dyn TextShaper> {
    if approximate {
        return Arc::new(ApproximateShaper);
    }
    match FontdueShaper::from_system() {
        Ok(shaper) => Arc::new(shaper),
        Err(e) => {
            eprintln!(
                "{} {e}; falling back to approximate text",
                "warning:".yellow().bold()
            );
            Arc::new(ApproximateShaper)
        }
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn render(args: &RenderArgs) -> Result<()> {
    if !(args.scale.is_finite() && args.scale > 0.0) {
        bail!("--scale must be a positive number, got {}", args.scale);
    }
    let mut tree = load_tree(&args.input)?;

    let device_width = (args.width as f32 * args.scale).ceil() as u32;
    let device_height = (args.height as f32 * args.scale).ceil() as u32;
    let mut canvas = SkiaCanvas::new(device_width, device_height)
        .with_context(|| format!("cannot allocate a {device_width}x{device_height} surface"))?;
    if let Some(color) = &args.background {
        let color = ColorValue::parse(color)
            .with_context(|| format!("unrecognized background color '{color}'"))?;
        canvas = canvas.with_background(color);
    }

    let policy = if args.strict {
        ChildFailurePolicy::Propagate
    } else {
        ChildFailurePolicy::Ignore
    };
    let engine = PaintEngine::new(text_shaper(args.approximate_text))
        .with_config(EngineConfig::default().with_child_failures(policy));

    let viewport = Rect::new(0.0, 0.0, args.width as f32, args.height as f32);
    let painted = {
        let mut ctx = PaintContext::new(&mut canvas, viewport)
            .try_with_scale_factor(args.scale)?
            .with_debug_overlay(args.debug);
        engine.paint_tree(&mut tree, &mut ctx)
    };

    canvas.save_png(&args.output)?;
    if painted {
        println!(
            "{} {} ({device_width}x{device_height})",
            "Rendered".green().bold(),
            args.output.display()
        );
        Ok(())
    } else if args.strict {
        bail!("some nodes failed to paint; output written to {}", args.output.display())
    } else {
        println!(
            "{} {} (some nodes failed to paint, see RUST_LOG=warn)",
            "Rendered with errors".yellow().bold(),
            args.output.display()
        );
        Ok(())
    }
}

fn print_tree(tree: &RenderTree, id: NodeId, depth: usize) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);
    let label = if node.is_text_node() {
        let text = node.text_content.as_deref().unwrap_or_default().trim();
        let preview: String = text.chars().take(40).collect();
        if preview.len() < text.len() {
            format!("\"{preview}...\"")
        } else {
            format!("\"{preview}\"")
        }
    } else {
        node.tag_name()
            .map_or_else(|| "(anonymous)".to_string(), |tag| format!("<{tag}>"))
    };
    let f = node.frame;
    print!(
        "{indent}{} {}",
        label.cyan(),
        format!("[{} {} {}x{}]", f.x, f.y, f.width, f.height).dimmed()
    );
    if node.opacity < 1.0 {
        print!(" opacity:{}", node.opacity);
    }
    if let Some(layer) = node.layer {
        print!(" layer:{}", layer.0);
    }
    println!();

    for &child in tree.children(id) {
        print_tree(tree, child, depth + 1);
    }
}
