mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    get, init, inspect, list, render, set_image, set_style, set_text, GetArgs, InitArgs,
    InspectArgs, ListArgs, RenderArgs, SetImageArgs, SetStyleArgs, SetTextArgs,
};
use tracing_subscriber::EnvFilter;

/// Live editing CLI - inspect pages and manage identifier-keyed content
#[derive(Parser, Debug)]
#[command(name = "liveedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a liveedit.config.json and an example page
    Init(InitArgs),

    /// List the editable bindings of a page
    Inspect(InspectArgs),

    /// Render a page with stored content applied
    Render(RenderArgs),

    /// Save a text record
    SetText(SetTextArgs),

    /// Save a style record
    SetStyle(SetStyleArgs),

    /// Upload an image and use it as a background
    SetImage(SetImageArgs),

    /// Print a stored record
    Get(GetArgs),

    /// List stored identifiers
    List(ListArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("liveedit=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(dir) => {
            let cwd = dir.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Inspect(args) => inspect(args, &cwd).await,
                Command::Render(args) => render(args, &cwd).await,
                Command::SetText(args) => set_text(args, &cwd).await,
                Command::SetStyle(args) => set_style(args, &cwd).await,
                Command::SetImage(args) => set_image(args, &cwd).await,
                Command::Get(args) => get(args, &cwd).await,
                Command::List(args) => list(args, &cwd).await,
            }
        }
        Err(e) => Err(anyhow::anyhow!("Cannot get current directory: {}", e)),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
