use crate::commands::read_page;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use liveedit_preview::PreviewContext;
use liveedit_protocol::channel;
use liveedit_store::FileStore;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page markup JSON file
    pub page: PathBuf,

    /// Output format (html, json)
    #[arg(short, long, default_value = "html")]
    pub format: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// Load every stored record into the page, exactly as the live preview does
pub async fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = read_page(&PathBuf::from(cwd).join(&args.page))?;
    let store = Arc::new(FileStore::new(config.store_root(cwd), config.namespace()));

    let (_editor, preview) = channel(&config.editor_origin, &config.preview_origin);
    let mut preview = PreviewContext::new(&page, store, preview.with_policy(config.origin_policy()))?;
    let report = preview.load().await;

    for issue in &report.issues {
        eprintln!("  {} {}", "⚠️".yellow(), serde_json::to_string(issue)?);
    }

    let output = match args.format.as_str() {
        "html" => preview.to_html(),
        "json" => preview.page().to_json()?,
        other => return Err(anyhow!("Unknown format: {}. Use: html or json", other)),
    };

    match args.out {
        Some(path) => {
            let path = PathBuf::from(cwd).join(path);
            fs::write(&path, output)?;
            eprintln!(
                "  {} Rendered {} → {} ({} stored, {} default)",
                "✓".green(),
                args.page.display(),
                path.display(),
                report.stored,
                report.defaults
            );
        }
        None => println!("{}", output),
    }

    Ok(())
}
