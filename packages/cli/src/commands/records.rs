use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use liveedit_common::{Category, ImageRef, StyleKind, StyleValue};
use liveedit_store::{BlobStore, DocumentStore, FileBlobStore, FileStore, RecordStore};
use liveedit_style::{decode_style, encode_style, references_image};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Text,
    Style,
}

impl From<CategoryArg> for Category {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Text => Category::Text,
            CategoryArg::Style => Category::Style,
        }
    }
}

#[derive(Debug, Args)]
pub struct SetTextArgs {
    pub identifier: String,
    pub content: String,
}

#[derive(Debug, Args)]
pub struct SetStyleArgs {
    pub identifier: String,

    /// color, background-color, gradient or background-image
    #[arg(short, long)]
    pub kind: String,

    #[arg(short, long)]
    pub value: String,
}

#[derive(Debug, Args)]
pub struct SetImageArgs {
    pub identifier: String,

    /// Image file to upload
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    #[arg(value_enum)]
    pub category: CategoryArg,
    pub identifier: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub category: CategoryArg,
}

fn open_store(config: &Config, cwd: &str) -> FileStore {
    FileStore::new(config.store_root(cwd), config.namespace())
}

pub async fn set_text(args: SetTextArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    open_store(&config, cwd)
        .put_content(&args.identifier, &args.content)
        .await?;
    println!("  {} Saved text {}", "✓".green(), args.identifier.bright_white());
    Ok(())
}

pub async fn set_style(args: SetStyleArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let value = parse_style(&args.kind, &args.value)?;
    open_store(&config, cwd)
        .put_style(&args.identifier, value.kind(), &encode_style(&value))
        .await?;
    println!(
        "  {} Saved {} {} = {}",
        "✓".green(),
        value.kind(),
        args.identifier.bright_white(),
        encode_style(&value)
    );
    Ok(())
}

/// Upload an image and point a background at it, removing the image it
/// replaces when that one was uploaded here too
pub async fn set_image(args: SetImageArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);
    let blobs = FileBlobStore::new(config.asset_root(cwd), config.asset_base_url.clone());

    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Not a file: {}", args.file.display()))?;
    let bytes = tokio::fs::read(PathBuf::from(cwd).join(&args.file))
        .await
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    let previous = match store.get_style(&args.identifier).await? {
        Some(record) if record.kind == StyleKind::BackgroundImage => {
            decode_style(record.kind, &record.value)
                .ok()
                .and_then(|value| match value {
                    StyleValue::BackgroundImage(ImageRef::Url(url)) => Some(url),
                    _ => None,
                })
        }
        _ => None,
    };

    let url = blobs
        .upload(&config.namespace().editor_image_path(&args.identifier, &file_name), bytes)
        .await?;
    let value = StyleValue::BackgroundImage(ImageRef::Url(url.clone()));
    store
        .put_style(&args.identifier, value.kind(), &encode_style(&value))
        .await?;
    println!("  {} Uploaded {} → {}", "✓".green(), file_name, url);

    if let Some(previous) = previous.filter(|p| *p != url && blobs.owns(p)) {
        let others: Vec<String> = store
            .style_records()
            .await?
            .into_iter()
            .filter(|record| record.identifier != args.identifier && references_image(record, &previous))
            .map(|record| record.identifier)
            .collect();

        if !others.is_empty() {
            println!("  {} Kept {} (still used by {})", "•".dimmed(), previous, others.join(", "));
        } else {
            match blobs.delete(&previous).await {
                Ok(()) => println!("  {} Removed {}", "✓".green(), previous),
                Err(e) => tracing::warn!(url = %previous, error = %e, "Could not delete replaced image"),
            }
        }
    }
    Ok(())
}

pub async fn get(args: GetArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = open_store(&config, cwd);

    let json = match args.category {
        CategoryArg::Text => store
            .get_content(&args.identifier)
            .await?
            .map(|record| serde_json::to_string_pretty(&record))
            .transpose()?,
        CategoryArg::Style => store
            .get_style(&args.identifier)
            .await?
            .map(|record| serde_json::to_string_pretty(&record))
            .transpose()?,
    };

    match json {
        Some(json) => println!("{}", json),
        None => println!(
            "{} No {} record for {}",
            "⚠️".yellow(),
            Category::from(args.category),
            args.identifier.bright_white()
        ),
    }
    Ok(())
}

pub async fn list(args: ListArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    for identifier in open_store(&config, cwd).list(args.category.into()).await? {
        println!("{}", identifier);
    }
    Ok(())
}

/// Parse and normalize a style value given on the command line
fn parse_style(kind: &str, value: &str) -> Result<StyleValue> {
    let kind = StyleKind::parse(kind)?;
    decode_style(kind, value).with_context(|| format!("Invalid {} value: {}", kind, value))
}
