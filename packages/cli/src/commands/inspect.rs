use crate::commands::read_page;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use liveedit_common::{Capability, Category};
use liveedit_preview::{BindingRegistry, Dom};
use liveedit_store::{DocumentStore, FileStore};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Page markup JSON file
    pub page: PathBuf,

    /// Print the bindings as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingRow {
    element: String,
    capability: Capability,
    identifier: String,
    stored: bool,
}

pub async fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = read_page(&PathBuf::from(cwd).join(&args.page))?;
    let dom = Dom::from_page(&page);
    let registry = BindingRegistry::scan(&dom);
    let store = FileStore::new(config.store_root(cwd), config.namespace());

    let stored_text = store.list(Category::Text).await?;
    let stored_style = store.list(Category::Style).await?;

    let mut rows = Vec::new();
    for element in registry.elements() {
        let tag = dom
            .element(element.node)
            .map(|e| e.tag.clone())
            .unwrap_or_default();
        let label = match &element.element_id {
            Some(id) => format!("{}#{}", tag, id),
            None => tag,
        };
        for binding in element.bindings.iter() {
            let stored = match binding.capability.category() {
                Category::Text => &stored_text,
                Category::Style => &stored_style,
            };
            rows.push(BindingRow {
                element: label.clone(),
                capability: binding.capability,
                identifier: binding.identifier.clone(),
                stored: stored.contains(&binding.identifier),
            });
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{} {} ({} elements, {} bindings)",
        "🔍".bright_blue(),
        args.page.display(),
        registry.elements().len(),
        rows.len()
    );
    for row in &rows {
        let status = if row.stored {
            "stored".green()
        } else {
            "default".dimmed()
        };
        println!(
            "  {:<24} {:<18} {:<28} {}",
            row.element,
            row.capability.to_string().cyan(),
            row.identifier.bright_white(),
            status
        );
    }

    if !registry.diagnostics().is_empty() {
        println!();
        for diagnostic in registry.diagnostics() {
            println!("  {} {}", "⚠️".yellow(), diagnostic);
        }
    }

    Ok(())
}
