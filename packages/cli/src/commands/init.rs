use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use liveedit_preview::PageNode;
use std::fs;
use std::path::PathBuf;

pub const EXAMPLE_PAGE_NAME: &str = "example.page.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project id used to namespace stored records
    #[arg(short, long, default_value = "default-project")]
    pub project_id: String,

    /// Store directory
    #[arg(short, long, default_value = ".liveedit")]
    pub store_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing live editing...".bright_blue().bold());

    let config = Config {
        project_id: args.project_id,
        store_dir: args.store_dir,
        ..Config::default()
    };

    let store_root = config.store_root(cwd);
    if !store_root.exists() {
        fs::create_dir_all(&store_root)?;
        println!("  {} Created {}/", "✓".green(), config.store_dir);
    }

    let example_file = PathBuf::from(cwd).join(EXAMPLE_PAGE_NAME);
    if !example_file.exists() {
        fs::write(&example_file, example_page().to_json()?)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_PAGE_NAME);
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Live editing initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: liveedit inspect {}", EXAMPLE_PAGE_NAME);
    println!("  2. Run: liveedit set-text hero-title \"Welcome Home\"");
    println!("  3. Run: liveedit render {}", EXAMPLE_PAGE_NAME);

    Ok(())
}

/// A hero section with every capability bound
pub fn example_page() -> PageNode {
    PageNode::element("body").with_children(vec![
        PageNode::element("section")
            .with_attr("id", "hero")
            .with_attr("data-editable-background-id", "hero-bg")
            .with_style("background-image", "linear-gradient(135deg, #ea580c, #dc2626)")
            .with_children(vec![
                PageNode::element("h1")
                    .with_attr("data-editable-text-id", "hero-title")
                    .with_attr("data-editable-color-id", "hero-title-color")
                    .with_style("color", "#ffffff")
                    .with_child(PageNode::text("Welcome")),
                PageNode::element("a")
                    .with_attr("href", "#contact")
                    .with_attr("data-editable-text-id", "hero-cta")
                    .with_attr("data-editable-background-color-id", "hero-cta-bg")
                    .with_style("background-color", "#111827")
                    .with_child(PageNode::text("Get in touch")),
            ]),
        PageNode::element("form").with_attr("id", "contact").with_child(
            PageNode::element("input")
                .with_attr("type", "email")
                .with_attr("data-editable-placeholder-id", "contact-email-hint")
                .with_attr("placeholder", "Your email"),
        ),
    ])
}
