pub mod init;
pub mod inspect;
pub mod records;
pub mod render;

pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
pub use records::{get, list, set_image, set_style, set_text, GetArgs, ListArgs, SetImageArgs, SetStyleArgs, SetTextArgs};
pub use render::{render, RenderArgs};

use anyhow::{Context, Result};
use liveedit_preview::PageNode;
use std::path::Path;

/// Read a page markup JSON file
pub(crate) fn read_page(path: &Path) -> Result<PageNode> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read page {}", path.display()))?;
    PageNode::from_json(&source).with_context(|| format!("Invalid page markup in {}", path.display()))
}
