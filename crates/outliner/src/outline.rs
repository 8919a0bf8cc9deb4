use std::path::{Path, PathBuf};

use log::info;
use outline_core::{DocumentOutline, OutlineBuilder};

use crate::prelude::{println, *};

#[derive(Debug, clap::Args, Clone)]
pub struct OutlineOptions {
    /// Path to the PDF file
    path: PathBuf,

    /// Write the JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Pretty-printed artifact: two-space indent, non-ASCII kept as is.
pub fn to_json(outline: &DocumentOutline) -> Result<String> {
    serde_json::to_string_pretty(outline).map_err(|e| eyre!("Failed to serialize outline: {}", e))
}

/// Decode one PDF and build its outline. Blocking.
pub fn outline_document(path: &Path, builder: &OutlineBuilder) -> Result<DocumentOutline> {
    let pages =
        pdf_layout::load_file(path).wrap_err_with(|| f!("failed to load {}", path.display()))?;
    Ok(builder.build(&pages))
}

pub async fn run(options: OutlineOptions, global: crate::Global) -> Result<()> {
    let builder = crate::config::outline_builder(&global)?;

    let outline = tokio::task::spawn_blocking({
        let path = options.path.clone();
        move || outline_document(&path, &builder)
    })
    .await??;

    let json = to_json(&outline)?;
    match options.output {
        Some(out) => {
            std::fs::write(&out, json).wrap_err_with(|| f!("failed to write {}", out.display()))?;
            info!("Saved {}", out.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
