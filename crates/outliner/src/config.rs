use std::path::Path;
use std::sync::Arc;

use log::debug;
use outline_core::{LexiconAnnotator, OutlineBuilder, OutlineConfig};

use crate::prelude::*;

/// Thresholds from a TOML file, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<OutlineConfig> {
    let Some(path) = path else {
        return Ok(OutlineConfig::default());
    };

    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| f!("failed to read config file {}", path.display()))?;
    let config = OutlineConfig::from_toml_str(&raw)
        .wrap_err_with(|| f!("invalid config file {}", path.display()))?;
    debug!("Loaded thresholds from {}: {config:?}", path.display());
    Ok(config)
}

/// The builder shared by every document in a run.
pub fn outline_builder(global: &crate::Global) -> Result<OutlineBuilder> {
    let config = load_config(global.config.as_deref())?;
    Ok(OutlineBuilder::new(Arc::new(LexiconAnnotator::new()), config))
}
