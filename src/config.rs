//! Build-rule configuration.
//!
//! The background-layer tag and the collision-marker conventions are
//! project conventions, not facts of the document format, so they live in
//! explicit configuration instead of hidden constants. A `maptool.json`
//! at the project root overrides any of the defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Config file looked up in the project root.
pub const FILE_NAME: &str = "maptool.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Name of the layer holding the visible/collidable ground truth.
    pub background_layer: String,
    /// Local tile index in the background set whose cells block movement.
    pub solid_tile: u32,
    /// Per-tile boolean property overriding `solid_tile` in either
    /// direction: `"true"` blocks, anything else is passable.
    pub solid_property: String,
    /// Object type tag that marks portal objects.
    pub portal_kind: String,
    /// Object property carrying the destination map name.
    pub portal_target_property: String,
    /// Object property carrying the destination portal name (optional
    /// on the object).
    pub portal_entry_property: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            background_layer: "background".into(),
            solid_tile: 1,
            solid_property: "solid".into(),
            portal_kind: "portal".into(),
            portal_target_property: "map".into(),
            portal_entry_property: "portal".into(),
        }
    }
}

impl BuildConfig {
    /// Load `maptool.json` from `root`, falling back to the defaults when
    /// the file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(FILE_NAME);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Parsing {}", path.display()))
    }
}
