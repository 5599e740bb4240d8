//! Data model shared by the parser, builder and writers.
//!
//! Everything the parser emits is kept in very “raw” form so later stages
//! (builder, writers) can decide what they need.

use std::collections::HashMap;

/// ─────────────────────────────────────────────────────
/// Raw document types (1-to-1 with the TMX file)
/// ─────────────────────────────────────────────────────

/// One `<tileset>` declaration.
#[derive(Debug, Clone)]
pub struct TileSet {
    /// Global index of this set's first tile. A layer cell `g != 0`
    /// belongs to the declared set with the greatest `first_gid <= g`.
    pub first_gid: u32,
    pub name: String,
    /// Source image path exactly as written in the document.
    pub image: String,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Free-form string properties keyed by local tile id.
    pub tile_properties: HashMap<u32, HashMap<String, String>>,
}

impl TileSet {
    /// Look up one property of one tile, if the document set it.
    pub fn tile_property(&self, local_id: u32, name: &str) -> Option<&str> {
        self.tile_properties
            .get(&local_id)
            .and_then(|props| props.get(name))
            .map(String::as_str)
    }
}

/// One `<layer>` grid of cell values.
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major cell values, `0` = empty. Length is always
    /// `width * height` (parser enforced).
    pub tiles: Vec<u32>,
}

/// A single annotation object coming out of an `<objectgroup>`.
#[derive(Debug, Clone)]
pub struct TmxObject {
    pub name: String,
    /// The editor's `type` (older exports) / `class` attribute.
    pub kind: String,
    /// Position rectangle in pixels.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub properties: HashMap<String, String>,
}

/// Holds **all** objects that belong to one `<objectgroup>`.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    pub name: String,
    pub objects: Vec<TmxObject>,
}

/// Whole document as it comes out of the XML loader. No domain
/// validation has happened yet.
#[derive(Debug, Clone)]
pub struct RawTmx {
    /// Map-level tile cell size in pixels, used to convert object
    /// rectangles into tile coordinates.
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_sets: Vec<TileSet>,
    pub layers: Vec<TileLayer>,
    pub object_groups: Vec<ObjectGroup>,
}

/// ─────────────────────────────────────────────────────
/// Semantic types (builder output, handed to the writers)
/// ─────────────────────────────────────────────────────

/// A named rectangular region that transitions the player to another map
/// at runtime. Targets are string references resolved by the engine, so a
/// portal may name a map that is registered later (or never — the engine
/// reports that, not the compiler).
#[derive(Debug, Clone)]
pub struct Portal {
    pub name: String,
    /// Rectangle in tile coordinates, non-empty and fully inside the
    /// owning map's grid.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub target_map: String,
    pub target_portal: Option<String>,
}

use crate::builder::mask::Mask;

/// Fully validated map handed to the writers. Immutable once built.
#[derive(Debug, Clone)]
pub struct Map {
    /// Normalized identifier derived from the source file name; unique
    /// within one run (enforced by the database).
    pub name: String,
    /// The single tile set the background layer draws from.
    pub tile_set: TileSet,
    pub width: u32,
    pub height: u32,
    /// Background layer cells copied verbatim (global tile indices).
    pub tiles: Vec<u32>,
    /// Passable/blocked bit per cell, same dimensions as `tiles`.
    pub mask: Mask,
    /// Portals in document object order.
    pub portals: Vec<Portal>,
}

impl Map {
    /// Engine-facing cell value: `0` = empty, `k > 0` = tile `k - 1` of
    /// the background tile set.
    pub fn engine_tile(&self, gid: u32) -> u32 {
        if gid == 0 {
            0
        } else {
            gid - self.tile_set.first_gid + 1
        }
    }
}
