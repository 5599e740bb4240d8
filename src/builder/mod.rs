//! Component 2 – the semantic core.
//!
//! Turns one raw document into a validated [`Map`]: resolved background
//! tile set, verbatim tile grid, collision mask and portals. Every domain
//! rule is checked here; a document that gets past `build` is safe to
//! hand to the writers.

pub mod mask;

use crate::config::BuildConfig;
use crate::error::{CompileError, CompileResult};
use crate::model::{Map, Portal, RawTmx, TileLayer, TileSet, TmxObject};

/// Build the semantic map for one parsed document.
///
/// `name` is the already-normalized identifier derived from the source
/// file (see [`normalize_name`]). Fails fast on the first inconsistency;
/// a failed build leaves nothing behind.
pub fn build(raw: &RawTmx, name: &str, cfg: &BuildConfig) -> CompileResult<Map> {
    if raw.tile_sets.is_empty() {
        return Err(CompileError::NoTileSet);
    }
    let layer = background_layer(raw, cfg)?;
    let tile_set = resolve_tile_set(raw, layer)?;
    let mask = mask::compute(layer, tile_set, cfg);
    let portals = collect_portals(raw, layer, cfg)?;

    Ok(Map {
        name: name.to_string(),
        tile_set: tile_set.clone(),
        width: layer.width,
        height: layer.height,
        tiles: layer.tiles.clone(),
        mask,
        portals,
    })
}

/// Derive a legal generated-code identifier from a file stem.
/// `"world-map 2"` becomes `"world_map_2"`; a leading digit gets a `_`
/// prefix. Case is preserved.
pub fn normalize_name(stem: &str) -> String {
    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// First layer carrying the configured background tag, or the sole layer
/// when the document has exactly one.
fn background_layer<'a>(raw: &'a RawTmx, cfg: &BuildConfig) -> CompileResult<&'a TileLayer> {
    if let Some(l) = raw.layers.iter().find(|l| l.name == cfg.background_layer) {
        return Ok(l);
    }
    match raw.layers.as_slice() {
        [only] => Ok(only),
        _ => Err(CompileError::NoBackgroundLayer),
    }
}

/// The one tile set every nonzero background cell draws from. A layer
/// with no tiles at all falls back to the first declared set.
fn resolve_tile_set<'a>(raw: &'a RawTmx, layer: &TileLayer) -> CompileResult<&'a TileSet> {
    let mut found: Option<&TileSet> = None;
    for &gid in &layer.tiles {
        if gid == 0 {
            continue;
        }
        let ts = owning_tile_set(raw, gid)?;
        match found {
            None => found = Some(ts),
            Some(prev) if std::ptr::eq(prev, ts) => {}
            Some(prev) => {
                return Err(CompileError::AmbiguousBackgroundTileSet {
                    first: prev.name.clone(),
                    second: ts.name.clone(),
                });
            }
        }
    }
    Ok(found.unwrap_or(&raw.tile_sets[0]))
}

fn owning_tile_set<'a>(raw: &'a RawTmx, gid: u32) -> CompileResult<&'a TileSet> {
    raw.tile_sets
        .iter()
        .filter(|ts| ts.first_gid <= gid)
        .max_by_key(|ts| ts.first_gid)
        .ok_or(CompileError::OrphanTileIndex(gid))
}

/// Walk every object group in document order and pick out the portals,
/// preserving object order.
fn collect_portals(
    raw: &RawTmx,
    layer: &TileLayer,
    cfg: &BuildConfig,
) -> CompileResult<Vec<Portal>> {
    let mut portals: Vec<Portal> = Vec::new();
    for group in &raw.object_groups {
        for obj in group.objects.iter().filter(|o| o.kind == cfg.portal_kind) {
            let (x, y, width, height) = tile_rect(obj, raw.tile_width, raw.tile_height)
                .ok_or_else(|| CompileError::InvalidPortalBounds(obj.name.clone()))?;
            if u64::from(x) + u64::from(width) > u64::from(layer.width)
                || u64::from(y) + u64::from(height) > u64::from(layer.height)
            {
                return Err(CompileError::InvalidPortalBounds(obj.name.clone()));
            }
            if portals.iter().any(|p| p.name == obj.name) {
                return Err(CompileError::DuplicatePortalName(obj.name.clone()));
            }
            let target_map = obj
                .properties
                .get(&cfg.portal_target_property)
                .cloned()
                .ok_or_else(|| CompileError::PortalMissingTarget(obj.name.clone()))?;
            portals.push(Portal {
                name: obj.name.clone(),
                x,
                y,
                width,
                height,
                target_map,
                target_portal: obj.properties.get(&cfg.portal_entry_property).cloned(),
            });
        }
    }
    Ok(portals)
}

/// Convert an object's pixel rectangle into tile coordinates: floor the
/// origin, ceil the extent. `None` when the rectangle is empty or starts
/// at negative pixels.
fn tile_rect(obj: &TmxObject, tile_w: u32, tile_h: u32) -> Option<(u32, u32, u32, u32)> {
    if obj.x < 0.0 || obj.y < 0.0 || obj.width <= 0.0 || obj.height <= 0.0 {
        return None;
    }
    let x0 = (obj.x / tile_w as f32).floor() as u32;
    let y0 = (obj.y / tile_h as f32).floor() as u32;
    let x1 = ((obj.x + obj.width) / tile_w as f32).ceil() as u32;
    let y1 = ((obj.y + obj.height) / tile_h as f32).ceil() as u32;
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1 - x0, y1 - y0))
}
