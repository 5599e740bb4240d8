//! Collision mask derived from the background layer.

use crate::config::BuildConfig;
use crate::model::{TileLayer, TileSet};

/// Per-cell passable/blocked grid. One bit per cell, row-major, each row
/// padded to a byte boundary so the engine can index rows directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl Mask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![0; (width as usize).div_ceil(8) * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Packed bytes, `height` rows of `bytes_per_row()` each.
    pub fn bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn is_blocked(&self, x: u32, y: u32) -> bool {
        let (idx, bit) = self.locate(x, y);
        self.bits[idx] & bit != 0
    }

    fn set_blocked(&mut self, x: u32, y: u32) {
        let (idx, bit) = self.locate(x, y);
        self.bits[idx] |= bit;
    }

    fn locate(&self, x: u32, y: u32) -> (usize, u8) {
        debug_assert!(x < self.width && y < self.height);
        let idx = y as usize * self.bytes_per_row() + x as usize / 8;
        (idx, 1 << (x % 8))
    }
}

/// Scan every cell in row-major order and mark the blocked ones.
///
/// A cell blocks movement iff it holds a tile and either that tile's
/// `solid` property (see [`BuildConfig::solid_property`]) says `"true"`,
/// or the property is absent and the tile's local index equals the
/// configured marker. Empty cells never block.
///
/// The caller guarantees every nonzero cell belongs to `tile_set`.
pub fn compute(layer: &TileLayer, tile_set: &TileSet, cfg: &BuildConfig) -> Mask {
    let mut mask = Mask::new(layer.width, layer.height);
    for y in 0..layer.height {
        for x in 0..layer.width {
            let gid = layer.tiles[(y * layer.width + x) as usize];
            if gid == 0 {
                continue;
            }
            let local = gid - tile_set.first_gid;
            let blocked = match tile_set.tile_property(local, &cfg.solid_property) {
                Some(value) => value == "true",
                None => local == cfg.solid_tile,
            };
            if blocked {
                mask.set_blocked(x, y);
            }
        }
    }
    mask
}
