//! Emit the Lua asset-declaration projection.
//!
//! One line per map, naming the tile-set image the asset pipeline should
//! bake. A reduced view of the same model: no grid, no mask, no portals.

use std::io::{self, Write};

use crate::database::MapDatabase;
use crate::writer::GENERATED_BANNER;

pub fn emit_assets(db: &MapDatabase, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "-- {GENERATED_BANNER}")?;
    for map in db.all_maps() {
        writeln!(
            out,
            "TileSet_{name} = image{{ \"{file}\", width={w}, height={h} }}",
            name = map.name,
            file = file_name(&map.tile_set.image),
            w = map.tile_set.tile_width,
            h = map.tile_set.tile_height,
        )?;
    }
    Ok(())
}

/// Last path component; the asset pipeline resolves images by bare name.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_from_image_paths() {
        assert_eq!(file_name("art/tiles/woods.png"), "woods.png");
        assert_eq!(file_name("art\\woods.png"), "woods.png");
        assert_eq!(file_name("woods.png"), "woods.png");
    }
}
