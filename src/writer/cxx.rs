//! Emit the C++ declaration/definition pair for every registered map.
//!
//! The two artifacts stay in lockstep: each map declared in the header
//! gets exactly one definition block, in the same relative order, so the
//! link step can never mismatch them.

use std::io::{self, Write};

use crate::database::MapDatabase;
use crate::model::Map;
use crate::writer::GENERATED_BANNER;

/// Forward declarations, one per map, in registration order.
pub fn emit_declarations(db: &MapDatabase, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "// {GENERATED_BANNER}")?;
    writeln!(out, "#pragma once")?;
    writeln!(out, "#include \"MapData.h\"")?;
    writeln!(out)?;
    for map in db.all_maps() {
        writeln!(out, "extern const MapData map_{};", map.name)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Full data definitions, same relative order as the declarations.
pub fn emit_definitions(db: &MapDatabase, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "// {GENERATED_BANNER}")?;
    writeln!(out, "#include \"gen_mapdata.h\"")?;
    writeln!(out, "#include \"game.h\"")?;
    writeln!(out)?;
    for map in db.all_maps() {
        definition(map, out)?;
        writeln!(out)?;
    }
    Ok(())
}

/// One self-contained block: tile array, mask array, portal array (when
/// any), then the aggregate the header declared.
fn definition(map: &Map, out: &mut impl Write) -> io::Result<()> {
    tiles_array(map, out)?;
    mask_array(map, out)?;
    if !map.portals.is_empty() {
        portal_array(map, out)?;
    }

    let portals = if map.portals.is_empty() {
        "NULL".to_string()
    } else {
        format!("{}_portals", map.name)
    };
    writeln!(out, "const MapData map_{n} = {{", n = map.name)?;
    writeln!(
        out,
        "    \"{n}\", &TileSet_{n}, {w}, {h},",
        n = map.name,
        w = map.width,
        h = map.height
    )?;
    writeln!(
        out,
        "    {n}_tiles, {n}_mask, {count}, {portals}",
        n = map.name,
        count = map.portals.len()
    )?;
    writeln!(out, "}};")?;
    Ok(())
}

fn tiles_array(map: &Map, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "static const uint16_t {}_tiles[] = {{", map.name)?;
    for row in map.tiles.chunks(map.width as usize) {
        let cells: Vec<String> = row
            .iter()
            .map(|&gid| map.engine_tile(gid).to_string())
            .collect();
        writeln!(out, "    {},", cells.join(", "))?;
    }
    writeln!(out, "}};")?;
    Ok(())
}

fn mask_array(map: &Map, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "static const uint8_t {}_mask[] = {{", map.name)?;
    for row in map.mask.bytes().chunks(map.mask.bytes_per_row()) {
        let bytes: Vec<String> = row.iter().map(|b| format!("0x{b:02x}")).collect();
        writeln!(out, "    {},", bytes.join(", "))?;
    }
    writeln!(out, "}};")?;
    Ok(())
}

fn portal_array(map: &Map, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "static const PortalData {}_portals[] = {{", map.name)?;
    for p in &map.portals {
        let entry = match &p.target_portal {
            Some(e) => format!("\"{e}\""),
            None => "NULL".to_string(),
        };
        writeln!(
            out,
            "    {{ \"{name}\", {x}, {y}, {w}, {h}, \"{target}\", {entry} }},",
            name = p.name,
            x = p.x,
            y = p.y,
            w = p.width,
            h = p.height,
            target = p.target_map,
        )?;
    }
    writeln!(out, "}};")?;
    Ok(())
}
