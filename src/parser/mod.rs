//! Component 1 – the TMX document loader.
//!
//! Pulls one editor-exported XML document apart into [`RawTmx`]: tile
//! sets, layer grids and object groups, nothing interpreted. Everything
//! the compiler does not consume (image layers, group layers, editor
//! settings, …) is skipped, so richer editor output keeps loading.
//!
//! No domain validation happens here; that is the builder's job. The one
//! structural rule enforced is that every layer carries exactly
//! `width * height` cells.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::model::{ObjectGroup, RawTmx, TileLayer, TileSet, TmxObject};

/// How the current `<data>` element stores its cells.
enum DataEncoding {
    /// Comma-separated text payload.
    Csv,
    /// One `<tile gid="…"/>` child per cell.
    Elements,
}

/// Parse the whole document text into a [`RawTmx`].
///
/// Pure function of its input: identical text always yields an identical
/// result, and nothing outside the given string is touched.
pub fn parse(text: &str) -> CompileResult<RawTmx> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut doc = RawTmx {
        tile_width: 0,
        tile_height: 0,
        tile_sets: Vec::new(),
        layers: Vec::new(),
        object_groups: Vec::new(),
    };
    let mut saw_map = false;

    // Open-element state; at most one of each is live at a time.
    let mut tile_set: Option<TileSet> = None;
    let mut tile_id: Option<u32> = None;
    let mut layer: Option<TileLayer> = None;
    let mut group: Option<ObjectGroup> = None;
    let mut object: Option<TmxObject> = None;
    let mut encoding: Option<DataEncoding> = None;

    let mut buf = Vec::new();
    loop {
        let ev = reader
            .read_event_into(&mut buf)
            .map_err(|err| malformed(format!("{err}")))?;
        let self_closing = matches!(&ev, Event::Empty(_));
        match &ev {
            Event::Start(e) | Event::Empty(e) => {
                match e.name().as_ref() {
                    b"map" => {
                        let attrs = attrs_of(e)?;
                        doc.tile_width = req_u32(&attrs, "tilewidth", "map")?;
                        doc.tile_height = req_u32(&attrs, "tileheight", "map")?;
                        if doc.tile_width == 0 || doc.tile_height == 0 {
                            return Err(malformed("<map> declares a zero tile size"));
                        }
                        saw_map = true;
                    }
                    b"tileset" => {
                        let attrs = attrs_of(e)?;
                        if attrs.contains_key("source") {
                            // An external .tsx reference carries no inline
                            // image or tile size, and the parser reads
                            // nothing but the given text.
                            return Err(malformed("external tilesets are not supported"));
                        }
                        let ts = TileSet {
                            first_gid: req_u32(&attrs, "firstgid", "tileset")?,
                            name: attrs.get("name").cloned().unwrap_or_default(),
                            image: String::new(),
                            tile_width: req_u32(&attrs, "tilewidth", "tileset")?,
                            tile_height: req_u32(&attrs, "tileheight", "tileset")?,
                            tile_properties: HashMap::new(),
                        };
                        if self_closing {
                            finish_tile_set(&mut doc, ts)?;
                        } else {
                            tile_set = Some(ts);
                        }
                    }
                    b"image" => {
                        if let Some(ts) = tile_set.as_mut() {
                            let attrs = attrs_of(e)?;
                            ts.image = attrs
                                .get("source")
                                .cloned()
                                .ok_or_else(|| malformed("<image> missing `source`"))?;
                        }
                    }
                    b"layer" => {
                        let attrs = attrs_of(e)?;
                        let width = req_u32(&attrs, "width", "layer")?;
                        let height = req_u32(&attrs, "height", "layer")?;
                        let l = TileLayer {
                            name: attrs.get("name").cloned().unwrap_or_default(),
                            width,
                            height,
                            tiles: Vec::with_capacity(width as usize * height as usize),
                        };
                        if self_closing {
                            finish_layer(&mut doc, l)?;
                        } else {
                            layer = Some(l);
                        }
                    }
                    b"data" if layer.is_some() => {
                        let attrs = attrs_of(e)?;
                        encoding = Some(match attrs.get("encoding").map(String::as_str) {
                            None => DataEncoding::Elements,
                            Some("csv") => DataEncoding::Csv,
                            Some(other) => {
                                return Err(malformed(format!(
                                    "unsupported tile data encoding `{other}`"
                                )));
                            }
                        });
                    }
                    b"tile" => {
                        if let (Some(l), Some(DataEncoding::Elements)) =
                            (layer.as_mut(), encoding.as_ref())
                        {
                            let attrs = attrs_of(e)?;
                            let gid = match attrs.get("gid") {
                                Some(v) => v.parse().map_err(|_| {
                                    malformed(format!("non-numeric tile gid `{v}`"))
                                })?,
                                None => 0,
                            };
                            l.tiles.push(gid);
                        } else if tile_set.is_some() && !self_closing {
                            let attrs = attrs_of(e)?;
                            tile_id = Some(req_u32(&attrs, "id", "tile")?);
                        }
                    }
                    b"objectgroup" => {
                        let attrs = attrs_of(e)?;
                        let g = ObjectGroup {
                            name: attrs.get("name").cloned().unwrap_or_default(),
                            objects: Vec::new(),
                        };
                        if self_closing {
                            doc.object_groups.push(g);
                        } else {
                            group = Some(g);
                        }
                    }
                    b"object" if group.is_some() => {
                        let attrs = attrs_of(e)?;
                        let o = TmxObject {
                            name: attrs.get("name").cloned().unwrap_or_default(),
                            kind: attrs
                                .get("type")
                                .or_else(|| attrs.get("class"))
                                .cloned()
                                .unwrap_or_default(),
                            x: req_f32(&attrs, "x", "object")?,
                            y: req_f32(&attrs, "y", "object")?,
                            width: opt_f32(&attrs, "width")?,
                            height: opt_f32(&attrs, "height")?,
                            properties: HashMap::new(),
                        };
                        if self_closing {
                            if let Some(g) = group.as_mut() {
                                g.objects.push(o);
                            }
                        } else {
                            object = Some(o);
                        }
                    }
                    b"property" => {
                        let attrs = attrs_of(e)?;
                        // Properties with element-text values are not used
                        // by this model; only attribute values are read.
                        if let (Some(name), Some(value)) = (attrs.get("name"), attrs.get("value")) {
                            if let Some(o) = object.as_mut() {
                                o.properties.insert(name.clone(), value.clone());
                            } else if let (Some(ts), Some(id)) = (tile_set.as_mut(), tile_id) {
                                ts.tile_properties
                                    .entry(id)
                                    .or_default()
                                    .insert(name.clone(), value.clone());
                            }
                        }
                    }
                    // Anything else (imagelayer, group, editorsettings, …)
                    // is outside this model and deliberately skipped.
                    _ => {}
                }
            }
            Event::Text(t) => {
                if let (Some(l), Some(DataEncoding::Csv)) = (layer.as_mut(), encoding.as_ref()) {
                    let text = t.unescape().map_err(|err| malformed(format!("{err}")))?;
                    parse_csv(&text, &mut l.tiles)?;
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"tileset" => {
                    if let Some(ts) = tile_set.take() {
                        finish_tile_set(&mut doc, ts)?;
                    }
                }
                b"tile" => tile_id = None,
                b"data" => encoding = None,
                b"layer" => {
                    if let Some(l) = layer.take() {
                        finish_layer(&mut doc, l)?;
                    }
                }
                b"object" => {
                    if let (Some(g), Some(o)) = (group.as_mut(), object.take()) {
                        g.objects.push(o);
                    }
                }
                b"objectgroup" => {
                    if let Some(g) = group.take() {
                        doc.object_groups.push(g);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_map {
        return Err(malformed("missing <map> element"));
    }
    Ok(doc)
}

fn malformed(msg: impl Into<String>) -> CompileError {
    CompileError::MalformedDocument(msg.into())
}

/// Collect an element's attributes into owned strings.
fn attrs_of(e: &BytesStart) -> CompileResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(format!("bad attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(format!("bad attribute value: {err}")))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn req_u32(attrs: &HashMap<String, String>, key: &str, what: &str) -> CompileResult<u32> {
    let value = attrs
        .get(key)
        .ok_or_else(|| malformed(format!("<{what}> missing `{key}`")))?;
    value
        .parse()
        .map_err(|_| malformed(format!("<{what}> has non-numeric `{key}`: `{value}`")))
}

fn req_f32(attrs: &HashMap<String, String>, key: &str, what: &str) -> CompileResult<f32> {
    let value = attrs
        .get(key)
        .ok_or_else(|| malformed(format!("<{what}> missing `{key}`")))?;
    value
        .parse()
        .map_err(|_| malformed(format!("<{what}> has non-numeric `{key}`: `{value}`")))
}

fn opt_f32(attrs: &HashMap<String, String>, key: &str) -> CompileResult<f32> {
    match attrs.get(key) {
        None => Ok(0.0),
        Some(value) => value
            .parse()
            .map_err(|_| malformed(format!("non-numeric `{key}`: `{value}`"))),
    }
}

fn parse_csv(text: &str, into: &mut Vec<u32>) -> CompileResult<()> {
    for token in text.split([',', '\n', '\r', ' ', '\t']) {
        if token.is_empty() {
            continue;
        }
        let gid = token
            .parse()
            .map_err(|_| malformed(format!("non-numeric tile value `{token}`")))?;
        into.push(gid);
    }
    Ok(())
}

fn finish_tile_set(doc: &mut RawTmx, ts: TileSet) -> CompileResult<()> {
    if ts.image.is_empty() {
        return Err(malformed(format!("tileset `{}` has no image", ts.name)));
    }
    doc.tile_sets.push(ts);
    Ok(())
}

fn finish_layer(doc: &mut RawTmx, l: TileLayer) -> CompileResult<()> {
    let expected = (l.width as usize) * (l.height as usize);
    if l.tiles.len() != expected {
        return Err(malformed(format!(
            "layer `{}` declares {}x{} but carries {} cells",
            l.name,
            l.width,
            l.height,
            l.tiles.len()
        )));
    }
    doc.layers.push(l);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="2" height="2" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="ground" tilewidth="16" tileheight="16">
  <image source="art/ground.png" width="128" height="128"/>
  <tile id="1">
   <properties><property name="solid" value="true"/></properties>
  </tile>
 </tileset>
 <layer name="background" width="2" height="2">
  <data encoding="csv">1,2,
0,1</data>
 </layer>
 <objectgroup name="portals">
  <object id="1" name="north" type="portal" x="0" y="0" width="16" height="16">
   <properties><property name="map" value="cave"/></properties>
  </object>
 </objectgroup>
</map>"#;

    #[test]
    fn parses_minimal_document() {
        let doc = parse(MINI).expect("valid document");
        assert_eq!(doc.tile_width, 16);
        assert_eq!(doc.tile_sets.len(), 1);
        assert_eq!(doc.tile_sets[0].image, "art/ground.png");
        assert_eq!(doc.tile_sets[0].tile_property(1, "solid"), Some("true"));
        assert_eq!(doc.layers.len(), 1);
        assert_eq!(doc.layers[0].tiles, vec![1, 2, 0, 1]);
        assert_eq!(doc.object_groups.len(), 1);
        let obj = &doc.object_groups[0].objects[0];
        assert_eq!(obj.name, "north");
        assert_eq!(obj.kind, "portal");
        assert_eq!(obj.properties.get("map").map(String::as_str), Some("cave"));
    }

    #[test]
    fn parses_element_encoded_data() {
        let text = r#"<map tilewidth="8" tileheight="8">
 <tileset firstgid="1" name="t" tilewidth="8" tileheight="8"><image source="t.png"/></tileset>
 <layer name="background" width="2" height="1">
  <data><tile gid="3"/><tile/></data>
 </layer>
</map>"#;
        let doc = parse(text).unwrap();
        assert_eq!(doc.layers[0].tiles, vec![3, 0]);
    }

    #[test]
    fn identical_input_yields_identical_output() {
        let a = parse(MINI).unwrap();
        let b = parse(MINI).unwrap();
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn skips_elements_outside_the_model() {
        let text = r#"<map tilewidth="8" tileheight="8">
 <editorsettings><export format="tmx"/></editorsettings>
 <tileset firstgid="1" name="t" tilewidth="8" tileheight="8"><image source="t.png"/></tileset>
 <imagelayer name="backdrop"><image source="sky.png"/></imagelayer>
 <layer name="background" width="1" height="1"><data encoding="csv">1</data></layer>
</map>"#;
        let doc = parse(text).expect("unknown elements are tolerated");
        assert_eq!(doc.tile_sets.len(), 1);
        assert_eq!(doc.layers.len(), 1);
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(matches!(
            parse("<map tilewidth=\"8\""),
            Err(CompileError::MalformedDocument(_))
        ));
    }

    #[test]
    fn rejects_missing_layer_dimensions() {
        let text = r#"<map tilewidth="8" tileheight="8">
 <layer name="background" width="2"><data encoding="csv">1,1</data></layer>
</map>"#;
        assert!(matches!(
            parse(text),
            Err(CompileError::MalformedDocument(_))
        ));
    }

    #[test]
    fn rejects_cell_count_mismatch() {
        let text = r#"<map tilewidth="8" tileheight="8">
 <layer name="background" width="2" height="2"><data encoding="csv">1,1,1</data></layer>
</map>"#;
        let err = parse(text).unwrap_err();
        assert!(err.to_string().contains("carries 3 cells"), "{err}");
    }

    #[test]
    fn rejects_base64_data() {
        let text = r#"<map tilewidth="8" tileheight="8">
 <layer name="background" width="1" height="1"><data encoding="base64">AQAAAA==</data></layer>
</map>"#;
        assert!(matches!(
            parse(text),
            Err(CompileError::MalformedDocument(_))
        ));
    }

    #[test]
    fn rejects_external_tileset() {
        let text = r#"<map tilewidth="8" tileheight="8">
 <tileset firstgid="1" source="shared.tsx"/>
</map>"#;
        assert!(matches!(
            parse(text),
            Err(CompileError::MalformedDocument(_))
        ));
    }
}
