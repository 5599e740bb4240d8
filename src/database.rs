//! Component 3 – the run-scoped map registry.

use std::collections::HashSet;

use crate::error::{CompileError, CompileResult};
use crate::model::Map;

/// Append-only, insertion-ordered collection of every map compiled in one
/// run. Iteration order is a load-bearing contract: the writers walk it
/// front to back, so registration order decides artifact order.
#[derive(Debug, Default)]
pub struct MapDatabase {
    maps: Vec<Map>,
    names: HashSet<String>,
}

impl MapDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a map, keeping first-registration order. A name clash
    /// rejects (and drops) the newcomer; the registered map stays.
    pub fn register(&mut self, map: Map) -> CompileResult<()> {
        if !self.names.insert(map.name.clone()) {
            return Err(CompileError::DuplicateMapName(map.name));
        }
        self.maps.push(map);
        Ok(())
    }

    /// All registered maps in registration order. Restartable: every call
    /// starts a fresh pass over the same sequence.
    pub fn all_maps(&self) -> impl Iterator<Item = &Map> {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use crate::config::BuildConfig;
    use crate::model::{RawTmx, TileLayer, TileSet};
    use std::collections::HashMap;

    fn map(name: &str) -> Map {
        let raw = RawTmx {
            tile_width: 16,
            tile_height: 16,
            tile_sets: vec![TileSet {
                first_gid: 1,
                name: "ground".into(),
                image: "ground.png".into(),
                tile_width: 16,
                tile_height: 16,
                tile_properties: HashMap::new(),
            }],
            layers: vec![TileLayer {
                name: "background".into(),
                width: 2,
                height: 2,
                tiles: vec![1; 4],
            }],
            object_groups: Vec::new(),
        };
        builder::build(&raw, name, &BuildConfig::default()).unwrap()
    }

    #[test]
    fn duplicate_names_are_rejected_and_not_retained() {
        let mut db = MapDatabase::new();
        db.register(map("woods")).unwrap();
        assert!(matches!(
            db.register(map("woods")),
            Err(CompileError::DuplicateMapName(name)) if name == "woods"
        ));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn iteration_follows_registration_order_not_names() {
        let mut db = MapDatabase::new();
        for name in ["zeta", "alpha", "midway"] {
            db.register(map(name)).unwrap();
        }
        let names: Vec<&str> = db.all_maps().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "midway"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut db = MapDatabase::new();
        db.register(map("woods")).unwrap();
        db.register(map("cave")).unwrap();
        let first: Vec<&str> = db.all_maps().map(|m| m.name.as_str()).collect();
        let second: Vec<&str> = db.all_maps().map(|m| m.name.as_str()).collect();
        assert_eq!(first, second);
    }
}
