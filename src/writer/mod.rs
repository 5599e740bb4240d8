//! Component 4 – code emission from the registry.
//!
//! Writers only ever write to the sink they are given; opening files is
//! the driver's business. Output is deterministic: the same database
//! state produces byte-identical artifacts on every run.

pub mod cxx;
pub mod lua;

/// Marker stamped at the top of every generated artifact.
pub const GENERATED_BANNER: &str = "GENERATED BY MAPTOOL, DO NOT EDIT BY HAND";
