//! Error types for the map compiler.

use thiserror::Error;

/// Result type for compiler operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Everything that can stop a document from becoming a registered map.
///
/// The parser and builder surface these to their caller immediately; the
/// driving loop decides whether one bad document aborts the run or is
/// skipped with a diagnostic.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Input is not well-formed markup, or a required attribute is
    /// missing or non-numeric.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Document declares zero tile sets.
    #[error("document declares no tile sets")]
    NoTileSet,

    /// No layer carries the background tag and there is not exactly one
    /// layer to fall back on.
    #[error("document has no background layer")]
    NoBackgroundLayer,

    /// Background layer cells reference more than one tile set.
    #[error("background layer references both tile set `{first}` and `{second}`")]
    AmbiguousBackgroundTileSet { first: String, second: String },

    /// A cell value falls below every declared tile set's first index.
    #[error("tile index {0} is not covered by any tile set")]
    OrphanTileIndex(u32),

    /// Portal rectangle is empty or sticks out of the map grid.
    #[error("portal `{0}` is empty or outside the map bounds")]
    InvalidPortalBounds(String),

    /// Two portals in the same map share a name.
    #[error("duplicate portal name `{0}`")]
    DuplicatePortalName(String),

    /// Portal object lacks the property naming its destination map.
    #[error("portal `{0}` has no target map property")]
    PortalMissingTarget(String),

    /// A map with this name was already registered in this run.
    #[error("duplicate map name `{0}`")]
    DuplicateMapName(String),
}
