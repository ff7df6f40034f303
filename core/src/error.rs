//! Error types for asset conversion

/// Result alias used throughout the pipeline
pub type Result<T> = std::result::Result<T, AssetError>;

/// Errors surfaced by asset queries
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// No mounted archive holds a record with this name
    #[error("asset '{name}' not found")]
    Missing { name: String },

    /// The record exists but its data is inconsistent
    #[error("asset '{asset}' is malformed: {error}")]
    Integrity {
        asset: String,
        #[source]
        error: IntegrityError,
    },

    /// Texture pixel format has no GPU counterpart
    #[error("texture '{texture}' uses unsupported format {format}")]
    UnsupportedFormat { texture: String, format: String },

    /// An archive could not be read or decoded
    #[error("archive error: {0:#}")]
    Archive(anyhow::Error),
}

impl AssetError {
    pub fn missing(name: impl Into<String>) -> Self {
        AssetError::Missing { name: name.into() }
    }

    pub fn integrity(asset: impl Into<String>, error: IntegrityError) -> Self {
        AssetError::Integrity {
            asset: asset.into(),
            error,
        }
    }
}

/// Specific data inconsistencies found while converting a record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrityError {
    #[error("skeleton has no nodes")]
    EmptySkeleton,

    #[error("node {node} has parent {parent} but only {count} nodes exist")]
    ParentOutOfRange { node: usize, parent: usize, count: usize },

    #[error("node {node} is part of a parent cycle")]
    CyclicHierarchy { node: usize },

    #[error("bone name '{name}' is used more than once")]
    DuplicateBoneName { name: String },

    #[error("skin weights of vertex sum to zero")]
    ZeroWeightSum,

    #[error("skin weight references node {node}, which the mesh does not bind")]
    UnknownSkinNode { node: usize },

    #[error("skin binds {count} joints (max {max})")]
    TooManyJoints { count: usize, max: usize },

    #[error("polygon {polygon} has {features} feature indices but {positions} position indices")]
    PolygonIndexMismatch {
        polygon: usize,
        features: usize,
        positions: usize,
    },

    #[error("polygon {polygon} has only {corners} corners")]
    DegeneratePolygon { polygon: usize, corners: usize },

    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("polygon {polygon} intersects no grid cell")]
    UnassignedPolygon { polygon: usize },

    #[error("invalid frame rate {fps}")]
    InvalidFrameRate { fps: f32 },

    #[error("animated node {node} not in skeleton of {bones} bones")]
    AnimationNodeOutOfRange { node: usize, bones: usize },

    #[error("animated node {node} appears more than once")]
    DuplicateAnimationNode { node: usize },

    #[error("expected {expected} animation samples, found {found}")]
    SampleCountMismatch { expected: usize, found: usize },

    #[error("expected a {expected} record, found {found}")]
    UnexpectedRecord {
        expected: &'static str,
        found: &'static str,
    },
}

impl From<anyhow::Error> for AssetError {
    fn from(error: anyhow::Error) -> Self {
        AssetError::Archive(error)
    }
}
