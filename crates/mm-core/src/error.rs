use thiserror::Error;

/// Why a persisted document could not be loaded.
///
/// Decoding is all-or-nothing: when any of these is returned, no part of
/// the document has been applied.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("duplicate connection id: {0}")]
    DuplicateConnectionId(String),

    #[error("connection {connection} references missing node {node}")]
    DanglingConnection { connection: String, node: String },

    #[error("duplicate connection {from} -> {to}")]
    DuplicateConnection { from: String, to: String },

    #[error("node {node} has non-finite position ({x}, {y})")]
    InvalidNodePosition { node: String, x: f64, y: f64 },

    #[error("node {node} has invalid size {width}x{height}")]
    InvalidNodeSize { node: String, width: f64, height: f64 },
}
