//! Persisted document: `{ title?, nodes, connections }` as JSON.
//!
//! Positions and sizes are numeric pairs, timestamps are RFC 3339 strings,
//! ids are kept verbatim. Decoding validates the graph invariants up front
//! so a bad file can never be half-applied.

use crate::error::DecodeError;
use crate::id::{ConnectionId, NodeId};
use crate::model::{Connection, Node};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

/// Node and connection counts, as shown in document settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub nodes: usize,
    pub connections: usize,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            nodes: self.nodes.len(),
            connections: self.connections.len(),
        }
    }

    /// Check every invariant the graph store relies on.
    ///
    /// # Errors
    /// The first violation found, in document order.
    pub fn validate(&self) -> Result<(), DecodeError> {
        let mut node_ids: HashSet<NodeId> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                return Err(DecodeError::DuplicateNodeId(node.id.to_string()));
            }
            if !node.position.is_finite() {
                return Err(DecodeError::InvalidNodePosition {
                    node: node.id.to_string(),
                    x: node.position.x,
                    y: node.position.y,
                });
            }
            if !node.size.is_valid() {
                return Err(DecodeError::InvalidNodeSize {
                    node: node.id.to_string(),
                    width: node.size.width,
                    height: node.size.height,
                });
            }
        }

        let mut conn_ids: HashSet<ConnectionId> = HashSet::with_capacity(self.connections.len());
        let mut pairs: HashSet<(NodeId, NodeId)> = HashSet::with_capacity(self.connections.len());
        for conn in &self.connections {
            if !conn_ids.insert(conn.id) {
                return Err(DecodeError::DuplicateConnectionId(conn.id.to_string()));
            }
            for endpoint in [conn.from, conn.to] {
                if !node_ids.contains(&endpoint) {
                    return Err(DecodeError::DanglingConnection {
                        connection: conn.id.to_string(),
                        node: endpoint.to_string(),
                    });
                }
            }
            if !pairs.insert((conn.from, conn.to)) {
                return Err(DecodeError::DuplicateConnection {
                    from: conn.from.to_string(),
                    to: conn.to.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Serialize a document as pretty-printed JSON.
///
/// # Errors
/// A node with a non-finite position or size. `serde_json` would write
/// those as `null`, which [`decode_document`] then rejects.
pub fn encode_document(doc: &Document) -> Result<String, serde_json::Error> {
    let finite = |n: &&Node| {
        n.position.is_finite() && n.size.width.is_finite() && n.size.height.is_finite()
    };
    if let Some(node) = doc.nodes.iter().find(|n| !finite(n)) {
        return Err(serde_json::Error::custom(format!(
            "node {} has non-finite geometry",
            node.id
        )));
    }
    serde_json::to_string_pretty(doc)
}

/// Parse and validate a document.
///
/// # Errors
/// `DecodeError::Json` for malformed input, or the first invariant violation.
pub fn decode_document(json: &str) -> Result<Document, DecodeError> {
    let doc: Document = serde_json::from_str(json)?;
    doc.validate()?;
    log::debug!(
        "decoded document {:?}: {} nodes, {} connections",
        doc.title,
        doc.nodes.len(),
        doc.connections.len()
    );
    Ok(doc)
}
