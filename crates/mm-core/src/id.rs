use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

/// Global string interner for node and connection IDs.
///
/// Entries are never freed: every generated id, every id read from a
/// document and every string passed to `intern` stays for the life of the
/// process. Use `NodeId::lookup` to query an id without interning it.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

fn fresh_uuid() -> Spur {
    INTERNER.get_or_intern(Uuid::new_v4().to_string())
}

/// Identifier of a node on the canvas.
/// Internally a `Spur` index: 4 bytes, `Copy`, O(1) `Eq`/`Hash`.
/// The original id text (usually a UUID) is preserved across save/load.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern an existing id string, or return the id if already interned.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// The id for `s` if it has been interned before. Never allocates.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(NodeId)
    }

    /// Generate a fresh, globally unique id (UUID v4).
    pub fn generate() -> Self {
        NodeId(fresh_uuid())
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

/// Identifier of a connection (directed edge) between two nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Spur);

impl ConnectionId {
    pub fn intern(s: &str) -> Self {
        ConnectionId(INTERNER.get_or_intern(s))
    }

    pub fn generate() -> Self {
        ConnectionId(fresh_uuid())
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge:{}", self.as_str())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConnectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ConnectionId::intern(&s))
    }
}
