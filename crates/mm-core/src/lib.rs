pub mod document;
pub mod error;
pub mod id;
pub mod model;
pub mod store;

pub use document::{Document, DocumentStats, decode_document, encode_document};
pub use error::DecodeError;
pub use id::{ConnectionId, NodeId};
pub use model::*;
pub use store::GraphStore;
