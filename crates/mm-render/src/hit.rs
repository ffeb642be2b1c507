//! Hit testing: logical point → node lookup.
//!
//! Walks the node list back to front (last painted = topmost) and returns
//! the first node whose centered bounding box contains the point.

use mm_core::id::NodeId;
use mm_core::model::{Node, Point};

/// Find the topmost node at logical `point`.
/// Returns `None` if no node is hit (background).
pub fn hit_test(point: Point, nodes: &[Node]) -> Option<&Node> {
    nodes.iter().rev().find(|node| node.contains(point))
}

pub fn hit_test_id(point: Point, nodes: &[Node]) -> Option<NodeId> {
    hit_test(point, nodes).map(|node| node.id)
}
