//! The graph store: nodes, connections, and the selection set.
//!
//! Every mutation is a plain method call that either applies completely or
//! is a no-op. Missing ids are skipped, never reported as errors. After
//! any call returns, connections only reference existing nodes and the
//! selection is a subset of the existing node ids.

use crate::document::Document;
use crate::error::DecodeError;
use crate::id::{ConnectionId, NodeId};
use crate::model::*;
use std::collections::{HashMap, HashSet};

/// Owns the node list (z-order = insertion order), the connection list,
/// and the set of selected node ids.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    selection: HashSet<NodeId>,

    /// Index from NodeId → position in `nodes`. Rebuilt after removals.
    index: HashMap<NodeId, usize>,

    /// Bumped on every effective mutation.
    revision: u64,
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The starter content of a new document: a core idea with two features.
    #[must_use]
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();
        let core = store.add_node("Core Idea", Point::new(400.0, 300.0)).id;
        let feature_a = store.add_node("Feature A", Point::new(600.0, 200.0)).id;
        let feature_b = store.add_node("Feature B", Point::new(600.0, 400.0)).id;
        store.connect_nodes(core, feature_a);
        store.connect_nodes(core, feature_b);
        store
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Nodes in z-order (last = topmost).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Connections where `id` is the source or the target.
    pub fn connections_of(&self, id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    pub fn has_connection(&self, from: NodeId, to: NodeId) -> bool {
        self.connections.iter().any(|c| c.from == from && c.to == to)
    }

    pub fn selection(&self) -> &HashSet<NodeId> {
        &self.selection
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected nodes in z-order.
    pub fn selected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| self.selection.contains(&n.id))
    }

    /// Union of all node frames, or `None` for an empty canvas.
    pub fn content_bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(Node::frame)
            .reduce(|acc, r| acc.union(&r))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─── Node mutations ──────────────────────────────────────────────────

    /// Append a node with a fresh id, default size and style. It is drawn on top.
    /// A non-finite `position` is replaced by the origin.
    pub fn add_node(&mut self, text: impl Into<String>, position: Point) -> &Node {
        let position = if position.is_finite() {
            position
        } else {
            log::warn!(
                "add node: non-finite position ({}, {}) replaced by origin",
                position.x,
                position.y
            );
            Point::ZERO
        };
        let node = Node::new(text, position);
        log::debug!("add node {} at ({}, {})", node.id, position.x, position.y);
        self.push_node(node)
    }

    fn push_node(&mut self, node: Node) -> &Node {
        let i = self.nodes.len();
        self.index.insert(node.id, i);
        self.nodes.push(node);
        self.touch();
        &self.nodes[i]
    }

    /// Remove a node together with every incident connection and its
    /// selection entry. Returns the removed node, or `None` if absent.
    pub fn delete_node(&mut self, id: NodeId) -> Option<Node> {
        let i = self.index.get(&id).copied()?;
        let node = self.nodes.remove(i);
        self.connections.retain(|c| !c.touches(id));
        self.selection.remove(&id);
        self.reindex();
        self.touch();
        log::debug!("delete node {id}");
        Some(node)
    }

    /// Move every listed node that still exists by `offset`.
    /// Returns how many nodes moved; a non-finite offset moves nothing.
    pub fn move_nodes<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a NodeId>,
        offset: Vector,
    ) -> usize {
        if !offset.is_finite() {
            log::debug!("move by non-finite offset ({}, {}) ignored", offset.x, offset.y);
            return 0;
        }
        let mut moved = 0;
        for id in ids {
            if let Some(&i) = self.index.get(id) {
                self.nodes[i].position += offset;
                moved += 1;
            }
        }
        if moved > 0 {
            log::trace!("moved {moved} node(s) by ({}, {})", offset.x, offset.y);
            self.touch();
        }
        moved
    }

    /// Move the current selection by `offset`.
    pub fn move_selection(&mut self, offset: Vector) -> usize {
        let ids: Vec<NodeId> = self.selection.iter().copied().collect();
        self.move_nodes(&ids, offset)
    }

    pub fn set_node_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        let Some(&i) = self.index.get(&id) else {
            return false;
        };
        self.nodes[i].text = text.into();
        self.touch();
        true
    }

    /// Apply a style preset to every listed node that exists.
    pub fn set_node_style<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a NodeId>,
        style: NodeStyle,
    ) -> usize {
        let mut changed = 0;
        for id in ids {
            if let Some(&i) = self.index.get(id) {
                self.nodes[i].style = style;
                changed += 1;
            }
        }
        if changed > 0 {
            self.touch();
        }
        changed
    }

    /// Copy each existing listed node (text, size, style) at
    /// `DUPLICATE_OFFSET` from the original. Connections are not copied.
    /// Copies are appended in the originals' z-order; returns their ids.
    pub fn duplicate_nodes<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<NodeId> {
        let wanted: HashSet<NodeId> = ids.into_iter().copied().collect();
        let copies: Vec<Node> = self
            .nodes
            .iter()
            .filter(|n| wanted.contains(&n.id))
            .map(|original| {
                let mut copy = Node::new(original.text.clone(), original.position + DUPLICATE_OFFSET);
                copy.size = original.size;
                copy.style = original.style;
                copy
            })
            .collect();

        let new_ids: Vec<NodeId> = copies.iter().map(|n| n.id).collect();
        for copy in copies {
            self.push_node(copy);
        }
        if !new_ids.is_empty() {
            log::debug!("duplicated {} node(s)", new_ids.len());
        }
        new_ids
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Connect `from` → `to`. No-op (returns `None`) when either endpoint is
    /// missing or the ordered pair is already connected. Self-loops are allowed.
    pub fn connect_nodes(&mut self, from: NodeId, to: NodeId) -> Option<ConnectionId> {
        if !self.contains_node(from) || !self.contains_node(to) {
            log::debug!("connect {from} -> {to} skipped: missing endpoint");
            return None;
        }
        if self.has_connection(from, to) {
            return None;
        }
        let conn = Connection::new(from, to);
        let id = conn.id;
        self.connections.push(conn);
        self.touch();
        log::debug!("connect {from} -> {to}");
        Some(id)
    }

    /// Chain-connect the selected nodes in z-order: n0 → n1 → … → nk.
    /// Returns the ids of the connections actually created.
    pub fn connect_selected(&mut self) -> Vec<ConnectionId> {
        let chain: Vec<NodeId> = self.selected_nodes().map(|n| n.id).collect();
        chain
            .windows(2)
            .filter_map(|pair| self.connect_nodes(pair[0], pair[1]))
            .collect()
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let i = self.connections.iter().position(|c| c.id == id)?;
        self.touch();
        Some(self.connections.remove(i))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`, first clearing the selection when `exclusive`.
    /// Ids that do not exist are never added.
    pub fn select_node(&mut self, id: NodeId, exclusive: bool) {
        let mut next = if exclusive {
            HashSet::new()
        } else {
            self.selection.clone()
        };
        if self.contains_node(id) {
            next.insert(id);
        }
        self.replace_selection(next);
    }

    pub fn toggle_selection(&mut self, id: NodeId) {
        if self.selection.remove(&id) {
            self.touch();
        } else if self.contains_node(id) {
            self.selection.insert(id);
            self.touch();
        }
    }

    pub fn deselect(&mut self, id: NodeId) -> bool {
        let removed = self.selection.remove(&id);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.touch();
        }
    }

    pub fn select_all(&mut self) {
        let all: HashSet<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.replace_selection(all);
    }

    /// Replace the selection with the listed ids that exist.
    pub fn set_selection<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) {
        let wanted: HashSet<NodeId> = ids
            .into_iter()
            .copied()
            .filter(|id| self.index.contains_key(id))
            .collect();
        self.replace_selection(wanted);
    }

    fn replace_selection(&mut self, selection: HashSet<NodeId>) {
        if selection != self.selection {
            self.selection = selection;
            self.touch();
        }
    }

    /// Delete every selected node in one pass: each incident connection is
    /// removed exactly once, and the selection ends up empty.
    /// Returns the removed nodes in z-order.
    pub fn delete_selected(&mut self) -> Vec<Node> {
        if self.selection.is_empty() {
            return Vec::new();
        }
        let doomed = std::mem::take(&mut self.selection);
        self.connections
            .retain(|c| !doomed.contains(&c.from) && !doomed.contains(&c.to));

        let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(&mut self.nodes)
            .into_iter()
            .partition(|n| doomed.contains(&n.id));
        self.nodes = kept;
        self.reindex();
        self.touch();
        log::debug!("deleted {} selected node(s)", removed.len());
        removed
    }

    // ─── Documents ───────────────────────────────────────────────────────

    pub fn to_document(&self, title: impl Into<String>) -> Document {
        Document {
            title: title.into(),
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
        }
    }

    /// Replace nodes and connections with the document's and clear the
    /// selection. The document is validated first; on error the store is
    /// left exactly as it was.
    ///
    /// # Errors
    /// The validation failure, see [`Document::validate`].
    pub fn load_document(&mut self, doc: Document) -> Result<(), DecodeError> {
        doc.validate()?;
        self.nodes = doc.nodes;
        self.connections = doc.connections;
        self.selection.clear();
        self.reindex();
        self.touch();
        Ok(())
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn reindex(&mut self) {
        self.index.clear();
        self.index
            .extend(self.nodes.iter().enumerate().map(|(i, n)| (n.id, i)));
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn ids(store: &GraphStore) -> Vec<NodeId> {
        store.nodes().iter().map(|n| n.id).collect()
    }

    #[test]
    fn add_node_uses_defaults_and_appends() {
        let mut store = GraphStore::new();
        let n1 = store.add_node("X", Point::new(0.0, 0.0)).clone();
        assert_eq!(n1.text, "X");
        assert_eq!(n1.size, DEFAULT_NODE_SIZE);
        assert_eq!(n1.style, NodeStyle::DEFAULT);
        assert_eq!(store.nodes().len(), 1);

        let n2 = store.add_node("Y", Point::new(10.0, 10.0)).id;
        assert_eq!(ids(&store), vec![n1.id, n2]);
    }

    #[test]
    fn delete_node_cascades_to_connections_and_selection() {
        let mut store = GraphStore::new();
        let n1 = store.add_node("X", Point::ZERO).id;
        let n2 = store.add_node("Y", Point::new(10.0, 10.0)).id;
        store.connect_nodes(n1, n2);
        assert_eq!(store.connections()[0].from, n1);
        store.select_node(n1, true);

        let removed = store.delete_node(n1).unwrap();
        assert_eq!(removed.id, n1);
        assert_eq!(ids(&store), vec![n2]);
        assert!(store.connections().is_empty());
        assert!(store.selection().is_empty());
    }

    #[test]
    fn delete_missing_node_is_noop() {
        let mut store = GraphStore::with_sample_data();
        let rev = store.revision();
        assert!(store.delete_node(NodeId::intern("nope")).is_none());
        assert_eq!(store.nodes().len(), 3);
        assert_eq!(store.revision(), rev);
    }

    #[test]
    fn index_survives_removal_from_middle() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let b = store.add_node("b", Point::ZERO).id;
        let c = store.add_node("c", Point::ZERO).id;
        store.delete_node(b);
        assert_eq!(store.node(a).unwrap().text, "a");
        assert_eq!(store.node(c).unwrap().text, "c");
        assert!(store.node(b).is_none());
    }

    #[test]
    fn connect_is_idempotent_per_ordered_pair() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let b = store.add_node("b", Point::ZERO).id;

        assert!(store.connect_nodes(a, b).is_some());
        assert!(store.connect_nodes(a, b).is_none());
        assert_eq!(store.connections().len(), 1);

        assert!(store.connect_nodes(b, a).is_some());
        assert_eq!(store.connections().len(), 2);
    }

    #[test]
    fn connect_to_missing_node_is_ignored() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let gone = store.add_node("gone", Point::ZERO).id;
        store.delete_node(gone);
        assert!(store.connect_nodes(a, gone).is_none());
        assert!(store.connections().is_empty());
    }

    #[test]
    fn self_loops_are_permitted() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let id = store.connect_nodes(a, a).unwrap();
        assert_eq!(store.connections()[0].id, id);
        assert!(store.connections()[0].is_self_loop());
    }

    #[test]
    fn move_nodes_skips_missing_ids() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::new(1.0, 2.0)).id;
        let moved = store.move_nodes(&[a, NodeId::intern("missing")], Vector::new(10.0, -5.0));
        assert_eq!(moved, 1);
        assert_eq!(store.node(a).unwrap().position, Point::new(11.0, -3.0));
    }

    #[test]
    fn repeated_small_moves_accumulate() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        for _ in 0..3 {
            store.move_nodes(&[a], Vector::new(0.1, -0.1));
        }
        let position = store.node(a).unwrap().position;
        assert_relative_eq!(position.x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(position.y, -0.3, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_offsets_and_positions_never_land() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::new(1.0, 2.0)).id;
        let rev = store.revision();
        assert_eq!(store.move_nodes(&[a], Vector::new(f64::NAN, 0.0)), 0);
        assert_eq!(store.move_nodes(&[a], Vector::new(0.0, f64::INFINITY)), 0);
        assert_eq!(store.node(a).unwrap().position, Point::new(1.0, 2.0));
        assert_eq!(store.revision(), rev);

        let b = store.add_node("b", Point::new(f64::NAN, 5.0)).id;
        assert_eq!(store.node(b).unwrap().position, Point::ZERO);
        assert!(store.to_document("t").validate().is_ok());
    }

    #[test]
    fn selection_noops_keep_revision() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let gone = store.add_node("gone", Point::ZERO).id;
        store.delete_node(gone);
        store.select_all();
        let rev = store.revision();

        store.select_node(gone, false);
        store.select_node(a, true);
        store.select_node(a, false);
        store.toggle_selection(gone);
        store.select_all();
        store.set_selection(&[a, gone]);
        assert_eq!(store.revision(), rev);

        store.select_node(gone, true);
        assert!(store.selection().is_empty());
        assert!(store.revision() > rev);
    }

    #[test]
    fn selection_operations() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let b = store.add_node("b", Point::ZERO).id;

        store.select_node(a, true);
        store.select_node(b, false);
        assert_eq!(store.selection().len(), 2);

        store.select_node(b, true);
        assert_eq!(store.selection(), &HashSet::from([b]));

        store.toggle_selection(a);
        store.toggle_selection(b);
        assert_eq!(store.selection(), &HashSet::from([a]));

        store.select_all();
        assert_eq!(store.selection(), &HashSet::from([a, b]));

        store.clear_selection();
        assert!(store.selection().is_empty());
    }

    #[test]
    fn selecting_missing_node_never_adds_it() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let ghost = store.add_node("ghost", Point::ZERO).id;
        store.delete_node(ghost);
        store.select_node(a, true);
        store.select_node(ghost, false);
        store.toggle_selection(ghost);
        assert_eq!(store.selection(), &HashSet::from([a]));
    }

    #[test]
    fn duplicate_copies_visuals_but_not_identity_or_edges() {
        let mut store = GraphStore::new();
        let n1 = store.add_node("X", Point::new(5.0, 5.0)).id;
        let n2 = store.add_node("Y", Point::ZERO).id;
        store.connect_nodes(n1, n2);
        store.set_node_style(&[n1], NodeStyle::code_block());
        let before = store.node(n1).unwrap().clone();

        let new_ids = store.duplicate_nodes(&[n1]);
        assert_eq!(new_ids.len(), 1);
        let copy = store.node(new_ids[0]).unwrap();
        assert_ne!(copy.id, n1);
        assert_eq!(copy.text, "X");
        assert_eq!(copy.size, before.size);
        assert_eq!(copy.style, NodeStyle::code_block());
        assert_eq!(copy.position, before.position + DUPLICATE_OFFSET);
        assert_eq!(store.node(n1).unwrap(), &before);
        assert_eq!(store.connections().len(), 1);
    }

    #[test]
    fn duplicate_preserves_z_order_of_sources() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let b = store.add_node("b", Point::ZERO).id;
        let copies = store.duplicate_nodes(&[b, a, NodeId::intern("gone")]);
        let texts: Vec<&str> = copies
            .iter()
            .map(|id| store.node(*id).unwrap().text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn delete_selected_removes_shared_edges_once() {
        let mut store = GraphStore::new();
        let a = store.add_node("A", Point::ZERO).id;
        let b = store.add_node("B", Point::ZERO).id;
        let c = store.add_node("C", Point::ZERO).id;
        store.connect_nodes(a, b);
        store.connect_nodes(b, c);
        store.select_node(a, true);
        store.select_node(b, false);

        let removed = store.delete_selected();
        assert_eq!(removed.len(), 2);
        assert_eq!(ids(&store), vec![c]);
        assert!(store.connections().is_empty());
        assert!(store.selection().is_empty());
        assert_eq!(store.node(c).unwrap().text, "C");
    }

    #[test]
    fn connect_selected_chains_in_z_order() {
        let mut store = GraphStore::new();
        let a = store.add_node("a", Point::ZERO).id;
        let b = store.add_node("b", Point::ZERO).id;
        let c = store.add_node("c", Point::ZERO).id;
        store.connect_nodes(a, b);
        store.select_all();

        let created = store.connect_selected();
        assert_eq!(created.len(), 1);
        assert!(store.has_connection(a, b));
        assert!(store.has_connection(b, c));
        assert_eq!(store.connections().len(), 2);
    }

    #[test]
    fn content_bounds_unions_frames() {
        let mut store = GraphStore::new();
        assert!(store.content_bounds().is_none());
        store.add_node("a", Point::new(0.0, 0.0));
        store.add_node("b", Point::new(200.0, 100.0));
        let bounds = store.content_bounds().unwrap();
        assert_eq!(bounds.min, Point::new(-60.0, -30.0));
        assert_eq!(bounds.max, Point::new(260.0, 130.0));
    }

    #[test]
    fn sample_data_matches_new_document() {
        let store = GraphStore::with_sample_data();
        let texts: Vec<&str> = store.nodes().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["Core Idea", "Feature A", "Feature B"]);
        assert_eq!(store.connections().len(), 2);
        let core = store.nodes()[0].id;
        assert!(store.connections().iter().all(|c| c.from == core));
    }

    #[test]
    fn failed_load_leaves_store_untouched() {
        let mut store = GraphStore::with_sample_data();
        let before_nodes = store.nodes().to_vec();
        let mut bad = store.to_document("bad");
        bad.nodes.remove(1);
        assert!(store.load_document(bad).is_err());
        assert_eq!(store.nodes(), before_nodes.as_slice());
        assert_eq!(store.connections().len(), 2);
    }

    #[test]
    fn load_replaces_content_and_clears_selection() {
        let mut store = GraphStore::with_sample_data();
        store.select_all();
        let other = GraphStore::with_sample_data().to_document("other");
        let expected: Vec<NodeId> = other.nodes.iter().map(|n| n.id).collect();
        store.load_document(other).unwrap();
        assert_eq!(ids(&store), expected);
        assert!(store.selection().is_empty());
        assert!(store.node(expected[2]).is_some());
    }
}
