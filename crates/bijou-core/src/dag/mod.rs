//! DAG layer assignment, column ordering, and render.
//!
//! Pipeline: materialize a (bounded) `DagSource` → assign layers via
//! Kahn topological sort → order columns with two barycenter sweeps →
//! size node boxes → route edges onto a box-drawing cell grid →
//! serialize to one of three output profiles.

mod route;
mod slice;

pub use route::{render_accessible, render_grid, render_pipe, Overrides, OutputProfile, PositionInfo};
pub use slice::{slice, SliceDirection, SliceOptions};

use crate::error::{BijouError, Result};
use crate::token::Token;
use std::collections::{HashMap, HashSet, VecDeque};

/// A materialised graph node.
#[derive(Debug, Clone)]
pub struct DagNode {
    /// Stable identifier.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Outgoing edge target ids.
    pub children: Vec<String>,
    /// Optional short badge text.
    pub badge: Option<String>,
    /// Optional node box token override.
    pub token: Option<Token>,
    /// Optional label text token override.
    pub label_token: Option<Token>,
    /// Optional badge text token override.
    pub badge_token: Option<Token>,
    /// True if this is a synthetic slicing-boundary node.
    pub ghost: bool,
}

impl DagNode {
    /// Create a plain node with the given id, label, and children.
    pub fn new(id: impl Into<String>, label: impl Into<String>, children: Vec<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children,
            badge: None,
            token: None,
            label_token: None,
            badge_token: None,
            ghost: false,
        }
    }

    /// Builder: attach a badge.
    #[must_use]
    pub fn badge(mut self, badge: impl Into<String>) -> Self {
        self.badge = Some(badge.into());
        self
    }

    /// Builder: attach a node box token override.
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

/// An abstract adapter over graph data that may be too large to
/// materialise eagerly.
///
/// Implementors whose backing data is inherently finite and already
/// fully known should override [`DagSource::is_bounded`] to return
/// `true`; the default is `false`, requiring `slice()` before layout.
pub trait DagSource {
    /// Enumerate every node id this source (or slice) exposes.
    fn ids(&self) -> Vec<String>;
    /// Resolve a node's display label.
    fn label(&self, id: &str) -> String;
    /// Resolve a node's outgoing edge target ids.
    fn children(&self, id: &str) -> Vec<String>;
    /// Resolve a node's incoming edge source ids, if this source
    /// supports ancestor traversal.
    fn parents(&self, _id: &str) -> Option<Vec<String>> {
        None
    }
    /// Optional badge text.
    fn badge(&self, _id: &str) -> Option<String> {
        None
    }
    /// Optional node box token override.
    fn token(&self, _id: &str) -> Option<Token> {
        None
    }
    /// True if this id is a synthetic ghost boundary marker.
    fn ghost(&self, _id: &str) -> bool {
        false
    }
    /// True if this source's `ids()` enumerates a bounded, already
    /// fully-known set (e.g. a materialised `Vec<DagNode>`, or the
    /// result of `slice()`). Unbounded adaptor sources must override
    /// this to return `false` until sliced.
    fn is_bounded(&self) -> bool {
        true
    }
}

impl DagSource for Vec<DagNode> {
    fn ids(&self) -> Vec<String> {
        self.iter().map(|n| n.id.clone()).collect()
    }

    fn label(&self, id: &str) -> String {
        self.iter()
            .find(|n| n.id == id)
            .map(|n| n.label.clone())
            .unwrap_or_default()
    }

    fn children(&self, id: &str) -> Vec<String> {
        self.iter()
            .find(|n| n.id == id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn parents(&self, id: &str) -> Option<Vec<String>> {
        Some(
            self.iter()
                .filter(|n| n.children.iter().any(|c| c == id))
                .map(|n| n.id.clone())
                .collect(),
        )
    }

    fn badge(&self, id: &str) -> Option<String> {
        self.iter().find(|n| n.id == id).and_then(|n| n.badge.clone())
    }

    fn token(&self, id: &str) -> Option<Token> {
        self.iter().find(|n| n.id == id).and_then(|n| n.token)
    }

    fn ghost(&self, id: &str) -> bool {
        self.iter().find(|n| n.id == id).is_some_and(|n| n.ghost)
    }

    fn is_bounded(&self) -> bool {
        true
    }
}

/// A materialised, layered graph ready for ordering/sizing/routing.
pub struct Dag {
    pub(crate) nodes: Vec<DagNode>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) layers: Vec<Vec<usize>>, // layer -> node indices, in column order
}

impl Dag {
    /// Build a `Dag` from any (bounded) `DagSource`: materialise, then
    /// assign layers via Kahn topological sort, rejecting cycles.
    pub fn build(source: &dyn DagSource) -> Result<Self> {
        if !source.is_bounded() {
            return Err(BijouError::UnboundedSource);
        }
        let ids = source.ids();
        let known: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let mut nodes = Vec::with_capacity(ids.len());
        let mut index = HashMap::with_capacity(ids.len());
        for id in &ids {
            let children: Vec<String> = source
                .children(id)
                .into_iter()
                .filter(|c| known.contains(c.as_str()))
                .collect();
            index.insert(id.clone(), nodes.len());
            nodes.push(DagNode {
                id: id.clone(),
                label: source.label(id),
                children,
                badge: source.badge(id),
                token: source.token(id),
                label_token: None,
                badge_token: None,
                ghost: source.ghost(id),
            });
        }

        let layer_of = assign_layers(&nodes, &index)?;
        let num_layers = layer_of.iter().copied().max().map_or(0, |m| m + 1);
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); num_layers];
        for (i, &l) in layer_of.iter().enumerate() {
            layers[l].push(i);
        }

        let mut dag = Self { nodes, index, layers };
        dag.order_columns(&layer_of);
        Ok(dag)
    }

    /// The layer index of a node, given its node-list index.
    fn layer_of_index(&self, idx: usize) -> usize {
        self.layers
            .iter()
            .position(|layer| layer.contains(&idx))
            .unwrap_or(0)
    }

    /// Two alternating barycenter sweeps: one top-down pass ordering
    /// each layer by mean parent column index in the prior layer, one
    /// bottom-up pass ordering by mean child column index in the next
    /// layer. Exactly one pass each direction, not iterated to a fixed
    /// point.
    fn order_columns(&mut self, layer_of: &[usize]) {
        // Top-down: layers 1..N ordered by parent barycenter.
        for l in 1..self.layers.len() {
            self.barycenter_sort(l, |dag, idx| {
                let parents: Vec<usize> = dag
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| n.children.iter().any(|c| dag.index.get(c) == Some(&idx)))
                    .map(|(i, _)| i)
                    .collect();
                barycenter(dag, &parents, l - 1)
            });
        }
        // Bottom-up: layers N-2..0 ordered by child barycenter.
        if self.layers.len() >= 2 {
            for l in (0..self.layers.len() - 1).rev() {
                self.barycenter_sort(l, |dag, idx| {
                    let children = dag.nodes[idx].children.clone();
                    let child_indices: Vec<usize> = children
                        .iter()
                        .filter_map(|c| dag.index.get(c).copied())
                        .collect();
                    barycenter(dag, &child_indices, l + 1)
                });
            }
        }
        let _ = layer_of;
    }

    fn barycenter_sort(&mut self, layer: usize, score: impl Fn(&Dag, usize) -> f64) {
        let mut scored: Vec<(usize, f64)> = self.layers[layer]
            .iter()
            .map(|&idx| (idx, score(self, idx)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        self.layers[layer] = scored.into_iter().map(|(idx, _)| idx).collect();
    }

    /// Number of layers in this layout.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Node indices (in column order) for a given layer.
    pub fn layer_nodes(&self, layer: usize) -> &[usize] {
        &self.layers[layer]
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total edge count.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).sum()
    }

    /// The layer index containing the node with the given id, if any.
    pub fn layer_of(&self, id: &str) -> Option<usize> {
        let idx = *self.index.get(id)?;
        Some(self.layer_of_index(idx))
    }
}

/// Position of a node's column within its layer, or `+infinity`
/// (represented as `f64::INFINITY`) when it has no eligible neighbours
/// in the adjacent layer.
fn barycenter(dag: &Dag, neighbour_indices: &[usize], neighbour_layer: usize) -> f64 {
    if neighbour_indices.is_empty() {
        return f64::INFINITY;
    }
    let columns = &dag.layers[neighbour_layer];
    let positions: Vec<f64> = neighbour_indices
        .iter()
        .filter_map(|ni| columns.iter().position(|c| c == ni).map(|p| p as f64))
        .collect();
    if positions.is_empty() {
        return f64::INFINITY;
    }
    positions.iter().sum::<f64>() / positions.len() as f64
}

/// Kahn topological sort restricted to known ids; returns each node's
/// layer (`max(parent_layer) + 1`, roots at 0), or `CyclicGraph` on the
/// first discovered cycle.
fn assign_layers(nodes: &[DagNode], index: &HashMap<String, usize>) -> Result<Vec<usize>> {
    let n = nodes.len();
    let mut in_degree = vec![0usize; n];
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, node) in nodes.iter().enumerate() {
        for child in &node.children {
            if let Some(&j) = index.get(child) {
                adj[i].push(j);
                in_degree[j] += 1;
            }
        }
    }

    let mut layer = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut visited = 0usize;

    while let Some(i) = queue.pop_front() {
        visited += 1;
        for &j in &adj[i] {
            layer[j] = layer[j].max(layer[i] + 1);
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                queue.push_back(j);
            }
        }
    }

    if visited != n {
        return Err(BijouError::CyclicGraph);
    }
    Ok(layer)
}
