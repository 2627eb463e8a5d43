//! Node box sizing, edge routing, and the three output profiles.

use super::{Dag, DagNode};
use crate::ansi::{pad_to_width, visible_width};
use crate::token::Token;
use std::collections::{HashMap, HashSet};

const ROWS_PER_LAYER: u16 = 6;
const MIN_NODE_WIDTH: u16 = 16;

/// Directions carried by a single routing cell; the rendered glyph is
/// the box-drawing character whose connections are the union of every
/// direction recorded for that cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Dirs {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Dirs {
    fn union(self, other: Self) -> Self {
        Self {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    fn glyph(self) -> char {
        match (self.up, self.down, self.left, self.right) {
            (false, false, false, false) => ' ',
            (true, true, false, false) => '│',
            (false, false, true, true) => '─',
            (false, true, false, true) => '┌',
            (false, true, true, false) => '┐',
            (true, false, false, true) => '└',
            (true, false, true, false) => '┘',
            (true, true, false, true) => '├',
            (true, true, true, false) => '┤',
            (false, true, true, true) => '┬',
            (true, false, true, true) => '┴',
            (true, true, true, true) => '┼',
            _ => '┼',
        }
    }
}

/// Per-node geometry used for both rendering and hit-testing.
#[derive(Debug, Clone, Copy)]
pub struct PositionInfo {
    /// Top row.
    pub row: u16,
    /// Left column.
    pub col: u16,
    /// Box width.
    pub width: u16,
    /// Box height (always `ROWS_PER_LAYER` minus the routing rows it shares).
    pub height: u16,
}

/// The three output profiles for DAG rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputProfile {
    /// Full styled/plain grid (interactive or static mode).
    Grid,
    /// One line per node: `Label (badge)? -> child, labels`.
    Pipe,
    /// Accessible textual summary with per-layer edge lists.
    Accessible,
}

struct Geometry {
    widths: Vec<u16>, // per-layer node width
    gap: u16,
    total_width: u16,
}

fn compute_geometry(dag: &Dag, max_width: u16) -> Geometry {
    let mut node_width = |n: &DagNode| -> u16 {
        let label_w = visible_width(&n.label) as u16;
        let badge_w = n.badge.as_ref().map(|b| visible_width(b) as u16 + 2).unwrap_or(0);
        (label_w + badge_w + 4).max(MIN_NODE_WIDTH)
    };

    let mut widest = 0u16;
    for node in &dag.nodes {
        widest = widest.max(node_width(&node));
    }

    let max_per_layer = dag.layers.iter().map(Vec::len).max().unwrap_or(1).max(1) as u16;

    let mut gap = 4u16;
    let mut width = widest;
    if max_per_layer.saturating_mul(width + gap) > max_width {
        gap = 2;
    }
    while max_per_layer.saturating_mul(width + gap) > max_width && width > MIN_NODE_WIDTH {
        width -= 1;
    }

    let widths = vec![width; dag.nodes.len()];
    let total_width = max_per_layer.saturating_mul(width + gap);
    Geometry { widths, gap, total_width }
}

/// Override tokens applied by selection / highlight, keyed by node
/// index (node box + label/badge) or by routing cell `(row, col)`.
#[derive(Default)]
pub struct Overrides {
    /// Node-index -> token override for the node box and its text.
    pub node_tokens: HashMap<usize, Token>,
    /// `(row, col)` -> token override for a routed edge cell.
    pub edge_tokens: HashMap<(u16, u16), Token>,
    /// Node index of a selected node; supersedes highlight and per-node tokens.
    pub selected: Option<usize>,
    /// Token used for the selected node.
    pub selected_token: Option<Token>,
}

impl Overrides {
    /// Apply a highlight path: an ordered id list whose routed edges
    /// and node boxes get the given token overrides.
    ///
    /// `max_width` must match the width the path will eventually be
    /// rendered at via [`render_grid`]; a mismatch makes the highlighted
    /// cells diverge from the grid actually drawn, since shrinking the
    /// available width reflows node positions.
    pub fn highlight_path(&mut self, dag: &Dag, path: &[String], node_token: Token, edge_token: Token, max_width: u16) {
        for id in path {
            if let Some(&idx) = dag.index.get(id) {
                self.node_tokens.insert(idx, node_token);
            }
        }
        for window in path.windows(2) {
            if let (Some(&pi), Some(&ci)) = (dag.index.get(&window[0]), dag.index.get(&window[1])) {
                for cell in edge_path_cells(dag, pi, ci, max_width) {
                    self.edge_tokens.insert(cell, edge_token);
                }
            }
        }
    }
}

/// Column centre (in absolute grid columns) of a node's box.
fn node_centre(pos: &PositionInfo) -> u16 {
    pos.col + pos.width / 2
}

fn layer_positions(dag: &Dag, geometry: &Geometry) -> HashMap<usize, PositionInfo> {
    let mut positions = HashMap::new();
    for (layer_idx, indices) in dag.layers.iter().enumerate() {
        let mut col = 0u16;
        for &node_idx in indices {
            let width = geometry.widths[node_idx];
            positions.insert(
                node_idx,
                PositionInfo {
                    row: layer_idx as u16 * ROWS_PER_LAYER,
                    col,
                    width,
                    height: 3,
                },
            );
            col += width + geometry.gap;
        }
    }
    positions
}

/// Enumerate the routing cells `(row, col)` a single edge traverses,
/// at the same `max_width` the grid will actually be rendered at.
fn edge_path_cells(dag: &Dag, parent_idx: usize, child_idx: usize, max_width: u16) -> Vec<(u16, u16)> {
    let geometry = compute_geometry(dag, max_width);
    let positions = layer_positions(dag, &geometry);
    let (Some(p), Some(c)) = (positions.get(&parent_idx), positions.get(&child_idx)) else {
        return Vec::new();
    };
    let p_row = p.row + 3;
    let p_col = node_centre(p);
    let c_col = node_centre(c);
    let c_row = c.row;

    let mut cells = Vec::new();
    if p_col == c_col {
        for r in p_row..c_row {
            cells.push((r, p_col));
        }
    } else {
        let mid_row = p_row + 1;
        cells.push((p_row, p_col));
        let (lo, hi) = if p_col < c_col { (p_col, c_col) } else { (c_col, p_col) };
        for col in lo..=hi {
            cells.push((mid_row, col));
        }
        for r in mid_row..c_row {
            cells.push((r, c_col));
        }
    }
    if c_row > 0 {
        cells.push((c_row - 1, c_col));
    }
    cells
}

/// Compute the full per-cell direction grid for every edge in the graph,
/// plus the set of cells holding an arrowhead into a child node.
fn build_direction_grid(dag: &Dag, geometry: &Geometry) -> (HashMap<(u16, u16), Dirs>, HashSet<(u16, u16)>) {
    let positions = layer_positions(dag, geometry);
    let mut grid: HashMap<(u16, u16), Dirs> = HashMap::new();
    let mut arrowheads: HashSet<(u16, u16)> = HashSet::new();

    for (pi, node) in dag.nodes.iter().enumerate() {
        for child_id in &node.children {
            let Some(&ci) = dag.index.get(child_id) else { continue };
            let (Some(p), Some(c)) = (positions.get(&pi), positions.get(&ci)) else { continue };
            route_one_edge(p, c, &mut grid, &mut arrowheads);
        }
    }
    (grid, arrowheads)
}

fn route_one_edge(p: &PositionInfo, c: &PositionInfo, grid: &mut HashMap<(u16, u16), Dirs>, arrowheads: &mut HashSet<(u16, u16)>) {
    let p_row = p.row + 3;
    let p_col = node_centre(p);
    let c_col = node_centre(c);
    let c_row = c.row;
    let mut mark = |row: u16, col: u16, d: Dirs| {
        grid.entry((row, col)).and_modify(|e| *e = e.union(d)).or_insert(d);
    };

    if p_col == c_col {
        for r in p_row..c_row {
            mark(r, p_col, Dirs { up: true, down: true, ..Default::default() });
        }
    } else {
        let mid_row = p_row + 1;
        mark(p_row, p_col, Dirs { up: true, down: true, ..Default::default() });
        let (lo, hi) = if p_col < c_col { (p_col, c_col) } else { (c_col, p_col) };
        for col in lo..=hi {
            let mut d = Dirs { left: col > lo, right: col < hi, ..Default::default() };
            if col == p_col {
                d.up = true;
            }
            if col == c_col {
                d.down = true;
            }
            mark(mid_row, col, d);
        }
        for r in mid_row + 1..c_row {
            mark(r, c_col, Dirs { up: true, down: true, ..Default::default() });
        }
    }
    // Arrowhead placed in the row immediately above the destination box.
    // Recorded separately from `grid` since that row already carries the
    // incoming line's up/down direction bits; unioning an empty `Dirs`
    // there would be a no-op and the arrowhead would never show.
    if c_row > 0 {
        arrowheads.insert((c_row - 1, c_col));
    }
}

/// Serialize the full grid profile: node boxes, routed edges, and
/// styling runs collapsed into single SGR applications.
pub fn render_grid(dag: &Dag, overrides: &Overrides, max_width: u16) -> (String, HashMap<String, PositionInfo>) {
    let geometry = compute_geometry(dag, max_width);
    let positions = layer_positions(dag, &geometry);
    let (direction_grid, arrowheads) = build_direction_grid(dag, &geometry);

    let total_rows = dag.layer_count() as u16 * ROWS_PER_LAYER;
    let mut canvas: Vec<Vec<char>> = vec![vec![' '; geometry.total_width as usize]; total_rows as usize];

    for (r, row) in (0u16..).zip(canvas.iter_mut()) {
        let _ = r;
        let _ = row;
    }

    for (idx, node) in dag.nodes.iter().enumerate() {
        let Some(pos) = positions.get(&idx) else { continue };
        paint_node_box(&mut canvas, node, pos);
    }

    for (&(row, col), &dirs) in &direction_grid {
        if (row as usize) < canvas.len() && (col as usize) < canvas[0].len() {
            let existing = canvas[row as usize][col as usize];
            if existing == ' ' {
                canvas[row as usize][col as usize] = dirs.glyph();
            }
        }
    }
    for &(row, col) in &arrowheads {
        if (row as usize) < canvas.len() && (col as usize) < canvas[0].len() {
            canvas[row as usize][col as usize] = '▼';
        }
    }

    let mut node_token_by_cell: HashMap<(u16, u16), Token> = HashMap::new();
    for (idx, token) in &overrides.node_tokens {
        if let Some(pos) = positions.get(idx) {
            for r in pos.row..pos.row + 3 {
                for c in pos.col..pos.col + pos.width {
                    node_token_by_cell.insert((r, c), *token);
                }
            }
        }
    }
    if let (Some(idx), Some(token)) = (overrides.selected, overrides.selected_token) {
        if let Some(pos) = positions.get(&idx) {
            for r in pos.row..pos.row + 3 {
                for c in pos.col..pos.col + pos.width {
                    node_token_by_cell.insert((r, c), token);
                }
            }
        }
    }

    let out = serialize_canvas(&canvas, &node_token_by_cell, &overrides.edge_tokens);
    let mut id_positions = HashMap::new();
    for (idx, node) in dag.nodes.iter().enumerate() {
        if let Some(pos) = positions.get(&idx) {
            id_positions.insert(node.id.clone(), *pos);
        }
    }
    (out, id_positions)
}

fn paint_node_box(canvas: &mut [Vec<char>], node: &DagNode, pos: &PositionInfo) {
    let (tl, tr, bl, br, h, v) = if node.ghost {
        ('┌', '┐', '└', '┘', '╌', '╎')
    } else {
        ('┌', '┐', '└', '┘', '─', '│')
    };
    let w = pos.width as usize;
    let row0 = pos.row as usize;
    let col0 = pos.col as usize;
    if row0 >= canvas.len() {
        return;
    }
    canvas[row0][col0] = tl;
    for c in 1..w - 1 {
        canvas[row0][col0 + c] = h;
    }
    canvas[row0][col0 + w - 1] = tr;

    let content_row = row0 + 1;
    if content_row < canvas.len() {
        canvas[content_row][col0] = v;
        canvas[content_row][col0 + w - 1] = v;
        let mut text = node.label.clone();
        if let Some(badge) = &node.badge {
            text.push_str(&format!(" ({badge})"));
        }
        let inner_w = w.saturating_sub(2);
        let fitted = pad_to_width(&crate::ansi::clip_to_width(&text, inner_w), inner_w);
        for (i, ch) in fitted.chars().enumerate() {
            if i < inner_w {
                canvas[content_row][col0 + 1 + i] = ch;
            }
        }
    }

    let bottom_row = row0 + 2;
    if bottom_row < canvas.len() {
        canvas[bottom_row][col0] = bl;
        for c in 1..w - 1 {
            canvas[bottom_row][col0 + c] = h;
        }
        canvas[bottom_row][col0 + w - 1] = br;
    }
}

fn serialize_canvas(
    canvas: &[Vec<char>],
    node_tokens: &HashMap<(u16, u16), Token>,
    edge_tokens: &HashMap<(u16, u16), Token>,
) -> String {
    let mut lines = Vec::with_capacity(canvas.len());
    for (r, row) in canvas.iter().enumerate() {
        let mut line = String::new();
        let mut current_token: Option<Token> = None;
        let mut open = false;
        for (c, &ch) in row.iter().enumerate() {
            let token = node_tokens
                .get(&(r as u16, c as u16))
                .or_else(|| edge_tokens.get(&(r as u16, c as u16)))
                .copied();
            if token != current_token {
                if open {
                    line.push_str("\x1b[0m");
                    open = false;
                }
                if let Some(t) = token {
                    line.push_str(&t.sgr_truecolor());
                    open = true;
                }
                current_token = token;
            }
            line.push(ch);
        }
        if open {
            line.push_str("\x1b[0m");
        }
        let trimmed = line.trim_end().to_string();
        lines.push(trimmed);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Pipe profile: one line per node.
pub fn render_pipe(dag: &Dag) -> String {
    dag.nodes
        .iter()
        .map(|n| {
            let head = match &n.badge {
                Some(b) => format!("{} ({b})", n.label),
                None => n.label.clone(),
            };
            if n.children.is_empty() {
                head
            } else {
                let labels: Vec<String> = n
                    .children
                    .iter()
                    .map(|c| dag.index.get(c).map(|&i| dag.nodes[i].label.clone()).unwrap_or_default())
                    .collect();
                format!("{head} -> {}", labels.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Accessible profile: summary header plus per-layer edge listings.
pub fn render_accessible(dag: &Dag) -> String {
    let mut out = format!(
        "Graph: {} nodes, {} edges",
        dag.node_count(),
        dag.edge_count()
    );
    for (layer_idx, indices) in dag.layers.iter().enumerate() {
        out.push_str(&format!("\nLayer {}:", layer_idx + 1));
        for &idx in indices {
            let node = &dag.nodes[idx];
            if node.children.is_empty() {
                out.push_str(&format!("\n  {} (end)", node.label));
            } else {
                let labels: Vec<String> = node
                    .children
                    .iter()
                    .map(|c| dag.index.get(c).map(|&i| dag.nodes[i].label.clone()).unwrap_or_default())
                    .collect();
                out.push_str(&format!("\n  {} -> {}", node.label, labels.join(", ")));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::{Dag, DagNode, DagSource};

    fn diamond() -> Vec<DagNode> {
        vec![
            DagNode::new("a", "a", vec!["b".into(), "c".into()]),
            DagNode::new("b", "b", vec!["d".into()]),
            DagNode::new("c", "c", vec!["d".into()]),
            DagNode::new("d", "d", vec![]),
        ]
    }

    #[test]
    fn accessible_profile_matches_scenario() {
        let nodes = diamond();
        let dag = Dag::build(&nodes as &dyn DagSource).unwrap_or_else(|_| panic!("build failed"));
        let out = render_accessible(&dag);
        assert!(out.starts_with("Graph: 4 nodes, 4 edges"));
        assert!(out.contains("Layer 1:"));
        assert!(out.contains("a -> b, c"));
        assert!(out.contains("Layer 3:"));
        assert!(out.contains("d (end)"));
    }

    #[test]
    fn pipe_profile_lists_children() {
        let nodes = diamond();
        let dag = Dag::build(&nodes as &dyn DagSource).unwrap_or_else(|_| panic!("build failed"));
        let out = render_pipe(&dag);
        assert!(out.contains("a -> b, c"));
        assert!(out.lines().any(|l| l == "d"));
    }

    #[test]
    fn grid_profile_contains_node_labels() {
        let nodes = diamond();
        let dag = Dag::build(&nodes as &dyn DagSource).unwrap_or_else(|_| panic!("build failed"));
        let overrides = Overrides::default();
        let (out, positions) = render_grid(&dag, &overrides, 120);
        assert!(out.contains('a'));
        assert!(positions.contains_key("a"));
        assert!(positions.contains_key("d"));
    }
}
