//! Flexbox-style space distribution.
//!
//! Distributes a 1-D main-axis extent among children by fixed basis,
//! auto-measured content, or flex-grow factor, then aligns children on
//! the cross axis and composes the result into a `width`x`height` grid
//! string. Main-axis distribution itself is computed by
//! [`taffy`]'s flexbox solver rather than by hand; this module's own
//! code covers only what Taffy has no notion of — rendering text into
//! the cells Taffy sized.

use taffy::prelude::*;

use crate::ansi::{fit_to_width, pad_to_width, visible_width};

/// Main-axis direction of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Children are laid out side by side; main axis is width.
    Row,
    /// Children are stacked; main axis is height.
    Column,
}

/// Cross-axis (and, for columns, main-axis) alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Align to the start (left/top).
    #[default]
    Start,
    /// Center within the allocated space.
    Center,
    /// Align to the end (right/bottom).
    End,
}

/// A child's renderable content: either a fixed string or a function of
/// its allocated `(width, height)`.
pub enum Content {
    /// A pre-rendered string.
    Fixed(String),
    /// A function producing content for the given allocation.
    Measured(Box<dyn Fn(u16, u16) -> String>),
}

impl Content {
    /// Wrap a fixed string as content.
    pub fn fixed(s: impl Into<String>) -> Self {
        Self::Fixed(s.into())
    }

    /// Wrap a measuring function as content.
    pub fn measured(f: impl Fn(u16, u16) -> String + 'static) -> Self {
        Self::Measured(Box::new(f))
    }

    fn render(&self, w: u16, h: u16) -> String {
        match self {
            Self::Fixed(s) => s.clone(),
            Self::Measured(f) => f(w, h),
        }
    }

    /// Intrinsic main-axis measurement: 0 for a measured (render)
    /// function per spec, max line width (rows) or line count
    /// (columns) for fixed content.
    fn intrinsic_main(&self, direction: Direction) -> u16 {
        match self {
            Self::Measured(_) => 0,
            Self::Fixed(s) => match direction {
                Direction::Row => s
                    .lines()
                    .map(visible_width)
                    .max()
                    .unwrap_or(0)
                    .min(u16::MAX as usize) as u16,
                Direction::Column => s.lines().count().max(1).min(u16::MAX as usize) as u16,
            },
        }
    }
}

/// A child of a flex container.
pub struct Child {
    /// The child's renderable content.
    pub content: Content,
    /// Flex-grow factor; `0` means not flexible.
    pub flex: u32,
    /// Fixed main-axis basis, overriding intrinsic measurement.
    pub basis: Option<u16>,
    /// Minimum main-axis size.
    pub min_size: Option<u16>,
    /// Maximum main-axis size.
    pub max_size: Option<u16>,
    /// Cross-axis (rows) / main-axis (columns) alignment.
    pub align: Align,
}

impl Child {
    /// Create a child with fixed content and no flex/basis constraints.
    pub fn new(content: Content) -> Self {
        Self {
            content,
            flex: 0,
            basis: None,
            min_size: None,
            max_size: None,
            align: Align::Start,
        }
    }

    /// Builder: set the flex-grow factor.
    #[must_use]
    pub fn flex(mut self, flex: u32) -> Self {
        self.flex = flex;
        self
    }

    /// Builder: set a fixed basis.
    #[must_use]
    pub fn basis(mut self, basis: u16) -> Self {
        self.basis = Some(basis);
        self
    }

    /// Builder: set a minimum size clamp.
    #[must_use]
    pub fn min_size(mut self, min: u16) -> Self {
        self.min_size = Some(min);
        self
    }

    /// Builder: set a maximum size clamp.
    #[must_use]
    pub fn max_size(mut self, max: u16) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Builder: set cross/main-axis alignment.
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

/// A flex container.
pub struct Container {
    /// Main-axis direction.
    pub direction: Direction,
    /// Total width in columns.
    pub width: u16,
    /// Total height in rows.
    pub height: u16,
    /// Gap between adjacent children, in cells.
    pub gap: u16,
}

impl Container {
    /// Create a container with zero gap.
    pub fn new(direction: Direction, width: u16, height: u16) -> Self {
        Self {
            direction,
            width,
            height,
            gap: 0,
        }
    }

    /// Builder: set the inter-child gap.
    #[must_use]
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    fn main_extent(&self) -> u16 {
        match self.direction {
            Direction::Row => self.width,
            Direction::Column => self.height,
        }
    }

    fn cross_extent(&self) -> u16 {
        match self.direction {
            Direction::Row => self.height,
            Direction::Column => self.width,
        }
    }

    /// Compute the layout and render it into a grid string of exactly
    /// `width`x`height` cells.
    pub fn render(&self, children: &[Child]) -> String {
        let allocations = self.allocate(children);
        let cross = self.cross_extent();

        let rendered: Vec<Vec<String>> = children
            .iter()
            .zip(allocations.iter())
            .map(|(child, &main)| {
                let (w, h) = match self.direction {
                    Direction::Row => (main, cross),
                    Direction::Column => (cross, main),
                };
                let raw = child.content.render(w, h);
                fit_block(&raw, w, h, child.align, self.direction)
            })
            .collect();

        match self.direction {
            Direction::Row => self.compose_row(&rendered, &allocations),
            Direction::Column => self.compose_column(&rendered, &allocations),
        }
    }

    /// Public accessor exposing each child's allocated main-axis extent,
    /// computed by handing the container and its children to a
    /// [`taffy::TaffyTree`] as a single-level flex layout.
    pub fn allocate(&self, children: &[Child]) -> Vec<u16> {
        if children.is_empty() {
            return Vec::new();
        }
        self.try_allocate(children).unwrap_or_else(|| vec![0u16; children.len()])
    }

    fn try_allocate(&self, children: &[Child]) -> Option<Vec<u16>> {
        let mut tree: TaffyTree<()> = TaffyTree::new();
        let mut nodes = Vec::with_capacity(children.len());
        for child in children {
            // A flex-grow child's main size is whatever share of the
            // remaining space its grow factor earns; only non-growing
            // children get an explicit basis (own size or intrinsic
            // content measurement).
            let basis = (child.flex == 0)
                .then(|| child.basis.unwrap_or_else(|| child.content.intrinsic_main(self.direction)));
            let style = self.child_style(child, basis);
            nodes.push(tree.new_leaf(style).ok()?);
        }

        let root = tree.new_with_children(self.container_style(), &nodes).ok()?;
        let available = Size { width: AvailableSpace::Definite(f32::from(self.width)), height: AvailableSpace::Definite(f32::from(self.height)) };
        tree.compute_layout(root, available).ok()?;

        nodes
            .iter()
            .map(|&node| {
                let layout = tree.layout(node).ok()?;
                let main = match self.direction {
                    Direction::Row => layout.size.width,
                    Direction::Column => layout.size.height,
                };
                Some(round_size(main))
            })
            .collect()
    }

    fn container_style(&self) -> Style {
        let flex_direction = match self.direction {
            Direction::Row => FlexDirection::Row,
            Direction::Column => FlexDirection::Column,
        };
        let gap = match self.direction {
            Direction::Row => Size { width: LengthPercentage::Length(f32::from(self.gap)), height: LengthPercentage::Length(0.0) },
            Direction::Column => Size { width: LengthPercentage::Length(0.0), height: LengthPercentage::Length(f32::from(self.gap)) },
        };
        Style {
            flex_direction,
            gap,
            size: Size { width: Dimension::Length(f32::from(self.width)), height: Dimension::Length(f32::from(self.height)) },
            ..Default::default()
        }
    }

    fn child_style(&self, child: &Child, basis: Option<u16>) -> Style {
        let main_len = basis.map_or(Dimension::Auto, |b| Dimension::Length(f32::from(b)));
        let min = child.min_size.map(|m| Dimension::Length(f32::from(m)));
        let max = child.max_size.map(|m| Dimension::Length(f32::from(m)));
        let (size, min_size, max_size) = match self.direction {
            Direction::Row => (
                Size { width: main_len, height: Dimension::Auto },
                Size { width: min.unwrap_or(Dimension::Auto), height: Dimension::Auto },
                Size { width: max.unwrap_or(Dimension::Auto), height: Dimension::Auto },
            ),
            Direction::Column => (
                Size { width: Dimension::Auto, height: main_len },
                Size { width: Dimension::Auto, height: min.unwrap_or(Dimension::Auto) },
                Size { width: Dimension::Auto, height: max.unwrap_or(Dimension::Auto) },
            ),
        };
        Style { flex_grow: child.flex as f32, flex_shrink: 0.0, size, min_size, max_size, ..Default::default() }
    }

    fn compose_row(&self, rendered: &[Vec<String>], allocations: &[u16]) -> String {
        let rows = self.height as usize;
        let mut lines = vec![String::new(); rows];
        for (idx, block) in rendered.iter().enumerate() {
            for r in 0..rows {
                lines[r].push_str(block.get(r).map(String::as_str).unwrap_or(""));
                if idx + 1 < rendered.len() {
                    lines[r].push_str(&" ".repeat(self.gap as usize));
                }
            }
        }
        let used: u16 = allocations.iter().sum::<u16>()
            + self.gap.saturating_mul(allocations.len().saturating_sub(1) as u16);
        let residue = self.width.saturating_sub(used);
        if residue > 0 {
            for line in &mut lines {
                line.push_str(&" ".repeat(residue as usize));
            }
        }
        lines.join("\n")
    }

    fn compose_column(&self, rendered: &[Vec<String>], allocations: &[u16]) -> String {
        let mut lines: Vec<String> = Vec::new();
        for (idx, block) in rendered.iter().enumerate() {
            lines.extend(block.iter().cloned());
            if idx + 1 < rendered.len() {
                for _ in 0..self.gap {
                    lines.push(" ".repeat(self.width as usize));
                }
            }
        }
        let used: u16 = allocations.iter().sum::<u16>()
            + self.gap.saturating_mul(allocations.len().saturating_sub(1) as u16);
        let residue = self.height.saturating_sub(used);
        for _ in 0..residue {
            lines.push(" ".repeat(self.width as usize));
        }
        lines
    }
}

/// Fit a rendered block into exactly `w`x`h` cells: clip/pad each line
/// on the cross axis, clip/pad the line count on the main axis
/// (columns) per the child's alignment.
fn fit_block(raw: &str, w: u16, h: u16, align: Align, direction: Direction) -> Vec<String> {
    let mut lines: Vec<String> = raw.lines().map(|l| fit_to_width(l, w as usize, cross_align(align, direction))).collect();
    if lines.is_empty() {
        lines.push(" ".repeat(w as usize));
    }
    let h = h as usize;
    if lines.len() > h {
        lines.truncate(h);
    } else if lines.len() < h {
        let blank = " ".repeat(w as usize);
        let missing = h - lines.len();
        match align {
            Align::Start => lines.extend(std::iter::repeat(blank).take(missing)),
            Align::End => {
                let mut padded = vec![blank.clone(); missing];
                padded.extend(lines);
                lines = padded;
            }
            Align::Center => {
                let top = missing / 2;
                let bottom = missing - top;
                let mut padded = vec![blank.clone(); top];
                padded.extend(lines);
                padded.extend(vec![blank; bottom]);
                lines = padded;
            }
        }
    }
    lines.into_iter().map(|l| pad_to_width(&l, w as usize)).collect()
}

/// Rows never use `align` on the main axis (horizontal); it is cross-axis
/// only there. In columns, `align` governs both cross (width fit, always
/// start since width is fully allocated) and main axis (vertical line
/// padding).
fn cross_align(align: Align, direction: Direction) -> Align {
    match direction {
        Direction::Row => align,
        Direction::Column => Align::Start,
    }
}

/// Round a Taffy-computed extent to the nearest whole cell, clamping to
/// `u16`'s range.
fn round_size(value: f32) -> u16 {
    if value < 0.0 {
        0
    } else if value > f32::from(u16::MAX) {
        u16::MAX
    } else {
        value.round() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basis_plus_flex_row() {
        let container = Container::new(Direction::Row, 20, 1);
        let children = vec![
            Child::new(Content::fixed("AAAAA")).basis(5),
            Child::new(Content::measured(|w, _h| "B".repeat(w as usize))).flex(1),
        ];
        let out = container.render(&children);
        assert_eq!(out, "AAAAABBBBBBBBBBBBBBB");
    }

    #[test]
    fn allocation_never_exceeds_container() {
        let container = Container::new(Direction::Row, 10, 1).gap(1);
        let children = vec![
            Child::new(Content::fixed("hello world")).flex(1),
            Child::new(Content::fixed("x")).flex(1),
            Child::new(Content::fixed("y")).flex(1),
        ];
        let allocs = container.allocate(&children);
        let total: u32 = allocs.iter().map(|&a| a as u32).sum::<u32>()
            + container.gap as u32 * (children.len() as u32 - 1);
        assert!(total <= container.width as u32);
    }

    #[test]
    fn residue_stays_unassigned_not_growing_children() {
        let container = Container::new(Direction::Row, 10, 1);
        let children = vec![Child::new(Content::fixed("ab")).basis(2)];
        let out = container.render(&children);
        assert_eq!(out, "ab        ");
    }

    #[test]
    fn column_stack_with_gap() {
        let container = Container::new(Direction::Column, 3, 5).gap(1);
        let children = vec![
            Child::new(Content::fixed("a")).basis(1),
            Child::new(Content::fixed("b")).basis(1),
        ];
        let out = container.render(&children);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "a  ");
        assert_eq!(lines[1], "   ");
        assert_eq!(lines[2], "b  ");
    }

    #[test]
    fn clamps_basis_by_min_max() {
        let container = Container::new(Direction::Row, 20, 1);
        let children = vec![Child::new(Content::fixed("a")).basis(2).min_size(5)];
        let allocs = container.allocate(&children);
        assert_eq!(allocs[0], 5);
    }
}
