//! Region quadtree used as a disposable per-frame broad phase.
//!
//! Quadrants are numbered as below:
//!
//! ```text
//!      |
//!   1  |  0
//! -----+-----
//!   2  |  3
//!      |
//! ```
//!
//! An object is pushed down only when it fits strictly inside one quadrant;
//! anything straddling a midline stays at the node where it was inserted.

use crate::config::QuadTreeConfig;
use crate::error::{Result, SimError};
use crate::geometry::Rect;

/// Anything the tree can place.
pub trait Bounded {
    fn rect(&self) -> Rect;
}

impl Bounded for Rect {
    fn rect(&self) -> Rect {
        *self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast = 0,
    NorthWest = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    /// Which single quadrant of `bounds` strictly contains `rect`, if any.
    pub fn of(bounds: &Rect, rect: &Rect) -> Option<Quadrant> {
        let vertical_mid = bounds.x + bounds.width / 2.0;
        let horizontal_mid = bounds.y + bounds.height / 2.0;

        let top = rect.y < horizontal_mid && rect.bottom() < horizontal_mid;
        let bottom = rect.y > horizontal_mid;

        if rect.x < vertical_mid && rect.right() < vertical_mid {
            if top {
                Some(Quadrant::NorthWest)
            } else if bottom {
                Some(Quadrant::SouthWest)
            } else {
                None
            }
        } else if rect.x > vertical_mid {
            if top {
                Some(Quadrant::NorthEast)
            } else if bottom {
                Some(Quadrant::SouthEast)
            } else {
                None
            }
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuadTree<T> {
    bounds: Rect,
    level: u32,
    max_objects: usize,
    max_levels: u32,
    objects: Vec<T>,
    nodes: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Bounded + Clone> QuadTree<T> {
    pub fn new(bounds: Rect, cfg: &QuadTreeConfig) -> Self {
        Self::with_level(bounds, 0, cfg.max_objects, cfg.max_levels)
    }

    fn with_level(bounds: Rect, level: u32, max_objects: usize, max_levels: u32) -> Self {
        Self {
            bounds,
            level,
            max_objects,
            max_levels,
            objects: Vec::new(),
            nodes: None,
        }
    }

    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Distance from the root.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    /// Objects stored directly on this node.
    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// The four children in quadrant order, if this node has split.
    pub fn nodes(&self) -> Option<&[QuadTree<T>; 4]> {
        self.nodes.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.nodes.is_none()
    }

    /// Total objects stored in this subtree.
    pub fn len(&self) -> usize {
        self.objects.len()
            + self
                .nodes
                .iter()
                .flat_map(|nodes| nodes.iter())
                .map(|node| node.len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every object and every child, leaving a single empty leaf.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.nodes = None;
    }

    /// Insert one object. Malformed geometry is rejected before the tree is touched.
    pub fn insert(&mut self, obj: T) -> Result<()> {
        let rect = obj.rect();
        if !rect.is_well_formed() {
            return Err(SimError::MalformedEntity {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }
        self.place(obj);
        Ok(())
    }

    /// Insert a sequence in order. Stops at the first malformed object.
    pub fn insert_all(&mut self, objs: impl IntoIterator<Item = T>) -> Result<()> {
        for obj in objs {
            self.insert(obj)?;
        }
        Ok(())
    }

    fn place(&mut self, obj: T) {
        if let Some(nodes) = self.nodes.as_mut() {
            if let Some(q) = Quadrant::of(&self.bounds, &obj.rect()) {
                nodes[q as usize].place(obj);
                return;
            }
        }

        self.objects.push(obj);

        if self.objects.len() > self.max_objects && self.level < self.max_levels {
            if self.nodes.is_none() {
                self.split();
            }
            let bounds = self.bounds;
            if let Some(nodes) = self.nodes.as_mut() {
                let mut i = 0;
                while i < self.objects.len() {
                    match Quadrant::of(&bounds, &self.objects[i].rect()) {
                        Some(q) => {
                            let moved = self.objects.remove(i);
                            nodes[q as usize].place(moved);
                        }
                        None => i += 1,
                    }
                }
            }
        }
    }

    /// Children use truncated half extents, so odd sizes lose a unit at the far edge.
    fn split(&mut self) {
        let sub_width = (self.bounds.width / 2.0).trunc();
        let sub_height = (self.bounds.height / 2.0).trunc();
        let Rect { x, y, .. } = self.bounds;
        let level = self.level + 1;
        let child = |cx: f32, cy: f32| {
            QuadTree::with_level(
                Rect::new(cx, cy, sub_width, sub_height),
                level,
                self.max_objects,
                self.max_levels,
            )
        };

        self.nodes = Some(Box::new([
            child(x + sub_width, y),
            child(x, y),
            child(x, y + sub_height),
            child(x + sub_width, y + sub_height),
        ]));
        tracing::trace!(level, "quadtree node split");
    }

    /// Append every object stored anywhere in the tree, children first.
    pub fn collect_all(&self, out: &mut Vec<T>) {
        if let Some(nodes) = &self.nodes {
            for node in nodes.iter() {
                node.collect_all(out);
            }
        }
        out.extend(self.objects.iter().cloned());
    }

    /// Append the objects `obj` could collide with: everything stored along
    /// the path to the quadrant `obj` itself would be inserted into. Objects
    /// stored in sibling quadrants are not visited, even when they overlap
    /// `obj` across a midline.
    pub fn find_objects(&self, obj: &T, out: &mut Vec<T>) {
        let rect = obj.rect();
        if !rect.is_well_formed() {
            tracing::warn!(?rect, "candidate query with malformed geometry ignored");
            return;
        }
        self.find_along_path(&rect, out);
    }

    fn find_along_path(&self, rect: &Rect, out: &mut Vec<T>) {
        if let Some(nodes) = &self.nodes {
            if let Some(q) = Quadrant::of(&self.bounds, rect) {
                nodes[q as usize].find_along_path(rect, out);
            }
        }
        out.extend(self.objects.iter().cloned());
    }

    /// Convenience wrapper around [`QuadTree::find_objects`].
    pub fn candidates(&self, obj: &T) -> Vec<T> {
        let mut out = Vec::new();
        self.find_objects(obj, &mut out);
        out
    }

    /// Append every stored object that could overlap `rect`, visiting each
    /// child whose side of the midlines `rect` reaches.
    pub fn query_region(&self, rect: &Rect, out: &mut Vec<T>) {
        if !rect.is_well_formed() {
            tracing::warn!(?rect, "region query with malformed geometry ignored");
            return;
        }
        self.query_region_inner(rect, out);
    }

    fn query_region_inner(&self, rect: &Rect, out: &mut Vec<T>) {
        if let Some(nodes) = &self.nodes {
            let vertical_mid = self.bounds.x + self.bounds.width / 2.0;
            let horizontal_mid = self.bounds.y + self.bounds.height / 2.0;
            // Children only hold objects strictly on one side of each midline.
            let west = rect.x < vertical_mid;
            let east = rect.right() > vertical_mid;
            let north = rect.y < horizontal_mid;
            let south = rect.bottom() > horizontal_mid;

            let reach = [east && north, west && north, west && south, east && south];
            for (node, reached) in nodes.iter().zip(reach) {
                if reached {
                    node.query_region_inner(rect, out);
                }
            }
        }
        out.extend(self.objects.iter().cloned());
    }
}
