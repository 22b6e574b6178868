//! Per-frame narrow phase over the quadtree.

use crate::entities::{Body, EntityId, Tag};
use crate::geometry::Rect;
use crate::quadtree::{Bounded, QuadTree};

/// Snapshot of one live entity taken when the index is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub id: EntityId,
    pub rect: Rect,
    pub tag: Tag,
    pub collides_with: Option<Tag>,
}

impl Collider {
    pub fn new(id: EntityId, body: &Body) -> Self {
        Self {
            id,
            rect: body.rect,
            tag: body.tag,
            collides_with: body.collides_with,
        }
    }

    /// `self` declares interest in `other`'s tag and their boxes overlap.
    pub fn hits(&self, other: &Collider) -> bool {
        self.collides_with == Some(other.tag) && self.rect.intersects(&other.rect)
    }
}

impl Bounded for Collider {
    fn rect(&self) -> Rect {
        self.rect
    }
}

/// `first` declared the match; both sides get flagged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionPair {
    pub first: EntityId,
    pub second: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Only the quadrant path the collider would be inserted along.
    #[default]
    InsertionPath,
    /// Every quadrant the collider's box reaches.
    Exhaustive,
}

/// Reuses its buffers across frames.
#[derive(Debug, Default)]
pub struct CollisionResolver {
    pub mode: QueryMode,
    everything: Vec<Collider>,
    candidates: Vec<Collider>,
    pairs: Vec<CollisionPair>,
}

impl CollisionResolver {
    pub fn new(mode: QueryMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Test every stored collider against its candidates. A pair is reported
    /// once per direction that matches, so mutual declarations show up twice.
    pub fn resolve(&mut self, index: &QuadTree<Collider>) -> &[CollisionPair] {
        self.everything.clear();
        self.pairs.clear();
        index.collect_all(&mut self.everything);

        for a in &self.everything {
            self.candidates.clear();
            match self.mode {
                QueryMode::InsertionPath => index.find_objects(a, &mut self.candidates),
                QueryMode::Exhaustive => index.query_region(&a.rect, &mut self.candidates),
            }
            for b in &self.candidates {
                if a.id != b.id && a.hits(b) {
                    self.pairs.push(CollisionPair {
                        first: a.id,
                        second: b.id,
                    });
                }
            }
        }

        tracing::trace!(
            colliders = self.everything.len(),
            pairs = self.pairs.len(),
            "collision pass"
        );
        &self.pairs
    }

    pub fn pairs(&self) -> &[CollisionPair] {
        &self.pairs
    }
}
