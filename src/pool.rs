//! Fixed-capacity recycling container.
//!
//! Every entity is built once when the pool is initialized and afterwards
//! only toggled between spawned and cleared. Slots are kept in
//! most-recently-used order: an acquire takes the tail slot and moves it to
//! the head, a retirement moves the slot back to the tail. A saturated pool
//! silently ignores acquire requests.

use crate::entities::Entity;
use crate::geometry::Rect;

/// An entity that can live in a [`Pool`].
pub trait Poolable: Entity + Clone {
    /// Bring a dormant entity to life at `(x, y)`.
    fn spawn(&mut self, x: f32, y: f32);

    /// Return the entity to its dormant state.
    fn clear(&mut self);

    /// Run one frame of the entity's own update. Returns `true` when the
    /// entity should be retired (collided, left the arena, ...).
    fn advance(&mut self, arena: &Rect) -> bool;
}

#[derive(Clone, Debug)]
struct Slot<P> {
    /// Stable identity of the slot, independent of its position in the ordering.
    key: usize,
    entity: P,
}

#[derive(Clone, Debug)]
pub struct Pool<P> {
    slots: Vec<Slot<P>>,
}

impl<P: Poolable> Pool<P> {
    /// Fill a pool with `capacity` dormant copies of `prototype`.
    pub fn initialize(prototype: P, capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|key| {
                let mut entity = prototype.clone();
                entity.clear();
                Slot { key, entity }
            })
            .collect();
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.entity.body().alive).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.live_count()
    }

    /// Spawn the tail slot at `(x, y)` if it is dormant. Returns whether a
    /// spawn happened; a saturated pool drops the request.
    pub fn acquire_one(&mut self, x: f32, y: f32) -> bool {
        let Some(tail) = self.slots.last_mut() else {
            return false;
        };
        if tail.entity.body().alive {
            tracing::trace!("pool saturated, dropping spawn at ({x}, {y})");
            return false;
        }
        tail.entity.spawn(x, y);
        self.slots.rotate_right(1);
        true
    }

    /// Spawn two entities at once, or none: both tail-most slots must be dormant.
    pub fn acquire_pair(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> bool {
        let len = self.slots.len();
        if len < 2 {
            return false;
        }
        let both_free = self.slots[len - 2..]
            .iter()
            .all(|s| !s.entity.body().alive);
        if !both_free {
            tracing::trace!("pool saturated, dropping paired spawn");
            return false;
        }
        self.acquire_one(x1, y1) && self.acquire_one(x2, y2)
    }

    /// Currently alive entities with their slot keys.
    pub fn live_members(&self) -> impl Iterator<Item = (usize, &P)> + '_ {
        self.slots
            .iter()
            .filter(|s| s.entity.body().alive)
            .map(|s| (s.key, &s.entity))
    }

    pub fn get(&self, key: usize) -> Option<&P> {
        self.slots.iter().find(|s| s.key == key).map(|s| &s.entity)
    }

    pub fn get_mut(&mut self, key: usize) -> Option<&mut P> {
        self.slots
            .iter_mut()
            .find(|s| s.key == key)
            .map(|s| &mut s.entity)
    }

    /// Update every alive member once. Members whose update asks for
    /// retirement are cleared and moved to the tail so the next acquire
    /// reuses them. Returns the number retired this frame.
    pub fn advance(&mut self, arena: &Rect) -> usize {
        let mut retired = 0;
        let mut i = 0;
        // Each slot is visited exactly once even though retirement reorders them.
        for _ in 0..self.slots.len() {
            let slot = &mut self.slots[i];
            if slot.entity.body().alive && slot.entity.advance(arena) {
                slot.entity.clear();
                let slot = self.slots.remove(i);
                self.slots.push(slot);
                retired += 1;
            } else {
                i += 1;
            }
        }
        retired
    }

    /// Clear every member without touching the ordering.
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.entity.clear();
        }
    }

    /// Replace every member with a dormant copy of `prototype`, keeping the
    /// slot keys. Used when the owner changes what it fires.
    pub fn refill(&mut self, prototype: &P) {
        for slot in &mut self.slots {
            slot.entity = prototype.clone();
            slot.entity.clear();
        }
    }
}
