/// Game entities: shared body state plus the per-variant update rules.
///
/// Each variant embeds a [`Body`] and exposes it through the [`Entity`]
/// capability. Timers that drive AI and fire rate are plain fields mutated
/// by the update methods.

use rand::Rng;

use crate::config::{EnemyConfig, IntroConfig, PlayerConfig, ProjectileConfig, SimConfig};
use crate::geometry::Rect;
use crate::input::InputState;
use crate::pool::{Pool, Poolable};
use crate::render::Sprite;

// ── Identity ─────────────────────────────────────────────────────────────────

/// What an entity is, and what another entity may declare it collides with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Catapult,
    Enemy,
    Rice,
    EnemyShot,
}

/// Stable handle used by the collision pass to flag entities after the
/// index has been discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityId {
    Catapult,
    /// Player projectile by pool slot key.
    Rice(usize),
    /// Enemy by spawn serial.
    Enemy(u64),
    EnemyShot { enemy: u64, slot: usize },
    Letter(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub rect: Rect,
    pub vx: f32,
    pub vy: f32,
    pub tag: Tag,
    pub collides_with: Option<Tag>,
    pub alive: bool,
    /// Set by the collision pass, consumed by the entity's own update.
    pub is_colliding: bool,
}

impl Body {
    pub fn new(rect: Rect, tag: Tag, collides_with: Option<Tag>) -> Self {
        Self {
            rect,
            vx: 0.0,
            vy: 0.0,
            tag,
            collides_with,
            alive: true,
            is_colliding: false,
        }
    }
}

pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn sprite(&self) -> Sprite;
}

// ── Projectiles ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    /// Thrown by the catapult, travels up.
    Rice,
    /// Fired by an Oriel, travels down.
    Note,
    /// Fired in pairs by a Laura, travels down.
    Laser,
}

impl ProjectileKind {
    fn tag(self) -> Tag {
        match self {
            ProjectileKind::Rice => Tag::Rice,
            ProjectileKind::Note | ProjectileKind::Laser => Tag::EnemyShot,
        }
    }

    fn target(self) -> Tag {
        match self {
            ProjectileKind::Rice => Tag::Enemy,
            ProjectileKind::Note | ProjectileKind::Laser => Tag::Catapult,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub body: Body,
    pub speed: f32,
}

impl Projectile {
    /// A dormant projectile, ready to be handed to [`Pool::initialize`].
    pub fn dormant(kind: ProjectileKind, cfg: &ProjectileConfig) -> Self {
        let mut body = Body::new(
            Rect::new(0.0, 0.0, cfg.width, cfg.height),
            kind.tag(),
            Some(kind.target()),
        );
        body.alive = false;
        body.vy = match kind {
            ProjectileKind::Rice => -cfg.speed,
            ProjectileKind::Note | ProjectileKind::Laser => cfg.speed,
        };
        Self {
            kind,
            body,
            speed: cfg.speed,
        }
    }
}

impl Entity for Projectile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn sprite(&self) -> Sprite {
        Sprite::Projectile(self.kind)
    }
}

impl Poolable for Projectile {
    fn spawn(&mut self, x: f32, y: f32) {
        self.body.rect.x = x;
        self.body.rect.y = y;
        self.body.alive = true;
    }

    fn clear(&mut self) {
        self.body.rect.x = 0.0;
        self.body.rect.y = 0.0;
        self.body.alive = false;
        self.body.is_colliding = false;
    }

    fn advance(&mut self, arena: &Rect) -> bool {
        self.body.rect.y += self.body.vy;
        if self.body.is_colliding {
            return true;
        }
        if self.body.vy < 0.0 {
            self.body.rect.y <= arena.y - self.body.rect.height
        } else {
            self.body.rect.y > arena.bottom()
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Result of one catapult update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Collided while invulnerable, no life lost.
    Grazed,
    /// Collided and lost one life.
    Damaged,
}

#[derive(Clone, Debug)]
pub struct Catapult {
    pub body: Body,
    pub speed: f32,
    pub life: i32,
    pub max_life: i32,
    pub is_dead: bool,
    pub fire_rate: u32,
    /// Frames since the last shot; ready to fire at `fire_rate`.
    pub fire_counter: u32,
    pub invulnerability_frames: u32,
    /// Frames since the last life lost.
    pub invulnerability_counter: u32,
    pub shot_width: f32,
    pub shot_height: f32,
    pub shots: Pool<Projectile>,
}

impl Catapult {
    pub fn new(cfg: &SimConfig) -> Self {
        let PlayerConfig {
            width,
            height,
            speed,
            max_life,
            fire_rate,
            invulnerability_frames,
            shot_capacity,
        } = cfg.player;
        let rice = Projectile::dormant(ProjectileKind::Rice, &cfg.projectiles);
        let mut catapult = Self {
            body: Body::new(
                Rect::new(0.0, 0.0, width, height),
                Tag::Catapult,
                Some(Tag::Enemy),
            ),
            speed,
            life: max_life,
            max_life,
            is_dead: false,
            fire_rate,
            fire_counter: fire_rate,
            invulnerability_frames,
            invulnerability_counter: 0,
            shot_width: cfg.projectiles.width,
            shot_height: cfg.projectiles.height,
            shots: Pool::initialize(rice, shot_capacity),
        };
        catapult.reset(&cfg.arena_rect());
        catapult
    }

    /// Full life, empty rice pool, parked at the bottom centre of the arena.
    pub fn reset(&mut self, arena: &Rect) {
        self.shots.clear_all();
        self.life = self.max_life;
        self.is_dead = false;
        self.fire_counter = self.fire_rate;
        self.invulnerability_counter = 0;
        self.body.alive = true;
        self.body.is_colliding = false;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.body.rect.x = arena.x + arena.width / 2.0 - self.body.rect.width / 2.0;
        self.body.rect.y = arena.bottom() - self.body.rect.height;
    }

    /// Turn held directions into velocity. Left wins over right, up over down.
    pub fn steer(&mut self, input: &InputState) {
        self.body.vx = if input.left {
            -self.speed
        } else if input.right {
            self.speed
        } else {
            0.0
        };
        self.body.vy = if input.up {
            -self.speed
        } else if input.down {
            self.speed
        } else {
            0.0
        };
    }

    pub fn is_reloaded(&self) -> bool {
        self.fire_counter >= self.fire_rate
    }

    /// Move, keep inside the arena, and consume this frame's collision flag.
    pub fn advance(&mut self, arena: &Rect) -> Contact {
        self.fire_counter = self.fire_counter.saturating_add(1);

        // Far edge first, so a catapult wider than the arena pins to its origin.
        let rect = &mut self.body.rect;
        rect.x = (rect.x + self.body.vx)
            .min(arena.right() - rect.width)
            .max(arena.x);
        rect.y = (rect.y + self.body.vy)
            .min(arena.bottom() - rect.height)
            .max(arena.y);

        if !self.body.is_colliding {
            self.invulnerability_counter = self.invulnerability_counter.saturating_add(1);
            return Contact::None;
        }

        let mut contact = Contact::Grazed;
        if !self.is_dead && self.invulnerability_counter >= self.invulnerability_frames {
            self.life -= 1;
            self.invulnerability_counter = 0;
            contact = Contact::Damaged;
        }
        if self.life <= 0 {
            self.is_dead = true;
            self.body.alive = false;
        } else {
            self.body.is_colliding = false;
        }
        contact
    }

    /// Throw one rice packet, centred horizontally and resting on the
    /// catapult's base. The cooldown restarts even when the pool is saturated.
    pub fn fire(&mut self) -> bool {
        if !self.is_reloaded() {
            return false;
        }
        self.fire_counter = 0;
        let x = self.body.rect.x + self.body.rect.width / 2.0 - self.shot_width / 2.0;
        let y = self.body.rect.bottom() - self.shot_height;
        self.shots.acquire_one(x, y)
    }
}

impl Entity for Catapult {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn sprite(&self) -> Sprite {
        Sprite::Catapult {
            reloaded: self.is_reloaded(),
        }
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    /// Diagonal drifter, single shots.
    Oriel,
    /// Side-to-side strafer, paired shots.
    Laura,
}

impl EnemyKind {
    pub fn shot_kind(self) -> ProjectileKind {
        match self {
            EnemyKind::Oriel => ProjectileKind::Note,
            EnemyKind::Laura => ProjectileKind::Laser,
        }
    }

    /// Base score before the streak multiplier.
    pub fn score(self, cfg: &EnemyConfig) -> u32 {
        match self {
            EnemyKind::Oriel => cfg.oriel_score,
            EnemyKind::Laura => cfg.laura_score,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub serial: u64,
    pub kind: EnemyKind,
    pub body: Body,
    pub score: u32,
    pub fire_rate: u32,
    /// Frames since the last volley; fires once it exceeds `fire_rate`.
    pub fire_cooldown: u32,
    /// Frames since the last heading change.
    pub direction_change_counter: u32,
    /// Frames to keep the current heading (Oriel only).
    pub direction_change_after: u32,
    pub shots: Pool<Projectile>,
}

impl Enemy {
    pub fn spawn(serial: u64, cfg: &SimConfig, rng: &mut impl Rng) -> Self {
        let kind = roll_kind(&cfg.enemies, rng);
        let prototype = Projectile::dormant(kind.shot_kind(), &cfg.projectiles);
        let mut enemy = Self {
            serial,
            kind,
            body: Body::new(Rect::default(), Tag::Enemy, Some(Tag::Rice)),
            score: 0,
            fire_rate: cfg.enemies.fire_rate,
            fire_cooldown: 0,
            direction_change_counter: 0,
            direction_change_after: 0,
            shots: Pool::initialize(prototype, cfg.enemies.shot_capacity),
        };
        enemy.place(kind, cfg, rng);
        enemy
    }

    /// Reuse this slot as a freshly rolled enemy. In-flight shots are dropped.
    pub fn respawn(&mut self, serial: u64, cfg: &SimConfig, rng: &mut impl Rng) {
        let kind = roll_kind(&cfg.enemies, rng);
        if kind != self.kind {
            self.shots
                .refill(&Projectile::dormant(kind.shot_kind(), &cfg.projectiles));
        } else {
            self.shots.clear_all();
        }
        self.serial = serial;
        self.place(kind, cfg, rng);
    }

    fn place(&mut self, kind: EnemyKind, cfg: &SimConfig, rng: &mut impl Rng) {
        let e = &cfg.enemies;
        let x = rng.gen_range(e.spawn_x_min..e.spawn_x_max);
        let y = match kind {
            EnemyKind::Laura => rng.gen_range(e.spawn_y_min..e.spawn_y_max),
            EnemyKind::Oriel => 0.0,
        };
        self.kind = kind;
        self.score = kind.score(e);
        self.body = Body::new(
            Rect::new(x, y, e.width, e.height),
            Tag::Enemy,
            Some(Tag::Rice),
        );
        self.body.vx = e.speed;
        self.body.vy = match kind {
            EnemyKind::Oriel => e.speed,
            EnemyKind::Laura => 0.0,
        };
        self.fire_cooldown = self.fire_rate;
        self.direction_change_counter = 0;
        self.direction_change_after = rng.gen_range(0..e.turn_interval_max);
    }

    /// One frame of movement and fire decisions. A colliding enemy dies
    /// instead of moving. `target` is the catapult's rectangle.
    pub fn advance(
        &mut self,
        arena: &Rect,
        target: &Rect,
        turn_interval_max: u32,
        rng: &mut impl Rng,
    ) {
        if self.body.is_colliding {
            self.body.alive = false;
            return;
        }

        let body = &mut self.body;
        body.rect.x += body.vx;
        body.rect.y += body.vy;

        if self.kind == EnemyKind::Oriel
            && self.direction_change_counter >= self.direction_change_after
        {
            body.vx = -body.vx;
            self.direction_change_counter = 0;
            self.direction_change_after = rng.gen_range(0..turn_interval_max);
        }

        if body.rect.x < arena.x {
            body.rect.x = arena.x;
            body.vx = -body.vx;
        } else if body.rect.right() >= arena.right() {
            body.rect.x = arena.right() - body.rect.width;
            body.vx = -body.vx;
        }

        // Oriels fall off the bottom and come back in from the top.
        if body.rect.y >= arena.bottom() {
            body.rect.y = arena.y - body.rect.height;
        }

        if body.rect.x >= target.x && body.rect.x <= target.right() {
            self.fire();
        }

        self.direction_change_counter += 1;
        self.fire_cooldown = self.fire_cooldown.saturating_add(1);
    }

    pub fn fire(&mut self) -> bool {
        if self.fire_cooldown <= self.fire_rate {
            return false;
        }
        self.fire_cooldown = 0;
        let Rect { x, y, .. } = self.body.rect;
        match self.kind {
            EnemyKind::Oriel => self.shots.acquire_one(x, y),
            EnemyKind::Laura => self.shots.acquire_pair(x + 5.0, y + 19.0, x + 15.0, y + 19.0),
        }
    }
}

fn roll_kind(cfg: &EnemyConfig, rng: &mut impl Rng) -> EnemyKind {
    if rng.gen_bool(cfg.oriel_chance) {
        EnemyKind::Oriel
    } else {
        EnemyKind::Laura
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn sprite(&self) -> Sprite {
        Sprite::Enemy(self.kind)
    }
}

// ── Intro title ──────────────────────────────────────────────────────────────

/// One glyph of the intro formation. Dies when hit by rice.
#[derive(Clone, Debug, PartialEq)]
pub struct Letter {
    pub index: usize,
    pub glyph: char,
    pub body: Body,
}

impl Letter {
    /// Lay the intro glyphs out left to right.
    pub fn formation(cfg: &IntroConfig) -> Vec<Letter> {
        cfg.glyphs
            .chars()
            .enumerate()
            .map(|(index, glyph)| Letter {
                index,
                glyph,
                body: Body::new(
                    Rect::new(
                        cfg.origin_x + index as f32 * cfg.spacing,
                        cfg.origin_y,
                        cfg.glyph_size,
                        cfg.glyph_size,
                    ),
                    Tag::Enemy,
                    Some(Tag::Rice),
                ),
            })
            .collect()
    }

    pub fn advance(&mut self) {
        if self.body.is_colliding {
            self.body.alive = false;
        }
    }
}

impl Entity for Letter {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn sprite(&self) -> Sprite {
        Sprite::Letter(self.glyph)
    }
}
