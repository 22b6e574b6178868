//! Simulation tuning, loaded once at startup from TOML.
//!
//! Every section falls back to its defaults, so a config file only needs
//! to name the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::geometry::Rect;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub quadtree: QuadTreeConfig,
    pub player: PlayerConfig,
    pub projectiles: ProjectileConfig,
    pub enemies: EnemyConfig,
    pub intro: IntroConfig,
    pub session: SessionConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadTreeConfig {
    /// Direct objects a node holds before it tries to subdivide.
    pub max_objects: usize,
    /// Depth at which a node becomes a permanent leaf.
    pub max_levels: u32,
    /// Query every quadrant a collider could overlap instead of only the
    /// quadrant it would be inserted into.
    pub exhaustive_queries: bool,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_objects: 10,
            max_levels: 5,
            exhaustive_queries: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub max_life: i32,
    /// Frames between shots.
    pub fire_rate: u32,
    /// Frames after a hit during which further contact costs no life.
    pub invulnerability_frames: u32,
    pub shot_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 64.0,
            height: 48.0,
            speed: 3.0,
            max_life: 10,
            fire_rate: 30,
            invulnerability_frames: 15,
            shot_capacity: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 16.0,
            speed: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Number of enemies kept on the field at all times.
    pub roster: usize,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub fire_rate: u32,
    pub shot_capacity: usize,
    /// Probability that a respawned enemy is an Oriel rather than a Laura.
    pub oriel_chance: f64,
    pub oriel_score: u32,
    pub laura_score: u32,
    pub spawn_x_min: f32,
    pub spawn_x_max: f32,
    pub spawn_y_min: f32,
    pub spawn_y_max: f32,
    /// Upper bound (exclusive) on the frames an Oriel keeps its heading.
    pub turn_interval_max: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            roster: 10,
            width: 32.0,
            height: 32.0,
            speed: 1.0,
            fire_rate: 15,
            shot_capacity: 2,
            oriel_chance: 0.4,
            oriel_score: 100,
            laura_score: 50,
            spawn_x_min: 50.0,
            spawn_x_max: 600.0,
            spawn_y_min: 50.0,
            spawn_y_max: 200.0,
            turn_interval_max: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// One letter entity per character.
    pub glyphs: String,
    pub origin_x: f32,
    pub origin_y: f32,
    pub glyph_size: f32,
    pub spacing: f32,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            glyphs: "start".to_string(),
            origin_x: 150.0,
            origin_y: 150.0,
            glyph_size: 64.0,
            spacing: 72.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Kills per multiplier step.
    pub streak_step: u32,
    /// Frames the game-over screen ignores the restart action.
    pub game_over_lock: u32,
    pub frame_millis: u64,
    /// Most simulation steps run for a single host tick.
    pub max_catch_up: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            streak_step: 10,
            game_over_lock: 80,
            frame_millis: 16,
            max_catch_up: 5,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn arena_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.arena.width, self.arena.height)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(msg: &str) -> Result<()> {
            Err(SimError::InvalidConfig(msg.to_string()))
        }

        if !self.arena_rect().is_well_formed() || self.arena.width <= 0.0 || self.arena.height <= 0.0
        {
            return invalid("arena must have a positive, finite size");
        }
        fn positive(v: f32) -> bool {
            v.is_finite() && v > 0.0
        }

        let p = &self.player;
        if !positive(p.width) || !positive(p.height) {
            return invalid("player size must be positive and finite");
        }
        if p.width > self.arena.width || p.height > self.arena.height {
            return invalid("player must fit inside the arena");
        }
        let shot = &self.projectiles;
        if !positive(shot.width) || !positive(shot.height) {
            return invalid("projectile size must be positive and finite");
        }
        let e = &self.enemies;
        if !positive(e.width) || !positive(e.height) {
            return invalid("enemy size must be positive and finite");
        }
        if ![p.speed, shot.speed, e.speed].iter().all(|v| v.is_finite()) {
            return invalid("speeds must be finite");
        }
        if ![e.spawn_x_min, e.spawn_x_max, e.spawn_y_min, e.spawn_y_max]
            .iter()
            .all(|v| v.is_finite())
        {
            return invalid("enemy spawn ranges must be finite");
        }
        let intro = &self.intro;
        if ![intro.origin_x, intro.origin_y, intro.spacing]
            .iter()
            .all(|v| v.is_finite())
            || !positive(intro.glyph_size)
        {
            return invalid("intro geometry must be finite with a positive glyph size");
        }
        if self.quadtree.max_objects == 0 {
            return invalid("quadtree.max_objects must be at least 1");
        }
        if self.player.shot_capacity == 0 {
            return invalid("player.shot_capacity must be at least 1");
        }
        // Lauras fire in pairs.
        if self.enemies.shot_capacity < 2 {
            return invalid("enemies.shot_capacity must be at least 2");
        }
        if self.player.max_life <= 0 {
            return invalid("player.max_life must be positive");
        }
        if !(0.0..=1.0).contains(&self.enemies.oriel_chance) {
            return invalid("enemies.oriel_chance must lie in [0, 1]");
        }
        if self.enemies.spawn_x_min >= self.enemies.spawn_x_max
            || self.enemies.spawn_y_min >= self.enemies.spawn_y_max
        {
            return invalid("enemy spawn ranges must be non-empty");
        }
        if self.enemies.turn_interval_max == 0 {
            return invalid("enemies.turn_interval_max must be at least 1");
        }
        if self.session.streak_step == 0 {
            return invalid("session.streak_step must be at least 1");
        }
        if self.session.frame_millis == 0 {
            return invalid("session.frame_millis must be at least 1");
        }
        Ok(())
    }
}
