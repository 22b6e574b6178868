/// Session state and the per-frame simulation step.
///
/// A `GameSession` is built once per run and passed by reference to
/// everything that needs it. `tick` advances it by exactly one frame; all
/// randomness comes through the injected RNG so tests can seed it.

use std::fmt;

use rand::Rng;

use crate::collision::{Collider, CollisionResolver, QueryMode};
use crate::config::SimConfig;
use crate::entities::{Catapult, Contact, Enemy, EnemyKind, Entity, EntityId, Letter};
use crate::error::Result;
use crate::geometry::Rect;
use crate::input::InputState;
use crate::quadtree::QuadTree;
use crate::render::Hud;

// ── States & events ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Title formation on screen, waiting to be shot down.
    Intro,
    Playing,
    GameOver,
}

impl GameState {
    pub fn name(self) -> &'static str {
        match self {
            GameState::Intro => "intro",
            GameState::Playing => "playing",
            GameState::GameOver => "game_over",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrete notifications for audio and other observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    EnteredState(GameState),
    EnemyDestroyed { kind: EnemyKind, points: u64 },
    PlayerHit { life: i32 },
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Score with a global kill-streak multiplier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u64,
    /// Kills since the streak last reset.
    pub kills: u64,
    pub streak_step: u64,
}

impl Scoreboard {
    pub fn new(streak_step: u32) -> Self {
        Self {
            score: 0,
            kills: 0,
            streak_step: u64::from(streak_step.max(1)),
        }
    }

    pub fn multiplier(&self) -> u64 {
        1 + self.kills / self.streak_step
    }

    /// Award `base * multiplier` using the streak before this kill, then count it.
    pub fn record_kill(&mut self, base: u32) -> u64 {
        let points = u64::from(base) * self.multiplier();
        self.kills += 1;
        self.score += points;
        points
    }

    pub fn reset_streak(&mut self) {
        self.kills = 0;
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.kills = 0;
    }
}

// ── Enemy roster ─────────────────────────────────────────────────────────────

/// Fixed-size enemy roster. A dead member is scored and respawned in place.
#[derive(Clone, Debug)]
pub struct Squad {
    pub members: Vec<Enemy>,
    next_serial: u64,
}

impl Squad {
    pub fn new(cfg: &SimConfig, rng: &mut impl Rng) -> Self {
        let mut squad = Self {
            members: Vec::with_capacity(cfg.enemies.roster),
            next_serial: 0,
        };
        squad.populate(cfg, rng);
        squad
    }

    pub fn populate(&mut self, cfg: &SimConfig, rng: &mut impl Rng) {
        self.members.clear();
        for _ in 0..cfg.enemies.roster {
            let serial = self.take_serial();
            self.members.push(Enemy::spawn(serial, cfg, rng));
        }
    }

    fn take_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    pub fn get_mut(&mut self, serial: u64) -> Option<&mut Enemy> {
        self.members.iter_mut().find(|e| e.serial == serial)
    }

    pub fn live_count(&self) -> usize {
        self.members.iter().filter(|e| e.body.alive).count()
    }

    /// Move every live enemy, then advance its shots.
    pub fn advance(&mut self, arena: &Rect, target: &Rect, cfg: &SimConfig, rng: &mut impl Rng) {
        for enemy in self.members.iter_mut().filter(|e| e.body.alive) {
            enemy.advance(arena, target, cfg.enemies.turn_interval_max, rng);
            enemy.shots.advance(arena);
        }
    }

    /// Score each dead member and respawn it as a new enemy.
    pub fn recycle(
        &mut self,
        scoreboard: &mut Scoreboard,
        events: &mut Vec<GameEvent>,
        cfg: &SimConfig,
        rng: &mut impl Rng,
    ) {
        for i in 0..self.members.len() {
            if self.members[i].body.alive {
                continue;
            }
            let kind = self.members[i].kind;
            let points = scoreboard.record_kill(self.members[i].score);
            tracing::debug!(?kind, points, score = scoreboard.score, "enemy destroyed");
            events.push(GameEvent::EnemyDestroyed { kind, points });

            let serial = self.take_serial();
            self.members[i].respawn(serial, cfg, rng);
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────────

/// Everything one run of the game owns.
#[derive(Debug)]
pub struct GameSession {
    pub config: SimConfig,
    pub arena: Rect,
    pub state: GameState,
    pub frame: u64,
    pub player: Catapult,
    pub squad: Squad,
    pub letters: Vec<Letter>,
    pub scoreboard: Scoreboard,
    /// Frames spent on the game-over screen.
    pub over_counter: u32,
    index: QuadTree<Collider>,
    resolver: CollisionResolver,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Validate `config` and build a session sitting on the intro screen.
    pub fn new(config: SimConfig, rng: &mut impl Rng) -> Result<Self> {
        config.validate()?;
        let arena = config.arena_rect();
        let mode = if config.quadtree.exhaustive_queries {
            QueryMode::Exhaustive
        } else {
            QueryMode::InsertionPath
        };
        let session = Self {
            arena,
            state: GameState::Intro,
            frame: 0,
            player: Catapult::new(&config),
            squad: Squad::new(&config, rng),
            letters: Letter::formation(&config.intro),
            scoreboard: Scoreboard::new(config.session.streak_step),
            over_counter: 0,
            index: QuadTree::new(arena, &config.quadtree),
            resolver: CollisionResolver::new(mode),
            events: Vec::new(),
            config,
        };
        tracing::info!(
            width = arena.width,
            height = arena.height,
            enemies = session.squad.members.len(),
            "session created"
        );
        Ok(session)
    }

    /// The broad-phase index as built by the last tick.
    pub fn index(&self) -> &QuadTree<Collider> {
        &self.index
    }

    /// Events produced by the last tick.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.scoreboard.score,
            multiplier: self.scoreboard.multiplier(),
            life: self.player.life,
            max_life: self.player.max_life,
            rice_ready: self.player.shots.free_count(),
        }
    }

    fn enter(&mut self, state: GameState) {
        tracing::info!(from = %self.state, to = %state, frame = self.frame, "state transition");
        self.state = state;
        self.events.push(GameEvent::EnteredState(state));
    }

    /// Wipe score, player and enemies and go straight back into play.
    pub fn restart(&mut self, rng: &mut impl Rng) {
        self.scoreboard.reset();
        self.player.reset(&self.arena);
        self.squad.populate(&self.config, rng);
        self.letters.clear();
        self.over_counter = 0;
        self.enter(GameState::Playing);
    }

    /// Rebuild the index from the live colliders of the current state and
    /// flag every entity that takes part in a matching pair.
    fn detect_collisions(&mut self) -> Result<()> {
        self.index.clear();

        if self.state == GameState::Playing && self.player.body.alive {
            self.index
                .insert(Collider::new(EntityId::Catapult, &self.player.body))?;
        }
        self.index.insert_all(
            self.player
                .shots
                .live_members()
                .map(|(key, rice)| Collider::new(EntityId::Rice(key), rice.body())),
        )?;

        match self.state {
            GameState::Intro => {
                self.index.insert_all(
                    self.letters
                        .iter()
                        .filter(|l| l.body.alive)
                        .map(|l| Collider::new(EntityId::Letter(l.index), &l.body)),
                )?;
            }
            GameState::Playing => {
                for enemy in &self.squad.members {
                    let serial = enemy.serial;
                    self.index
                        .insert_all(enemy.shots.live_members().map(|(slot, shot)| {
                            Collider::new(EntityId::EnemyShot { enemy: serial, slot }, shot.body())
                        }))?;
                }
                self.index.insert_all(
                    self.squad
                        .members
                        .iter()
                        .filter(|e| e.body.alive)
                        .map(|e| Collider::new(EntityId::Enemy(e.serial), &e.body)),
                )?;
            }
            GameState::GameOver => {}
        }

        let pairs = self.resolver.resolve(&self.index);
        for pair in pairs {
            for id in [pair.first, pair.second] {
                flag(&mut self.player, &mut self.squad, &mut self.letters, id);
            }
        }
        Ok(())
    }
}

fn flag(
    player: &mut Catapult,
    squad: &mut Squad,
    letters: &mut [Letter],
    id: EntityId,
) {
    let body = match id {
        EntityId::Catapult => Some(&mut player.body),
        EntityId::Rice(key) => player.shots.get_mut(key).map(|p| &mut p.body),
        EntityId::Enemy(serial) => squad.get_mut(serial).map(|e| &mut e.body),
        EntityId::EnemyShot { enemy, slot } => squad
            .get_mut(enemy)
            .and_then(|e| e.shots.get_mut(slot))
            .map(|p| &mut p.body),
        EntityId::Letter(index) => letters
            .iter_mut()
            .find(|l| l.index == index)
            .map(|l| &mut l.body),
    };
    if let Some(body) = body {
        body.is_colliding = true;
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the session by one frame and return the events it produced.
///
/// Order inside a frame: rebuild index → resolve collisions → entity
/// updates (which consume the collision flags) → recycling → state
/// transition. A malformed entity aborts the frame with an error.
pub fn tick<'a>(
    session: &'a mut GameSession,
    input: &InputState,
    rng: &mut impl Rng,
) -> Result<&'a [GameEvent]> {
    session.events.clear();
    session.frame += 1;

    match session.state {
        GameState::Intro => tick_intro(session, input)?,
        GameState::Playing => tick_playing(session, input, rng)?,
        GameState::GameOver => tick_game_over(session, input, rng),
    }

    Ok(&session.events)
}

fn update_player(session: &mut GameSession, input: &InputState) {
    let arena = session.arena;
    session.player.steer(input);
    match session.player.advance(&arena) {
        Contact::None => {}
        Contact::Grazed => session.scoreboard.reset_streak(),
        Contact::Damaged => {
            session.scoreboard.reset_streak();
            let life = session.player.life;
            tracing::debug!(life, "player hit");
            session.events.push(GameEvent::PlayerHit { life });
        }
    }
    session.player.shots.advance(&arena);
    if input.fire {
        session.player.fire();
    }
}

fn tick_intro(session: &mut GameSession, input: &InputState) -> Result<()> {
    session.detect_collisions()?;

    for letter in &mut session.letters {
        letter.advance();
    }
    update_player(session, input);
    session.letters.retain(|l| l.body.alive);

    if session.letters.is_empty() {
        let arena = session.arena;
        session.player.reset(&arena);
        session.scoreboard.reset();
        session.enter(GameState::Playing);
    }
    Ok(())
}

fn tick_playing(session: &mut GameSession, input: &InputState, rng: &mut impl Rng) -> Result<()> {
    session.detect_collisions()?;

    let arena = session.arena;
    let target = session.player.body.rect;
    session.squad.advance(&arena, &target, &session.config, rng);
    update_player(session, input);

    session.squad.recycle(
        &mut session.scoreboard,
        &mut session.events,
        &session.config,
        rng,
    );

    if session.player.is_dead {
        session.over_counter = 0;
        session.enter(GameState::GameOver);
    }
    Ok(())
}

fn tick_game_over(session: &mut GameSession, input: &InputState, rng: &mut impl Rng) {
    session.over_counter = session.over_counter.saturating_add(1);
    if session.over_counter > session.config.session.game_over_lock && input.restart {
        tracing::info!(final_score = session.scoreboard.score, "restarting session");
        session.restart(rng);
    }
}
