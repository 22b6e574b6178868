use rice_catapult::config::{IntroConfig, ProjectileConfig, SimConfig};
use rice_catapult::entities::*;
use rice_catapult::geometry::Rect;
use rice_catapult::input::{Action, InputState};
use rice_catapult::pool::Poolable;
use rice_catapult::render::Sprite;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn arena() -> Rect {
    Rect::new(0.0, 0.0, 640.0, 480.0)
}

fn config_with_oriel_chance(chance: f64) -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.enemies.oriel_chance = chance;
    cfg
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn input_set_and_query() {
    let mut input = InputState::default();
    input.set(Action::Fire, true);
    input.set(Action::Left, true);
    assert!(input.is_held(Action::Fire));
    assert!(input.is_held(Action::Left));
    assert!(!input.is_held(Action::Restart));
    input.set(Action::Fire, false);
    assert!(!input.fire);
}

// ── Catapult ──────────────────────────────────────────────────────────────────

#[test]
fn catapult_starts_bottom_centre() {
    let c = Catapult::new(&SimConfig::default());
    assert_eq!(c.body.rect, Rect::new(288.0, 432.0, 64.0, 48.0));
    assert_eq!(c.life, 10);
    assert!(c.is_reloaded());
    assert_eq!(c.shots.capacity(), 5);
    assert_eq!(c.sprite(), Sprite::Catapult { reloaded: true });
}

#[test]
fn steer_prefers_left_and_up() {
    let mut c = Catapult::new(&SimConfig::default());
    c.steer(&InputState {
        left: true,
        right: true,
        up: true,
        down: true,
        ..InputState::default()
    });
    assert_eq!(c.body.vx, -3.0);
    assert_eq!(c.body.vy, -3.0);
}

#[test]
fn catapult_is_clamped_to_arena() {
    let mut c = Catapult::new(&SimConfig::default());
    c.body.rect.x = 1.0;
    c.steer(&InputState {
        left: true,
        down: true,
        ..InputState::default()
    });
    c.advance(&arena());
    assert_eq!(c.body.rect.x, 0.0);
    assert_eq!(c.body.rect.y, 432.0);
}

#[test]
fn oversized_catapult_pins_to_arena_origin() {
    // Built without validation: the clamp alone must not panic
    let mut cfg = SimConfig::default();
    cfg.player.width = 700.0;
    cfg.player.height = 500.0;
    let mut c = Catapult::new(&cfg);
    c.steer(&InputState {
        right: true,
        ..InputState::default()
    });
    c.advance(&arena());
    assert_eq!(c.body.rect.x, 0.0);
    assert_eq!(c.body.rect.y, 0.0);
}

#[test]
fn fire_throws_from_centre_and_starts_cooldown() {
    let mut c = Catapult::new(&SimConfig::default());
    assert!(c.fire());
    let (_, rice) = c.shots.live_members().next().unwrap();
    assert_eq!(rice.body.rect.x, 312.0);
    assert_eq!(rice.body.rect.y, 464.0);
    assert!(!c.fire());
    assert_eq!(c.shots.live_count(), 1);
}

#[test]
fn fire_on_saturated_pool_still_restarts_cooldown() {
    let mut c = Catapult::new(&SimConfig::default());
    for _ in 0..5 {
        c.fire_counter = c.fire_rate;
        assert!(c.fire());
    }
    c.fire_counter = c.fire_rate;
    assert!(!c.fire());
    assert_eq!(c.fire_counter, 0);
    assert_eq!(c.shots.live_count(), 5);
}

#[test]
fn quiet_frame_builds_invulnerability_counter() {
    let mut c = Catapult::new(&SimConfig::default());
    assert_eq!(c.advance(&arena()), Contact::None);
    assert_eq!(c.invulnerability_counter, 1);
}

#[test]
fn reset_restores_life_and_empties_rice() {
    let mut c = Catapult::new(&SimConfig::default());
    c.fire();
    c.life = 0;
    c.is_dead = true;
    c.body.alive = false;
    c.reset(&arena());
    assert_eq!(c.life, 10);
    assert!(!c.is_dead);
    assert!(c.body.alive);
    assert_eq!(c.shots.live_count(), 0);
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[test]
fn rice_climbs_and_notes_fall() {
    let cfg = ProjectileConfig::default();
    let mut rice = Projectile::dormant(ProjectileKind::Rice, &cfg);
    let mut note = Projectile::dormant(ProjectileKind::Note, &cfg);
    rice.spawn(10.0, 100.0);
    note.spawn(10.0, 100.0);
    assert!(!rice.advance(&arena()));
    assert!(!note.advance(&arena()));
    assert_eq!(rice.body.rect.y, 98.0);
    assert_eq!(note.body.rect.y, 102.0);
}

#[test]
fn projectile_tags() {
    let cfg = ProjectileConfig::default();
    let rice = Projectile::dormant(ProjectileKind::Rice, &cfg);
    let laser = Projectile::dormant(ProjectileKind::Laser, &cfg);
    assert_eq!(rice.body.tag, Tag::Rice);
    assert_eq!(rice.body.collides_with, Some(Tag::Enemy));
    assert_eq!(laser.body.tag, Tag::EnemyShot);
    assert_eq!(laser.body.collides_with, Some(Tag::Catapult));
    assert!(!laser.body.alive);
}

#[test]
fn hostile_shot_retires_below_arena() {
    let mut laser = Projectile::dormant(ProjectileKind::Laser, &ProjectileConfig::default());
    laser.spawn(10.0, 479.0);
    assert!(laser.advance(&arena()));
}

#[test]
fn colliding_projectile_retires() {
    let mut rice = Projectile::dormant(ProjectileKind::Rice, &ProjectileConfig::default());
    rice.spawn(10.0, 100.0);
    rice.body.is_colliding = true;
    assert!(rice.advance(&arena()));
    rice.clear();
    assert!(!rice.body.alive);
    assert!(!rice.body.is_colliding);
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[test]
fn oriel_spawns_on_top_edge_and_drifts_diagonally() {
    let cfg = config_with_oriel_chance(1.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    assert_eq!(e.kind, EnemyKind::Oriel);
    assert_eq!(e.score, 100);
    assert_eq!(e.body.rect.y, 0.0);
    assert!((50.0..600.0).contains(&e.body.rect.x));

    let x0 = e.body.rect.x;
    let far = Rect::new(-500.0, 0.0, 1.0, 1.0);
    e.advance(&arena(), &far, 100, &mut rng);
    assert_eq!(e.body.rect.x, x0 + 1.0);
    assert_eq!(e.body.rect.y, 1.0);
}

#[test]
fn laura_spawns_in_band_and_strafes() {
    let cfg = config_with_oriel_chance(0.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    assert_eq!(e.kind, EnemyKind::Laura);
    assert_eq!(e.score, 50);
    assert!((50.0..200.0).contains(&e.body.rect.y));

    let y0 = e.body.rect.y;
    let far = Rect::new(-500.0, 0.0, 1.0, 1.0);
    for _ in 0..20 {
        e.advance(&arena(), &far, 100, &mut rng);
    }
    assert_eq!(e.body.rect.y, y0);
}

#[test]
fn enemy_bounces_off_side_walls() {
    let cfg = config_with_oriel_chance(0.0);
    let mut rng = seeded_rng();
    let far = Rect::new(-500.0, 0.0, 1.0, 1.0);

    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    e.body.rect.x = 607.5;
    e.body.vx = 1.0;
    e.advance(&arena(), &far, 100, &mut rng);
    assert_eq!(e.body.rect.x, 608.0);
    assert_eq!(e.body.vx, -1.0);

    e.body.rect.x = 0.5;
    e.advance(&arena(), &far, 100, &mut rng);
    assert_eq!(e.body.rect.x, 0.0);
    assert_eq!(e.body.vx, 1.0);
}

#[test]
fn oriel_wraps_from_bottom_to_top() {
    let cfg = config_with_oriel_chance(1.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    e.body.rect.y = 479.5;
    let far = Rect::new(-500.0, 0.0, 1.0, 1.0);
    e.advance(&arena(), &far, 100, &mut rng);
    assert_eq!(e.body.rect.y, -32.0);
}

#[test]
fn oriel_fires_single_note_when_aligned() {
    let cfg = config_with_oriel_chance(1.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    let overhead = Rect::new(0.0, 400.0, 640.0, 48.0);
    // Spawned with a full cooldown, which still has to be exceeded
    e.advance(&arena(), &overhead, 100, &mut rng);
    assert_eq!(e.shots.live_count(), 0);
    e.advance(&arena(), &overhead, 100, &mut rng);
    assert_eq!(e.shots.live_count(), 1);
    let (_, note) = e.shots.live_members().next().unwrap();
    assert_eq!(note.kind, ProjectileKind::Note);
}

#[test]
fn laura_fires_laser_pair() {
    let cfg = config_with_oriel_chance(0.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    let overhead = Rect::new(0.0, 400.0, 640.0, 48.0);
    e.advance(&arena(), &overhead, 100, &mut rng);
    e.advance(&arena(), &overhead, 100, &mut rng);
    assert_eq!(e.shots.live_count(), 2);

    let x = e.body.rect.x;
    let mut xs: Vec<f32> = e.shots.live_members().map(|(_, s)| s.body.rect.x).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(xs, vec![x + 5.0, x + 15.0]);
}

#[test]
fn enemy_does_not_fire_when_unaligned() {
    let cfg = config_with_oriel_chance(0.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    let far = Rect::new(-500.0, 0.0, 1.0, 1.0);
    for _ in 0..50 {
        e.advance(&arena(), &far, 100, &mut rng);
    }
    assert_eq!(e.shots.live_count(), 0);
}

#[test]
fn colliding_enemy_dies_in_place() {
    let cfg = SimConfig::default();
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    let before = e.body.rect;
    e.body.is_colliding = true;
    e.advance(&arena(), &before, 100, &mut rng);
    assert!(!e.body.alive);
    assert_eq!(e.body.rect, before);
}

#[test]
fn respawn_takes_new_serial_and_drops_shots() {
    let cfg = config_with_oriel_chance(0.0);
    let mut rng = seeded_rng();
    let mut e = Enemy::spawn(0, &cfg, &mut rng);
    e.shots.acquire_pair(1.0, 1.0, 2.0, 2.0);
    e.body.alive = false;

    e.respawn(9, &config_with_oriel_chance(1.0), &mut rng);

    assert_eq!(e.serial, 9);
    assert_eq!(e.kind, EnemyKind::Oriel);
    assert!(e.body.alive);
    assert_eq!(e.shots.live_count(), 0);
    assert_eq!(e.shots.capacity(), 2);
    assert!(e.shots.get(0).map_or(false, |s| s.kind == ProjectileKind::Note));
}

// ── Letters ───────────────────────────────────────────────────────────────────

#[test]
fn formation_spells_glyphs_left_to_right() {
    let letters = Letter::formation(&IntroConfig::default());
    let glyphs: String = letters.iter().map(|l| l.glyph).collect();
    assert_eq!(glyphs, "start");
    assert_eq!(letters[0].body.rect, Rect::new(150.0, 150.0, 64.0, 64.0));
    assert_eq!(letters[4].body.rect.x, 150.0 + 4.0 * 72.0);
    assert!(letters.iter().all(|l| l.body.tag == Tag::Enemy));
}

#[test]
fn letter_dies_when_hit() {
    let mut letters = Letter::formation(&IntroConfig::default());
    letters[2].advance();
    assert!(letters[2].body.alive);
    letters[2].body.is_colliding = true;
    letters[2].advance();
    assert!(!letters[2].body.alive);
}
