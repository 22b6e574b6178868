//! Hand-off to an external renderer.
//!
//! The simulation never touches pixels: it walks its live entities and asks
//! a [`Surface`] to draw a [`Sprite`] at a rectangle.

use crate::compute::{GameSession, GameState};
use crate::entities::{EnemyKind, Entity, ProjectileKind};
use crate::geometry::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sprite {
    /// `reloaded` shows the loaded rice packet on the arm.
    Catapult { reloaded: bool },
    Projectile(ProjectileKind),
    Enemy(EnemyKind),
    Letter(char),
}

pub trait Surface {
    fn draw(&mut self, sprite: Sprite, rect: &Rect);
}

/// Values for the score/life widgets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hud {
    pub score: u64,
    pub multiplier: u64,
    pub life: i32,
    pub max_life: i32,
    /// Rice packets left to throw.
    pub rice_ready: usize,
}

fn draw_entity(surface: &mut impl Surface, entity: &impl Entity) {
    let body = entity.body();
    if body.alive {
        surface.draw(entity.sprite(), &body.rect);
    }
}

/// Draw every live entity once, back to front.
pub fn draw_session(session: &GameSession, surface: &mut impl Surface) {
    match session.state {
        GameState::Intro => {
            for letter in &session.letters {
                draw_entity(surface, letter);
            }
        }
        GameState::Playing | GameState::GameOver => {
            for enemy in &session.squad.members {
                draw_entity(surface, enemy);
                for (_, shot) in enemy.shots.live_members() {
                    draw_entity(surface, shot);
                }
            }
        }
    }
    for (_, rice) in session.player.shots.live_members() {
        draw_entity(surface, rice);
    }
    draw_entity(surface, &session.player);
}
