//! Logical input actions. Raw key handling stays in the host.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Fire,
    Restart,
}

/// Snapshot of which actions are currently held, read once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    pub restart: bool,
}

impl InputState {
    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Up => self.up = held,
            Action::Down => self.down = held,
            Action::Fire => self.fire = held,
            Action::Restart => self.restart = held,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Fire => self.fire,
            Action::Restart => self.restart,
        }
    }
}
