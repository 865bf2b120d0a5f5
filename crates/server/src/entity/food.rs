//! Food pellet.

use glam::Vec2;
use protocol::FoodSnapshot;

/// A consumable pellet. Pellets have no identity beyond their position;
/// the shared radius lives in `FoodConfig`.
#[derive(Debug, Clone, Copy)]
pub struct Food {
    pub position: Vec2,
}

impl Food {
    pub fn new(position: Vec2) -> Self {
        Self { position }
    }

    pub fn snapshot(&self) -> FoodSnapshot {
        FoodSnapshot {
            x: self.position.x,
            y: self.position.y,
        }
    }
}
