//! Player cell.

use glam::Vec2;
use protocol::{CellSnapshot, Color};

/// A player's avatar in the spatial game. Exactly one per bound session;
/// keyed by the session id in the world store.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Owning session id (connection-scoped, not persisted).
    pub id: u32,
    /// Center position, bounded per axis to `[radius, map_size - radius]`.
    pub position: Vec2,
    /// Current radius, bounded to `[min_radius, max_radius]`.
    pub radius: f32,
    /// Cosmetic color, assigned from the palette at join.
    pub color: Color,
    /// Display name supplied by the client.
    pub display_name: String,
}

impl Cell {
    pub fn new(id: u32, position: Vec2, radius: f32, color: Color, display_name: String) -> Self {
        Self {
            id,
            position,
            radius,
            color,
            display_name,
        }
    }

    /// Clamp the position so the whole circle stays inside the map.
    #[inline]
    pub fn clamp_to_map(&mut self, map_size: f32) {
        self.position.x = self.position.x.clamp(self.radius, map_size - self.radius);
        self.position.y = self.position.y.clamp(self.radius, map_size - self.radius);
    }

    /// Grow by `amount`, capped at `max_radius`.
    #[inline]
    pub fn grow(&mut self, amount: f32, max_radius: f32) {
        self.radius = (self.radius + amount).min(max_radius);
    }

    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            id: self.id,
            x: self.position.x,
            y: self.position.y,
            radius: self.radius,
            color: self.color,
            display_name: self.display_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_circle_inside_map() {
        let mut cell = Cell::new(1, Vec2::new(-50.0, 990.0), 25.0, Color::default(), "a".into());
        cell.clamp_to_map(1000.0);
        assert_eq!(cell.position, Vec2::new(25.0, 975.0));
    }

    #[test]
    fn grow_caps_at_max_radius() {
        let mut cell = Cell::new(1, Vec2::ZERO, 95.0, Color::default(), "a".into());
        cell.grow(10.0, 100.0);
        assert_eq!(cell.radius, 100.0);
    }
}
