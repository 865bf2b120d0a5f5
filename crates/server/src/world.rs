//! World state management.
//!
//! The authoritative in-memory store for all cells and food pellets.

use crate::config::{FoodConfig, PlayerConfig, WorldConfig};
use crate::entity::{Cell, Food};
use glam::Vec2;
use protocol::{CellSnapshot, Color, FoodSnapshot};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

/// Fixed cosmetic palette; one entry is assigned to each cell at join.
const PALETTE: [Color; 8] = [
    Color::new(231, 76, 60),
    Color::new(230, 126, 34),
    Color::new(241, 196, 15),
    Color::new(46, 204, 113),
    Color::new(26, 188, 156),
    Color::new(52, 152, 219),
    Color::new(155, 89, 182),
    Color::new(236, 112, 99),
];

/// The game world: all live cells and food.
#[derive(Debug)]
pub struct World {
    /// All cells, keyed by session id. One cell per bound session.
    cells: HashMap<u32, Cell>,
    /// Live pellets, in insertion order.
    foods: Vec<Food>,
    /// Square map side length.
    map_size: f32,
}

impl World {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            cells: HashMap::with_capacity(64),
            foods: Vec::with_capacity(256),
            map_size: config.map_size,
        }
    }

    #[inline]
    pub fn map_size(&self) -> f32 {
        self.map_size
    }

    /// A uniformly random position at which a circle of `radius` fits
    /// entirely inside the map.
    pub fn random_spawn_position(&self, radius: f32) -> Vec2 {
        let mut rng = rand::rng();
        Vec2::new(
            rng.random_range(radius..self.map_size - radius),
            rng.random_range(radius..self.map_size - radius),
        )
    }

    /// A random color from the fixed palette.
    pub fn random_color() -> Color {
        let mut rng = rand::rng();
        PALETTE[rng.random_range(0..PALETTE.len())]
    }

    /// Spawn a cell for `session_id` at a random position with the
    /// default radius. Replaces any existing cell for that session,
    /// keeping the one-cell-per-session invariant.
    pub fn spawn_cell(&mut self, session_id: u32, name: String, player: &PlayerConfig) -> &Cell {
        let radius = player.min_radius;
        let position = self.random_spawn_position(radius);
        let cell = Cell::new(session_id, position, radius, Self::random_color(), name);
        self.cells.insert(session_id, cell);
        &self.cells[&session_id]
    }

    /// Remove the cell bound to `session_id`, if any.
    pub fn remove_cell(&mut self, session_id: u32) -> Option<Cell> {
        self.cells.remove(&session_id)
    }

    #[inline]
    pub fn cell(&self, session_id: u32) -> Option<&Cell> {
        self.cells.get(&session_id)
    }

    #[inline]
    pub fn cell_mut(&mut self, session_id: u32) -> Option<&mut Cell> {
        self.cells.get_mut(&session_id)
    }

    #[inline]
    pub fn cells(&self) -> &HashMap<u32, Cell> {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut HashMap<u32, Cell> {
        &mut self.cells
    }

    #[inline]
    pub fn foods(&self) -> &[Food] {
        &self.foods
    }

    #[inline]
    pub fn foods_mut(&mut self) -> &mut Vec<Food> {
        &mut self.foods
    }

    /// Top up pellets to the target count. Idempotent; never removes
    /// food (consumption is the engine's job).
    pub fn spawn_food(&mut self, food: &FoodConfig) {
        let mut rng = rand::rng();
        while self.foods.len() < food.count {
            let position = Vec2::new(
                rng.random_range(0.0..self.map_size),
                rng.random_range(0.0..self.map_size),
            );
            self.foods.push(Food::new(position));
        }
    }

    /// Build the full snapshot payload for a `state` broadcast.
    pub fn snapshot(&self) -> (BTreeMap<u32, CellSnapshot>, Vec<FoodSnapshot>) {
        let cells = self
            .cells
            .values()
            .map(|cell| (cell.id, cell.snapshot()))
            .collect();
        let foods = self.foods.iter().map(Food::snapshot).collect();
        (cells, foods)
    }
}
