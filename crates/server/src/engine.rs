//! Movement and collision resolution.
//!
//! One call to [`apply_move`] is the whole unit of work for a `move`
//! event: steer, clamp, eat food, absorb smaller rivals, and top the
//! food supply back up. The caller broadcasts afterwards.

use crate::config::Config;
use crate::world::World;
use glam::Vec2;

/// What a single move step did, for logging and tests.
#[derive(Debug, Default, PartialEq)]
pub struct MoveOutcome {
    /// Pellets consumed this step.
    pub foods_eaten: usize,
    /// Session ids of cells absorbed (and respawned) this step.
    pub absorbed: Vec<u32>,
}

/// Apply one movement command for the cell bound to `session_id`.
///
/// Returns `None` when the move is a no-op: no cell for that session
/// (stale message) or a non-finite direction (malformed input).
pub fn apply_move(
    world: &mut World,
    config: &Config,
    session_id: u32,
    dx: f32,
    dy: f32,
) -> Option<MoveOutcome> {
    if !dx.is_finite() || !dy.is_finite() {
        return None;
    }

    let player = &config.player;
    let (mut position, mut radius) = {
        let cell = world.cell(session_id)?;
        (cell.position, cell.radius)
    };

    // Clients are untrusted: anything longer than a unit vector is
    // normalized before speed scaling.
    let mut direction = Vec2::new(dx, dy);
    if direction.length_squared() > 1.0 {
        direction = direction.normalize();
    }

    // Larger cells move slower.
    let speed = (player.base_speed - player.speed_falloff * (radius - player.min_radius))
        .max(player.min_speed);
    position += direction * speed;
    position.x = position.x.clamp(radius, world.map_size() - radius);
    position.y = position.y.clamp(radius, world.map_size() - radius);

    // Food consumption: every live pellet is checked once.
    let mut foods_eaten = 0;
    let mut i = 0;
    while i < world.foods().len() {
        let pellet = world.foods()[i];
        if position.distance(pellet.position) < radius + config.food.radius {
            world.foods_mut().swap_remove(i);
            radius = (radius + player.growth_per_food).min(player.max_radius);
            foods_eaten += 1;
        } else {
            i += 1;
        }
    }

    // Absorption: rivals smaller by at least the margin, whose center is
    // inside the acting cell's circle.
    let mut absorbed = Vec::new();
    let rivals: Vec<(u32, Vec2, f32)> = world
        .cells()
        .iter()
        .filter(|(id, _)| **id != session_id)
        .map(|(id, cell)| (*id, cell.position, cell.radius))
        .collect();
    for (rival_id, rival_position, rival_radius) in rivals {
        if rival_radius < radius - player.absorb_margin
            && position.distance(rival_position) < radius
        {
            radius = (radius + player.absorb_gain * rival_radius).min(player.max_radius);
            absorbed.push(rival_id);
        }
    }
    for &rival_id in &absorbed {
        let respawn = world.random_spawn_position(player.min_radius);
        if let Some(victim) = world.cell_mut(rival_id) {
            victim.radius = player.min_radius;
            victim.position = respawn;
        }
    }

    // Write the actor back; growth may have invalidated the clamp.
    let map_size = world.map_size();
    if let Some(cell) = world.cell_mut(session_id) {
        cell.position = position;
        cell.radius = radius;
        cell.clamp_to_map(map_size);
    }

    world.spawn_food(&config.food);

    Some(MoveOutcome {
        foods_eaten,
        absorbed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entity::Food;

    fn setup() -> (World, Config) {
        let mut config = Config::default();
        config.food.count = 0; // tests place pellets by hand
        (World::new(&config.world), config)
    }

    #[test]
    fn move_for_unknown_session_is_a_noop() {
        let (mut world, config) = setup();
        assert!(apply_move(&mut world, &config, 42, 1.0, 0.0).is_none());
    }

    #[test]
    fn non_finite_direction_is_dropped() {
        let (mut world, config) = setup();
        world.spawn_cell(1, "a".into(), &config.player);
        let before = world.cell(1).unwrap().position;
        assert!(apply_move(&mut world, &config, 1, f32::NAN, 0.0).is_none());
        assert_eq!(world.cell(1).unwrap().position, before);
    }

    #[test]
    fn oversized_direction_is_normalized() {
        let (mut world, config) = setup();
        world.spawn_cell(1, "a".into(), &config.player);
        let before = world.cell(1).unwrap().position;
        apply_move(&mut world, &config, 1, 1000.0, 0.0).unwrap();
        let moved = world.cell(1).unwrap().position.distance(before);
        assert!(moved <= config.player.base_speed + 1e-3);
    }

    #[test]
    fn position_and_radius_stay_bounded_under_any_move_sequence() {
        use rand::Rng;
        let (mut world, config) = setup();
        world.spawn_cell(1, "a".into(), &config.player);
        let mut rng = rand::rng();
        for _ in 0..500 {
            let dx = rng.random_range(-3.0..3.0);
            let dy = rng.random_range(-3.0..3.0);
            apply_move(&mut world, &config, 1, dx, dy).unwrap();
            let cell = world.cell(1).unwrap();
            assert!(cell.radius >= config.player.min_radius);
            assert!(cell.radius <= config.player.max_radius);
            assert!(cell.position.x >= cell.radius);
            assert!(cell.position.x <= world.map_size() - cell.radius);
            assert!(cell.position.y >= cell.radius);
            assert!(cell.position.y <= world.map_size() - cell.radius);
        }
    }

    #[test]
    fn overlapping_food_is_consumed_and_grows_the_cell() {
        let (mut world, config) = setup();
        world.spawn_cell(1, "a".into(), &config.player);
        {
            let cell = world.cell_mut(1).unwrap();
            cell.position = Vec2::new(100.0, 100.0);
            cell.radius = 40.0;
        }
        world.foods_mut().push(Food::new(Vec2::new(110.0, 105.0)));

        let outcome = apply_move(&mut world, &config, 1, 0.6, 0.3).unwrap();
        assert_eq!(outcome.foods_eaten, 1);
        assert!(world.foods().is_empty());
        assert_eq!(
            world.cell(1).unwrap().radius,
            40.0 + config.player.growth_per_food
        );
    }

    #[test]
    fn eating_tops_food_back_up() {
        let (mut world, mut config) = setup();
        config.food.count = 30;
        world.spawn_cell(1, "a".into(), &config.player);
        {
            let cell = world.cell_mut(1).unwrap();
            cell.position = Vec2::new(500.0, 500.0);
            cell.radius = 40.0;
        }
        world.spawn_food(&config.food);
        world.foods_mut()[0] = Food::new(Vec2::new(505.0, 500.0));

        apply_move(&mut world, &config, 1, 0.0, 0.0).unwrap();
        assert_eq!(world.foods().len(), config.food.count);
    }

    #[test]
    fn growth_is_capped_at_max_radius() {
        let (mut world, config) = setup();
        world.spawn_cell(1, "a".into(), &config.player);
        {
            let cell = world.cell_mut(1).unwrap();
            cell.position = Vec2::new(500.0, 500.0);
            cell.radius = config.player.max_radius;
        }
        world.foods_mut().push(Food::new(Vec2::new(500.0, 500.0)));
        apply_move(&mut world, &config, 1, 0.0, 0.0).unwrap();
        assert_eq!(world.cell(1).unwrap().radius, config.player.max_radius);
    }

    #[test]
    fn absorbs_rivals_smaller_by_the_margin() {
        let (mut world, config) = setup();
        world.spawn_cell(1, "big".into(), &config.player);
        world.spawn_cell(2, "small".into(), &config.player);
        {
            let cell = world.cells_mut().get_mut(&1).unwrap();
            cell.position = Vec2::new(500.0, 500.0);
            cell.radius = 60.0;
        }
        {
            let cell = world.cells_mut().get_mut(&2).unwrap();
            cell.position = Vec2::new(520.0, 500.0);
            cell.radius = 40.0;
        }

        let outcome = apply_move(&mut world, &config, 1, 0.0, 0.0).unwrap();
        assert_eq!(outcome.absorbed, vec![2]);

        // 60 + 0.7 * 40, minus nothing (under the cap), plus no food.
        let big = world.cell(1).unwrap();
        assert!((big.radius - 88.0).abs() < 1e-3);

        // Victim respawned at min radius, somewhere inside the map.
        let small = world.cell(2).unwrap();
        assert_eq!(small.radius, config.player.min_radius);
        assert!(small.position.x >= small.radius);
        assert!(small.position.y <= world.map_size() - small.radius);
    }

    #[test]
    fn rival_within_margin_is_not_absorbed() {
        let (mut world, config) = setup();
        world.spawn_cell(1, "big".into(), &config.player);
        world.spawn_cell(2, "close".into(), &config.player);
        {
            let cell = world.cells_mut().get_mut(&1).unwrap();
            cell.position = Vec2::new(500.0, 500.0);
            cell.radius = 60.0;
        }
        {
            // Smaller, but not by more than absorb_margin.
            let cell = world.cells_mut().get_mut(&2).unwrap();
            cell.position = Vec2::new(510.0, 500.0);
            cell.radius = 58.0;
        }

        let outcome = apply_move(&mut world, &config, 1, 0.0, 0.0).unwrap();
        assert!(outcome.absorbed.is_empty());
        assert_eq!(world.cell(2).unwrap().radius, 58.0);
    }
}
