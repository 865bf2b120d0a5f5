//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            world: WorldConfig::default(),
            player: PlayerConfig::default(),
            food: FoodConfig::default(),
        }
    }
}

/// Server networking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Connections per IP limit.
    #[serde(default = "default_ip_limit")]
    pub ip_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_connections: default_max_connections(),
            ip_limit: default_ip_limit(),
        }
    }
}

fn default_port() -> u16 {
    3000
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_max_connections() -> usize {
    100
}
fn default_ip_limit() -> usize {
    16
}

/// World geometry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    /// Side length of the square map. Coordinates run `[0, map_size]`.
    #[serde(default = "default_map_size")]
    pub map_size: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_size: default_map_size(),
        }
    }
}

fn default_map_size() -> f32 {
    2000.0
}

/// Player cell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Spawn radius, also the respawn radius after being absorbed.
    #[serde(default = "default_min_radius")]
    pub min_radius: f32,
    /// Radius cap for growth.
    #[serde(default = "default_max_radius")]
    pub max_radius: f32,
    /// Speed of a cell at `min_radius`.
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
    /// Speed floor for the largest cells.
    #[serde(default = "default_min_speed")]
    pub min_speed: f32,
    /// Speed lost per unit of radius above `min_radius`.
    #[serde(default = "default_speed_falloff")]
    pub speed_falloff: f32,
    /// Radius gained per food pellet eaten.
    #[serde(default = "default_growth_per_food")]
    pub growth_per_food: f32,
    /// A cell may only absorb rivals at least this much smaller.
    #[serde(default = "default_absorb_margin")]
    pub absorb_margin: f32,
    /// Fraction of the victim's radius inherited on absorption.
    #[serde(default = "default_absorb_gain")]
    pub absorb_gain: f32,
    /// Display names are truncated to this length.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            min_radius: default_min_radius(),
            max_radius: default_max_radius(),
            base_speed: default_base_speed(),
            min_speed: default_min_speed(),
            speed_falloff: default_speed_falloff(),
            growth_per_food: default_growth_per_food(),
            absorb_margin: default_absorb_margin(),
            absorb_gain: default_absorb_gain(),
            max_name_length: default_max_name_length(),
        }
    }
}

fn default_min_radius() -> f32 {
    20.0
}
fn default_max_radius() -> f32 {
    200.0
}
fn default_base_speed() -> f32 {
    6.0
}
fn default_min_speed() -> f32 {
    1.5
}
fn default_speed_falloff() -> f32 {
    0.02
}
fn default_growth_per_food() -> f32 {
    1.0
}
fn default_absorb_margin() -> f32 {
    5.0
}
fn default_absorb_gain() -> f32 {
    0.7
}
fn default_max_name_length() -> usize {
    30
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    /// Target number of live pellets the spawner maintains.
    #[serde(default = "default_food_count")]
    pub count: usize,
    /// Pellet radius (shared by every pellet).
    #[serde(default = "default_food_radius")]
    pub radius: f32,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            count: default_food_count(),
            radius: default_food_radius(),
        }
    }
}

fn default_food_count() -> usize {
    200
}
fn default_food_radius() -> f32 {
    7.0
}
