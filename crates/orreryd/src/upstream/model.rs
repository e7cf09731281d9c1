//! Read-only view of the simulation state served to clients.

use serde::{Deserialize, Serialize};

/// A consistent capture of the simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Session-level details.
    pub environment: Environment,
    /// The generated galaxy.
    pub galaxy: Galaxy,
}

/// Session-level details about the running simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Simulation build version.
    pub version: String,
    /// Display name of the planet the player stands on, if any.
    #[serde(default)]
    pub current_planet: Option<String>,
    /// Display name of the star owning the current planet, if any.
    #[serde(default)]
    pub current_star: Option<String>,
}

/// The generated galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Galaxy {
    /// Generation seed.
    pub seed: i64,
    /// Id of the starting star.
    pub birth_star_id: i64,
    /// Id of the starting planet.
    pub birth_planet_id: i64,
    /// Number of habitable planets.
    pub habitable_count: i64,
    /// Stars in id order.
    #[serde(default)]
    pub stars: Vec<Star>,
}

impl Galaxy {
    /// Number of stars.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.stars.len()
    }

    /// Finds a planet and the star it orbits.
    #[must_use]
    pub fn planet_by_id(&self, id: i64) -> Option<(&Star, &Planet)> {
        self.planets().find(|(_, planet)| planet.id == id)
    }

    /// Every planet paired with its star, in star order.
    pub fn planets(&self) -> impl Iterator<Item = (&Star, &Planet)> {
        self.stars
            .iter()
            .flat_map(|star| star.planets.iter().map(move |planet| (star, planet)))
    }
}

/// A star system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Star {
    /// Star id.
    pub id: i64,
    /// Internal name.
    pub name: String,
    /// Name shown to players; falls back to [`Star::name`].
    #[serde(default)]
    pub display_name: Option<String>,
    /// Position in light years.
    pub position: Position,
    /// Star classification, e.g. `MainSeqStar`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Spectral class, e.g. `G`.
    pub spectr: String,
    /// Surface temperature.
    pub temperature: f64,
    /// Luminosity.
    pub luminosity: f64,
    /// Radius.
    pub radius: f64,
    /// Maximum Dyson sphere radius.
    pub dyson_radius: f64,
    /// Planets orbiting the star.
    #[serde(default)]
    pub planets: Vec<Planet>,
}

impl Star {
    /// Player-facing name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// A planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    /// Planet id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Planet classification, e.g. `Ocean`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Singularity flags, e.g. `TidalLocked`.
    #[serde(default)]
    pub singularity: String,
    /// Terrain theme id.
    pub theme: i64,
    /// Radius.
    pub radius: f64,
    /// Orbit radius in astronomical units.
    pub orbit_radius: f64,
    /// Rotation period in seconds.
    pub rotation_period: f64,
    /// Axial tilt in degrees.
    pub obliquity: f64,
    /// Orbital period in seconds.
    pub orbital_period: f64,
    /// Current position.
    pub position: Position,
    /// Resource deposits by vein type.
    #[serde(default)]
    pub resources: Vec<ResourceDeposit>,
}

/// Aggregate deposit of one vein type on a planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDeposit {
    /// Vein type, e.g. `Iron`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Total amount across veins.
    pub amount: i64,
    /// Number of veins.
    pub vein_count: i64,
}

impl ResourceDeposit {
    /// Whether the deposit has anything in it.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.amount > 0 || self.vein_count > 0
    }
}

/// Cartesian coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}
