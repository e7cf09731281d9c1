//! Planet listing and resource queries.

use std::sync::Arc;

use orrery_protocol::{
    Document, DocumentBuilder, MethodDescriptor, MethodError, MethodHandler, Params,
};

use crate::upstream::{Galaxy, SnapshotSource};

use super::write_position;

const METHODS: [MethodDescriptor; 2] = [
    MethodDescriptor::new(
        "list_planets",
        "List all planets with details (ID, name, star, type, position, radius, resources).",
    ),
    MethodDescriptor::new(
        "get_planet_resources",
        "Get vein/resource deposits on a specific planet.",
    ),
];

/// Answers `list_planets` and `get_planet_resources`.
pub struct PlanetHandler {
    upstream: Arc<dyn SnapshotSource>,
}

impl PlanetHandler {
    /// Creates a handler reading from `upstream`.
    #[must_use]
    pub fn new(upstream: Arc<dyn SnapshotSource>) -> Self {
        Self { upstream }
    }
}

impl MethodHandler for PlanetHandler {
    fn name(&self) -> &'static str {
        "planets"
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        METHODS.to_vec()
    }

    fn handle(&self, method: &str, params: &Params) -> Result<Document, MethodError> {
        let snapshot = self
            .upstream
            .current()
            .ok_or(MethodError::UpstreamUnavailable)?;
        match method {
            "list_planets" => list_planets(&snapshot.galaxy),
            "get_planet_resources" => planet_resources(&snapshot.galaxy, params),
            other => Err(MethodError::internal(format!(
                "planet handler cannot answer '{other}'"
            ))),
        }
    }
}

fn list_planets(galaxy: &Galaxy) -> Result<Document, MethodError> {
    let mut json = DocumentBuilder::new();
    json.start_array();
    for (star, planet) in galaxy.planets() {
        json.start_object()
            .prop("id", planet.id)
            .prop("name", planet.name.as_str())
            .prop("starId", star.id)
            .prop("starName", star.display_name())
            .prop("type", planet.kind.as_str())
            .prop("singularity", planet.singularity.as_str())
            .prop("theme", planet.theme)
            .prop("radius", planet.radius)
            .prop("orbitRadius", planet.orbit_radius)
            .prop("rotationPeriod", planet.rotation_period)
            .prop("obliquity", planet.obliquity)
            .prop("orbitalPeriod", planet.orbital_period);
        write_position(&mut json, &planet.position);
        json.end_object();
    }
    json.end_array();
    Ok(json.finish()?)
}

fn planet_resources(galaxy: &Galaxy, params: &Params) -> Result<Document, MethodError> {
    let planet_id = params.required_i64("planetId")?;
    let (_, planet) = galaxy.planet_by_id(planet_id).ok_or_else(|| {
        MethodError::invalid_params(format!("Planet with ID {planet_id} not found."))
    })?;

    let mut json = DocumentBuilder::new();
    json.start_object()
        .prop("planetId", planet.id)
        .prop("planetName", planet.name.as_str())
        .key("resourceSpots")
        .start_array();
    for deposit in planet.resources.iter().filter(|deposit| deposit.is_present()) {
        json.start_object()
            .prop("type", deposit.kind.as_str())
            .prop("amount", deposit.amount)
            .prop("veinCount", deposit.vein_count)
            .end_object();
    }
    json.end_array().end_object();
    Ok(json.finish()?)
}
