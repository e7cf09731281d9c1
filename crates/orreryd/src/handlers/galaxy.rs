//! Galaxy-wide queries.

use std::sync::Arc;

use orrery_protocol::{
    Document, DocumentBuilder, MethodDescriptor, MethodError, MethodHandler, Params,
};

use crate::upstream::{Galaxy, SnapshotSource};

use super::write_position;

const METHODS: [MethodDescriptor; 2] = [
    MethodDescriptor::new(
        "get_galaxy_details",
        "Get detailed information about the current galaxy, including seed, star count, and birth planet/star IDs.",
    ),
    MethodDescriptor::new(
        "get_stars",
        "List all stars with details (ID, name, type, position, luminosity, planet count).",
    ),
];

/// Answers `get_galaxy_details` and `get_stars`.
pub struct GalaxyHandler {
    upstream: Arc<dyn SnapshotSource>,
}

impl GalaxyHandler {
    /// Creates a handler reading from `upstream`.
    #[must_use]
    pub fn new(upstream: Arc<dyn SnapshotSource>) -> Self {
        Self { upstream }
    }
}

impl MethodHandler for GalaxyHandler {
    fn name(&self) -> &'static str {
        "galaxy"
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        METHODS.to_vec()
    }

    fn handle(&self, method: &str, _params: &Params) -> Result<Document, MethodError> {
        let snapshot = self
            .upstream
            .current()
            .ok_or(MethodError::UpstreamUnavailable)?;
        match method {
            "get_galaxy_details" => galaxy_details(&snapshot.galaxy),
            "get_stars" => stars(&snapshot.galaxy),
            other => Err(MethodError::internal(format!(
                "galaxy handler cannot answer '{other}'"
            ))),
        }
    }
}

fn galaxy_details(galaxy: &Galaxy) -> Result<Document, MethodError> {
    let mut json = DocumentBuilder::new();
    json.start_object()
        .prop("seed", galaxy.seed)
        .prop("starCount", galaxy.star_count())
        .prop("birthPlanetId", galaxy.birth_planet_id)
        .prop("birthStarId", galaxy.birth_star_id)
        .prop("habitableCount", galaxy.habitable_count)
        .end_object();
    Ok(json.finish()?)
}

fn stars(galaxy: &Galaxy) -> Result<Document, MethodError> {
    let mut json = DocumentBuilder::with_capacity(galaxy.star_count() * 256);
    json.start_array();
    for star in &galaxy.stars {
        json.start_object()
            .prop("id", star.id)
            .prop("name", star.name.as_str())
            .prop("displayName", star.display_name());
        write_position(&mut json, &star.position);
        json.prop("type", star.kind.as_str())
            .prop("spectr", star.spectr.as_str())
            .prop("temperature", star.temperature)
            .prop("luminosity", star.luminosity)
            .prop("radius", star.radius)
            .prop("dysonRadius", star.dyson_radius)
            .prop("planetCount", star.planets.len())
            .end_object();
    }
    json.end_array();
    Ok(json.finish()?)
}
