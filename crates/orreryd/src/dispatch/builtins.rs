//! Methods answered by the daemon itself.

use orrery_protocol::{Document, DocumentBuilder, MethodDescriptor, MethodError};

use crate::registry::HandlerRegistry;
use crate::upstream::SnapshotSource;

/// Built-in methods, resolved before the registry and never overridable.
pub const BUILT_IN_METHODS: [MethodDescriptor; 3] = [
    MethodDescriptor::new("ping", "Test connectivity"),
    MethodDescriptor::new(
        "get_game_info",
        "Get basic game info: version, current planet, and star count",
    ),
    MethodDescriptor::new("list_methods", "List all available methods"),
];

const NO_PLANET: &str = "In Space";
const NO_STAR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltIn {
    Ping,
    GameInfo,
    ListMethods,
}

impl BuiltIn {
    pub(crate) fn from_method(method: &str) -> Option<Self> {
        match method {
            "ping" => Some(Self::Ping),
            "get_game_info" => Some(Self::GameInfo),
            "list_methods" => Some(Self::ListMethods),
            _ => None,
        }
    }

    pub(crate) fn answer(
        self,
        registry: &HandlerRegistry,
        upstream: &dyn SnapshotSource,
    ) -> Result<Document, MethodError> {
        match self {
            Self::Ping => Ok(Document::scalar("pong")?),
            Self::GameInfo => game_info(upstream),
            Self::ListMethods => list_methods(registry),
        }
    }
}

fn game_info(upstream: &dyn SnapshotSource) -> Result<Document, MethodError> {
    let snapshot = upstream.current().ok_or(MethodError::UpstreamUnavailable)?;
    let environment = &snapshot.environment;
    let mut json = DocumentBuilder::new();
    json.start_object()
        .prop("gameVersion", environment.version.as_str())
        .prop(
            "currentPlanet",
            environment.current_planet.as_deref().unwrap_or(NO_PLANET),
        )
        .prop(
            "currentStar",
            environment.current_star.as_deref().unwrap_or(NO_STAR),
        )
        .prop("galaxyStarCount", snapshot.galaxy.star_count())
        .end_object();
    Ok(json.finish()?)
}

fn list_methods(registry: &HandlerRegistry) -> Result<Document, MethodError> {
    let mut json = DocumentBuilder::new();
    json.start_object().key("builtIn").start_object();
    for method in &BUILT_IN_METHODS {
        json.prop(method.name, method.description);
    }
    json.end_object();

    json.key("handlers").start_object();
    for entry in registry.catalog() {
        json.key(&entry.handler).start_object();
        for method in &entry.methods {
            json.prop(method.name, method.description);
        }
        json.end_object();
    }
    json.end_object().end_object();
    Ok(json.finish()?)
}
