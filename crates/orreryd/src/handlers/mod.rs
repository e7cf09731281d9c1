//! Reference method handlers answering from simulation snapshots.

mod galaxy;
mod planet;

use std::sync::Arc;

use orrery_protocol::{DocumentBuilder, MethodHandler};

use crate::upstream::{Position, SnapshotSource};

pub use galaxy::GalaxyHandler;
pub use planet::PlanetHandler;

/// The handler set the daemon registers at startup.
#[must_use]
pub fn default_handlers(upstream: &Arc<dyn SnapshotSource>) -> Vec<Arc<dyn MethodHandler>> {
    vec![
        Arc::new(GalaxyHandler::new(Arc::clone(upstream))),
        Arc::new(PlanetHandler::new(Arc::clone(upstream))),
    ]
}

fn write_position(json: &mut DocumentBuilder, position: &Position) {
    json.key("position")
        .start_object()
        .prop("x", position.x)
        .prop("y", position.y)
        .prop("z", position.z)
        .end_object();
}
