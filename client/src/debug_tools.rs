//! Diagnostics for native dev builds.
//!
//! Gated behind `dev_native` in `main.rs`.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::time::common_conditions::on_timer;
use std::time::Duration;

use crate::session::Session;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        LogDiagnosticsPlugin::default(),
    ));

    app.add_systems(
        Update,
        log_session_summary
            .run_if(resource_exists::<Session>.and(on_timer(Duration::from_secs(5)))),
    );
}

fn log_session_summary(session: Res<Session>) {
    debug!(
        "Tick {}: {} players, {} actors, local sees {}",
        session.hub.tick(),
        session.hub.players().len(),
        session.hub.actor_count(),
        session.local.actors().count()
    );
}
