use bevy::prelude::*;
use rig_shared::{AuthorityMode, NodeSettings};

#[derive(Resource, Clone, Copy, Debug)]
pub struct ClientSettings {
    pub node: NodeSettings,
    pub mode: AuthorityMode,
    /// Run a scripted second participant in-process.
    pub spawn_bot: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            node: NodeSettings::default(),
            mode: AuthorityMode::Host,
            spawn_bot: true,
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    let settings = ClientSettings::from_cli_env();
    info!(
        "Movement speed {} m/s, rotate speed {} deg, {:?} authority, bot {}",
        settings.node.locomotion.movement_speed,
        settings.node.locomotion.rotate_speed,
        settings.mode,
        if settings.spawn_bot { "on" } else { "off" }
    );
    app.insert_resource(settings);
}

impl ClientSettings {
    /// Supported:
    ///   --movement-speed <m/s>, --movement-speed=<m/s>
    ///   --rotate-speed <deg>, --rotate-speed=<deg>
    ///   --shared
    ///   --no-bot
    ///   RIG_MOVEMENT_SPEED or RIG_ROTATE_SPEED environment variables
    ///
    /// CLI flags win over the environment.
    pub fn from_cli_env() -> Self {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    fn from_sources(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut settings = Self::default();
        let locomotion = &mut settings.node.locomotion;

        let from_env = |key: &str| env(key).and_then(|value| parse_speed(key, &value));
        if let Some(speed) = from_env("RIG_MOVEMENT_SPEED") {
            locomotion.movement_speed = speed;
        }
        if let Some(speed) = from_env("RIG_ROTATE_SPEED") {
            locomotion.rotate_speed = speed;
        }

        let mut args = args.into_iter();
        let mut pending_key: Option<&'static str> = None;

        while let Some(arg) = args.next() {
            if let Some(key) = pending_key.take() {
                settings.apply(key, &arg);
            } else if arg == "--movement-speed" {
                pending_key = Some("movement-speed");
            } else if arg == "--rotate-speed" {
                pending_key = Some("rotate-speed");
            } else if let Some(val) = arg.strip_prefix("--movement-speed=") {
                settings.apply("movement-speed", val);
            } else if let Some(val) = arg.strip_prefix("--rotate-speed=") {
                settings.apply("rotate-speed", val);
            } else if arg == "--shared" {
                settings.mode = AuthorityMode::Shared;
            } else if arg == "--no-bot" {
                settings.spawn_bot = false;
            }
        }

        settings
    }

    fn apply(&mut self, key: &str, value: &str) {
        let Some(speed) = parse_speed(key, value) else {
            return;
        };
        match key {
            "movement-speed" => self.node.locomotion.movement_speed = speed,
            "rotate-speed" => self.node.locomotion.rotate_speed = speed,
            _ => {}
        }
    }
}

fn parse_speed(key: &str, value: &str) -> Option<f32> {
    match value.trim().parse::<f32>() {
        Ok(speed) if speed.is_finite() && speed >= 0.0 => Some(speed),
        _ => {
            warn!("Ignoring {key}={value:?}; expected a non-negative number");
            None
        }
    }
}
