use crate::{
    input::{RigAction, analog_input},
    settings::ClientSettings,
    tracking::stand_in_frame,
    world::LevelGround,
};
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use rig_shared::{
    AnalogInput, DEFAULT_FIXED_DT, HardwareRig, LoopbackConfig, LoopbackHub, RigNode, Vec2,
    step_loopback,
};

/// In-process session: the hub plus every participant this process simulates.
#[derive(Resource)]
pub struct Session {
    pub hub: LoopbackHub,
    pub local: RigNode,
    bot: Option<Bot>,
}

/// Scripted second participant: walks a slow circle.
struct Bot {
    node: RigNode,
    phase: f32,
}

impl Bot {
    const TURN: f32 = 0.4;
    const PHASE_OFFSET: f32 = 1.7;

    fn analog(&self) -> AnalogInput {
        AnalogInput {
            movement: Vec2::new(0.0, 0.6),
            rotation: Vec2::new(Self::TURN, 0.0),
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_seconds(DEFAULT_FIXED_DT as f64));
    app.add_systems(Startup, start_session);
    app.add_systems(FixedUpdate, fixed_step.run_if(resource_exists::<Session>));
    app.add_systems(Update, render_frame.run_if(resource_exists::<Session>));
}

fn start_session(mut commands: Commands, settings: Res<ClientSettings>) -> Result {
    let mut hub = LoopbackHub::new(LoopbackConfig {
        mode: settings.mode,
        fixed_dt: DEFAULT_FIXED_DT,
    });

    let local_player = hub.join()?;
    let mut local = RigNode::new(local_player, settings.node);
    local.bind_hardware(HardwareRig::default());
    info!("Joined as {local_player}");

    let bot = if settings.spawn_bot {
        let player = hub.join()?;
        let mut node = RigNode::new(player, settings.node);
        node.bind_hardware(HardwareRig::default());
        info!("Bot joined as {player}");
        Some(Bot {
            node,
            phase: Bot::PHASE_OFFSET,
        })
    } else {
        None
    };

    commands.insert_resource(Session { hub, local, bot });
    Ok(())
}

fn fixed_step(mut session: ResMut<Session>) -> Result {
    let Session { hub, local, bot } = &mut *session;
    if hub.is_shut_down() {
        return Ok(());
    }

    match bot {
        Some(bot) => step_loopback(hub, &mut [local, &mut bot.node])?,
        None => step_loopback(hub, &mut [local])?,
    }
    Ok(())
}

fn render_frame(
    time: Res<Time>,
    actions: Res<ActionState<RigAction>>,
    ground: Res<LevelGround>,
    mut session: ResMut<Session>,
) {
    let dt = time.delta_secs();
    let elapsed = time.elapsed_secs();
    let Session { local, bot, .. } = &mut *session;

    let tracking = stand_in_frame(elapsed);
    local.render_frame(analog_input(&actions), Some(&tracking), &ground.0, dt);

    if let Some(bot) = bot {
        bot.phase += dt;
        let tracking = stand_in_frame(bot.phase);
        let analog = bot.analog();
        bot.node.render_frame(analog, Some(&tracking), &ground.0, dt);
    }
}
