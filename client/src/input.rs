use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use rig_shared::AnalogInput;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RigAction {
    #[actionlike(DualAxis)]
    Move,
    #[actionlike(DualAxis)]
    Rotate,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<RigAction>::default());

    app.register_type::<RigAction>();

    let input_map = InputMap::<RigAction>::default()
        .with_dual_axis(RigAction::Move, GamepadStick::LEFT)
        .with_dual_axis(RigAction::Move, VirtualDPad::wasd())
        .with_dual_axis(RigAction::Rotate, GamepadStick::RIGHT)
        .with_dual_axis(RigAction::Rotate, VirtualDPad::arrow_keys());
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<RigAction>::default());
}

/// Both sticks as the locomotion controller expects them.
///
/// The rig faces +Z with +Y up, so its right is -X: stick X is mirrored.
pub fn analog_input(actions: &ActionState<RigAction>) -> AnalogInput {
    let movement = actions.axis_pair(&RigAction::Move);
    let rotation = actions.axis_pair(&RigAction::Rotate);

    AnalogInput {
        movement: rig_shared::Vec2::new(-movement.x, movement.y),
        rotation: rig_shared::Vec2::new(-rotation.x, rotation.y),
    }
}
