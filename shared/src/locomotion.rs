use crate::{
    constants::{
        DEFAULT_MOVEMENT_SPEED, DEFAULT_ROTATE_SPEED_DEG, GRAVITY_MPS2,
        GROUND_CONTACT_DISTANCE,
    },
    ground::GroundProbe,
    hardware::HardwareRig,
    pose::{Vec2, Vec3, renormalize, yaw_degrees},
    rig::RigPart,
};

/// The two analog sticks read once per render frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnalogInput {
    /// Planar movement; `x` strafes, `y` moves forward, relative to the headset.
    pub movement: Vec2,
    /// Only `x` is used: yaw input.
    pub rotation: Vec2,
}

impl Default for AnalogInput {
    fn default() -> Self {
        Self {
            movement: Vec2::zeros(),
            rotation: Vec2::zeros(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionSettings {
    /// Meters per second at full stick deflection.
    pub movement_speed: f32,
    /// Degrees of yaw per tick at full stick deflection.
    pub rotate_speed: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            movement_speed: DEFAULT_MOVEMENT_SPEED,
            rotate_speed: DEFAULT_ROTATE_SPEED_DEG,
        }
    }
}

/// Stick locomotion for the local hardware rig: headset-relative translation,
/// snap-free yaw and simple gravity.
#[derive(Clone, Debug, Default)]
pub struct LocomotionController {
    pub settings: LocomotionSettings,
    /// Vertical speed accumulator (m/s, negative while falling).
    fall_speed: f32,
}

impl LocomotionController {
    pub fn new(settings: LocomotionSettings) -> Self {
        Self {
            settings,
            fall_speed: 0.0,
        }
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    /// One render/update tick: move, rotate, then gravity.
    pub fn tick(
        &mut self,
        rig: &mut HardwareRig,
        input: &AnalogInput,
        ground: &impl GroundProbe,
        dt: f32,
    ) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.apply_movement(rig, sanitize(input.movement), dt);
        self.apply_rotation(rig, sanitize(input.rotation));
        self.apply_gravity(rig, ground, dt);
    }

    fn apply_movement(&self, rig: &mut HardwareRig, movement: Vec2, dt: f32) {
        if movement == Vec2::zeros() {
            return;
        }

        let local = Vec3::new(movement.x, 0.0, movement.y);
        let mut direction = rig.pose(RigPart::Headset).transform_direction(&local);
        direction.y = 0.0;

        rig.character_mut().translation += direction * self.settings.movement_speed * dt;
    }

    fn apply_rotation(&self, rig: &mut HardwareRig, rotation: Vec2) {
        let degrees = rotation.x * self.settings.rotate_speed;
        if degrees == 0.0 {
            return;
        }

        let root = rig.character_mut();
        root.rotation = renormalize(root.rotation * yaw_degrees(degrees));
    }

    fn apply_gravity(&mut self, rig: &mut HardwareRig, ground: &impl GroundProbe, dt: f32) {
        let position = rig.character().translation;
        if ground
            .ground_distance(&position, GROUND_CONTACT_DISTANCE)
            .is_some()
        {
            self.fall_speed = 0.0;
            return;
        }

        self.fall_speed -= GRAVITY_MPS2 * dt;
        let drop = -self.fall_speed;

        // Land on a surface closer than this tick's fall instead of passing through it.
        let root = rig.character_mut();
        match ground.ground_distance(&position, drop) {
            Some(distance) => {
                root.translation.y -= distance;
                self.fall_speed = 0.0;
            }
            None => root.translation.y += self.fall_speed,
        }
    }
}

/// Non-finite stick readings degrade to a centered stick.
fn sanitize(axis: Vec2) -> Vec2 {
    if axis.iter().all(|c| c.is_finite()) {
        axis
    } else {
        Vec2::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ground::{FlatGround, NoGround},
        hardware::TrackingFrame,
        pose::{Pose, Quat},
    };
    use approx::assert_relative_eq;

    fn rig_at(translation: Vec3) -> HardwareRig {
        let mut rig = HardwareRig::new(Pose::from_translation(translation));
        rig.apply_tracking(&TrackingFrame {
            headset: Some(Pose::from_translation(Vec3::new(0.0, 1.7, 0.0))),
            ..TrackingFrame::default()
        });
        rig
    }

    fn controller(movement_speed: f32, rotate_speed: f32) -> LocomotionController {
        LocomotionController::new(LocomotionSettings {
            movement_speed,
            rotate_speed,
        })
    }

    fn stick(movement: (f32, f32), rotation: (f32, f32)) -> AnalogInput {
        AnalogInput {
            movement: Vec2::new(movement.0, movement.1),
            rotation: Vec2::new(rotation.0, rotation.1),
        }
    }

    #[test]
    fn idle_grounded_rig_does_not_move() {
        let mut rig = rig_at(Vec3::zeros());
        let before = *rig.character();
        let mut loco = controller(2.0, 45.0);

        loco.tick(&mut rig, &AnalogInput::default(), &FlatGround::default(), 0.016);

        assert_relative_eq!(rig.character().translation, before.translation);
        assert_relative_eq!(rig.character().rotation, before.rotation);
        assert_eq!(loco.fall_speed(), 0.0);
    }

    #[test]
    fn movement_follows_the_headset_and_stays_horizontal() {
        let mut rig = rig_at(Vec3::zeros());
        // Head turned 90 degrees left and pitched down.
        rig.apply_tracking(&TrackingFrame {
            headset: Some(Pose::new(
                Vec3::new(0.0, 1.7, 0.0),
                yaw_degrees(90.0)
                    * Quat::from_axis_angle(&Vec3::x_axis(), 30.0_f32.to_radians()),
            )),
            ..TrackingFrame::default()
        });
        let mut loco = controller(2.0, 0.0);

        loco.tick(&mut rig, &stick((0.0, 1.0), (0.0, 0.0)), &FlatGround::default(), 0.5);

        let moved = rig.character().translation;
        assert_relative_eq!(moved.y, 0.0);
        // Forward (+Z) yawed 90 degrees points along +X; pitch shortens the planar step.
        assert!(moved.x > 0.0);
        assert_relative_eq!(moved.z, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(moved.x, 30.0_f32.to_radians().cos(), epsilon = 1.0e-5);
    }

    #[test]
    fn one_second_at_speed_two_moves_two_meters() {
        let mut rig = rig_at(Vec3::new(1.0, 0.0, 1.0));
        let mut loco = controller(2.0, 0.0);
        let dt = 0.01;

        for _ in 0..100 {
            loco.tick(&mut rig, &stick((1.0, 0.0), (0.0, 0.0)), &FlatGround::default(), dt);
        }

        assert_relative_eq!(
            rig.character().translation,
            Vec3::new(3.0, 0.0, 1.0),
            epsilon = 1.0e-4
        );
    }

    #[test]
    fn rotation_accumulates_yaw_in_degrees() {
        let mut rig = rig_at(Vec3::zeros());
        let mut loco = controller(0.0, 10.0);

        for _ in 0..3 {
            loco.tick(&mut rig, &stick((0.0, 0.0), (0.5, 0.9)), &FlatGround::default(), 0.016);
        }

        let expected = yaw_degrees(15.0);
        assert_relative_eq!(rig.character().rotation, expected, epsilon = 1.0e-5);
    }

    #[test]
    fn free_fall_matches_euler_sum() {
        let start = Vec3::new(0.0, 100.0, 0.0);
        let mut rig = rig_at(start);
        let mut loco = LocomotionController::default();
        let dt = 0.02;
        let ticks = 25;

        for _ in 0..ticks {
            loco.tick(&mut rig, &AnalogInput::default(), &NoGround, dt);
        }

        let expected: f32 = (1..=ticks).map(|i| -GRAVITY_MPS2 * dt * i as f32).sum();
        assert_relative_eq!(
            rig.character().translation.y - start.y,
            expected,
            epsilon = 1.0e-3
        );
        assert_relative_eq!(loco.fall_speed(), -GRAVITY_MPS2 * dt * ticks as f32, epsilon = 1.0e-4);
    }

    #[test]
    fn falling_rig_lands_on_the_floor_and_resets() {
        let mut rig = rig_at(Vec3::new(2.0, 0.5, 2.0));
        let mut loco = LocomotionController::default();
        let floor = FlatGround::default();

        for _ in 0..200 {
            loco.tick(&mut rig, &AnalogInput::default(), &floor, 0.016);
        }

        assert_relative_eq!(rig.character().translation.y, 0.0, epsilon = 1.0e-5);
        assert_eq!(loco.fall_speed(), 0.0);
    }

    #[test]
    fn small_stick_deflection_still_moves() {
        let mut rig = rig_at(Vec3::zeros());
        let mut loco = controller(2.0, 0.0);

        loco.tick(&mut rig, &stick((1.0e-5, 0.0), (0.0, 0.0)), &FlatGround::default(), 1.0);

        assert_relative_eq!(rig.character().translation.x, 2.0e-5, epsilon = 1.0e-9);
    }

    #[test]
    fn non_finite_input_means_no_movement() {
        let mut rig = rig_at(Vec3::zeros());
        let before = *rig.character();
        let mut loco = controller(2.0, 10.0);

        loco.tick(
            &mut rig,
            &stick((f32::NAN, 1.0), (f32::INFINITY, 0.0)),
            &FlatGround::default(),
            0.016,
        );

        assert_eq!(*rig.character(), before);
    }
}
