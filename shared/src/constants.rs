/// Gravity magnitude in meters per second squared (positive value).
///
/// Locomotion integrates it as a downward acceleration on the fall-speed accumulator.
pub const GRAVITY_MPS2: f32 = 9.81;

/// Default locomotion speed in meters per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 2.0;

/// Default yaw applied per tick at full rotate-axis deflection, in degrees.
pub const DEFAULT_ROTATE_SPEED_DEG: f32 = 2.0;

/// Default move speed of the simple (non-VR) avatar in meters per second.
pub const DEFAULT_AVATAR_MOVE_SPEED: f32 = 5.0;

/// Distance below the character root within which a surface counts as ground (meters).
pub const GROUND_CONTACT_DISTANCE: f32 = 0.02;

/// Inclusive lower bound of the random spawn area on X and Z (whole meters).
pub const SPAWN_AREA_MIN: i32 = 1;

/// Exclusive upper bound of the random spawn area on X and Z (whole meters).
pub const SPAWN_AREA_MAX: i32 = 5;

/// Spawn height of a freshly spawned actor (meters).
pub const SPAWN_HEIGHT: f32 = 0.5;

/// Default fixed simulation step in seconds (60 Hz).
pub const DEFAULT_FIXED_DT: f32 = 1.0 / 60.0;
