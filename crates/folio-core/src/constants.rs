// Shared tuning constants used by the core controllers and the web frontend.

// Camera
pub const CAMERA_Z: f32 = 6.0; // default eye distance when no scene camera applies
pub const CAMERA_FOVY_DEG: f32 = 45.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Numeric guards
pub const DIR_EPSILON: f32 = 1e-6; // below this a direction is treated as degenerate
pub const MIN_SCALE: f32 = 1e-4; // smallest scale component a pose may carry
pub const MAX_FRAME_DT_MS: f32 = 250.0; // clock steps are clamped to this after tab stalls

// Overlay corner radius, as a fraction of the smaller projected dimension
pub const CORNER_RADIUS_FRACTION: f32 = 0.12;
pub const CORNER_RADIUS_MIN_PX: f32 = 6.0;
pub const CORNER_RADIUS_MAX_PX: f32 = 48.0;

// Settle (damped overshoot) shape shared by assembly and eject
pub const SETTLE_WINDOW: f32 = 0.3; // trailing fraction of an interval that carries the settle
pub const SETTLE_CYCLES: f32 = 1.5;
pub const SETTLE_DECAY: f32 = 3.0;

// Frame error logging
pub const LOG_THROTTLE_WINDOW_MS: f64 = 2000.0;

// Procedural decoration seeds
pub const CONSTELLATION_SEED: u64 = 1_642_871;
pub const BACKDROP_SEED: u64 = 7_340_021;
