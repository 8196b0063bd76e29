// Front-end tuning constants: renderer, surface sizing and asset limits.

// Renderer
pub const CLEAR_COLOR: [f64; 4] = [0.02, 0.02, 0.03, 1.0]; // shows only where the backdrop is transparent
pub const LIGHT_DIR: [f32; 3] = [0.35, 0.8, 0.6]; // toward the key light, world space
pub const AMBIENT_LIGHT: f32 = 0.32; // floor of the box shading
pub const INITIAL_INSTANCE_CAPACITY: usize = 64; // instance buffer grows by doubling past this

// Surface sizing
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 2.0; // backing store is capped at this many pixels per CSS pixel
pub const MAX_BACKING_DIM: u32 = 4096; // per-axis cap, under common WebGPU texture limits

// Stage layer
pub const LAYER_BLUR_MAX_PX: f32 = 24.0; // blur beyond this is clamped before it reaches CSS
pub const LAYER_WILL_CHANGE: &str = "transform, opacity, filter";

// Assets
pub const MODEL_MAX_BYTES: usize = 32 * 1024 * 1024; // larger responses are rejected before parsing
