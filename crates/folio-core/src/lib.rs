pub mod asset;
pub mod assembly;
pub mod camera;
pub mod capture;
pub mod constants;
pub mod ease;
pub mod events;
pub mod latest;
pub mod picking;
pub mod pose;
pub mod procgen;
pub mod projection;
pub mod rigs;
pub mod runtime;
pub mod scene;
pub mod showcase;
pub mod stage;
pub mod texture;
pub mod throttle;

pub use asset::*;
pub use camera::*;
pub use constants::*;
pub use events::*;
pub use pose::*;
pub use projection::*;
pub use runtime::*;
pub use scene::*;
