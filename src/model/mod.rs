//! Data structures shared by the parsers, the estimate engine and the quote

// Declare all submodules
mod estimate;
mod geometry;
mod settings;

// Re-export all public types from geometry module
pub use geometry::{Mesh, Triangle, Vertex};

// Re-export all public types from settings module
pub use settings::{DeliveryMode, Material, PrintSettings, SpeedClass};

// Re-export all public types from estimate module
pub use estimate::{PriceBreakdown, PrintEstimate, VolumeSource};
