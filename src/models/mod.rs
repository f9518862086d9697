// Re-export all model types for ease of use

pub mod media;
pub mod responses;

pub use media::{MediaPatch, MediaRecord, MediaType, MediaUpdate, NewMedia};
pub use responses::*;
