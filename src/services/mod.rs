pub mod media_service;

pub use media_service::{IncomingUpload, MediaFile, MediaService};
