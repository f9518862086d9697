//! Storage for the uploaded media files themselves
//!
//! Record metadata lives in [`crate::db`]; this module only deals with the
//! bytes on disk under the uploads directory.

pub mod local;

pub use local::{LocalUploadStorage, UploadTarget};

/// URL prefix under which uploaded files are served and recorded
pub const PUBLIC_UPLOADS_PREFIX: &str = "/uploads/";

/// Largest accepted upload (10 MB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
