//! Data models exchanged with the image backend
//!
//! Each sub-module covers one concern: stored image records, edit requests,
//! and local files prepared for upload.

mod edit;
mod image;
mod upload;

pub use edit::*;
pub use image::*;
pub use upload::*;
