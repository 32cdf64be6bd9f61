mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_BASE, GalleryClient, GalleryPages, GenerationHistory};
pub use error::ApiError;
pub use types::{ColoringPage, Generation, ListResponse, Pagination, Sort};
