//! Core data models for volumes and search operations.

mod search;
mod volume;

pub use search::{SearchQuery, SearchResponse, MAX_RESULTS};
pub use volume::{Volume, VolumeBuilder};
