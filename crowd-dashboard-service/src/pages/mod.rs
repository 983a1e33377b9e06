//! Top-level screens assembled from the panels.

pub mod dashboard;
pub mod landing;
