//! Wayfarer Providers - Embedding and directions ports
//!
//! This crate defines the ports for the two external collaborators of the
//! search pipeline, along with adapter implementations.

pub mod fixed;
pub mod mapbox;
pub mod ollama;
pub mod ports;
pub mod straight_line;

pub use fixed::FixedEmbedder;
pub use mapbox::MapboxDirections;
pub use ollama::OllamaEmbedder;
pub use ports::{Directions, DirectionsProvider, Embedder, Leg};
pub use straight_line::StraightLineDirections;
