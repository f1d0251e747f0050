//! AI roadmap generation: prompt construction, model call, and parsing of the
//! returned JSON into a [`GeneratedRoadmap`](crate::traits::GeneratedRoadmap).

mod generation;

pub use generation::RoadmapGenerator;

/// Caller-visible sentence for any generation failure.
pub const GENERATION_FAILED: &str = "Failed to generate AI roadmap. Please try again.";
