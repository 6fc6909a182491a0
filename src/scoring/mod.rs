pub mod algorithm;
pub mod calculator;
pub mod comparison;
pub mod normalizer;
pub mod valuation;

pub use algorithm::ScoringAlgorithm;
pub use calculator::ScoreCalculator;
pub use normalizer::normalize;
pub use valuation::{tagline, value_at};
