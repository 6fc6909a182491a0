pub mod models;
pub mod config;
pub mod upstream;
pub mod scoring;
pub mod session;
pub mod proxy;
pub mod utils;
pub mod tui;

pub use models::{
    Comparison, EligibilityRule, LeaderboardRow, ProjectConfig, RewardEstimate, ScoreResult, Side,
    Valuation, YapScoreError, Result,
};
pub use config::{ProjectRegistry, Settings};
pub use scoring::ScoreCalculator;
