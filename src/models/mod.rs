pub mod comparison;
pub mod error;
pub mod leaderboard;
pub mod project;
pub mod score;
pub mod user;

pub use comparison::*;
pub use error::*;
pub use leaderboard::*;
pub use project::*;
pub use score::*;
pub use user::*;
