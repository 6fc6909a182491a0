pub mod projects;
pub mod settings;

pub use projects::ProjectRegistry;
pub use settings::{ProxyNamespace, Settings};
