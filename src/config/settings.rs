use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::collections::HashSet;
use std::path::Path;

use crate::config::projects::{builtin_projects, ProjectRegistry};
use crate::models::ProjectConfig;

pub const DEFAULT_UPSTREAM_BASE: &str = "https://gomtu.xyz/api";

/// Path segments under `/api` served by the JSON endpoints; a proxy
/// namespace may not reuse them.
pub const RESERVED_API_ROUTES: &[&str] = &["estimate", "compare", "overview", "projects"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub upstream: UpstreamSettings,
    pub proxy: ProxySettings,
    pub simulation: SimulationSettings,
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    /// Root of the leaderboard API, without a trailing slash.
    pub base_url: String,
    /// `None` leaves the transport default in place.
    pub timeout_seconds: Option<u64>,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyNamespace {
    /// Path segment under `/api/`, e.g. `kaito`.
    pub prefix: String,
    /// Upstream root the remaining path is appended to.
    pub upstream: String,
    /// Status returned when the upstream cannot be reached.
    pub failure_status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    pub namespaces: Vec<ProxyNamespace>,
    /// Request headers copied to the upstream request (lower-case).
    pub forwarded_request_headers: Vec<String>,
    /// Upstream response headers never copied back (lower-case).
    pub stripped_response_headers: Vec<String>,
    pub cors_allow_origin: String,
    pub cors_allow_methods: Vec<String>,
    pub cors_allow_headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub default_fdv: f64,
    /// Advisory slider maximum; not enforced by the scoring engine.
    pub max_fdv: f64,
    pub fdv_step: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Yap Scorer".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
                environment: Environment::Development,
            },
            upstream: UpstreamSettings {
                base_url: DEFAULT_UPSTREAM_BASE.to_string(),
                timeout_seconds: None,
                user_agent: format!("yap-scorer/{}", env!("CARGO_PKG_VERSION")),
            },
            proxy: ProxySettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                namespaces: vec![
                    ProxyNamespace {
                        prefix: "kaito".to_string(),
                        upstream: format!("{}/kaito", DEFAULT_UPSTREAM_BASE),
                        failure_status: 500,
                    },
                    ProxyNamespace {
                        prefix: "yap".to_string(),
                        upstream: format!("{}/yap", DEFAULT_UPSTREAM_BASE),
                        failure_status: 502,
                    },
                ],
                forwarded_request_headers: vec![
                    "content-type".to_string(),
                    "authorization".to_string(),
                ],
                stripped_response_headers: vec![
                    "content-encoding".to_string(),
                    "transfer-encoding".to_string(),
                    "connection".to_string(),
                ],
                cors_allow_origin: "*".to_string(),
                cors_allow_methods: ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"]
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
                cors_allow_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            },
            simulation: SimulationSettings {
                default_fdv: 1_000_000_000.0,
                max_fdv: 5_000_000_000.0,
                fdv_step: 1_000_000.0,
            },
            projects: builtin_projects(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("YAP_SCORER").separator("__"))
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.canonicalize();
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        let mut settings: Settings = s.try_deserialize()?;
        settings.canonicalize();
        Ok(settings)
    }

    fn canonicalize(&mut self) {
        self.upstream.base_url = self.upstream.base_url.trim_end_matches('/').to_string();
        for project in &mut self.projects {
            project.canonicalize();
        }
        for namespace in &mut self.proxy.namespaces {
            namespace.prefix = namespace.prefix.trim_matches('/').to_string();
            namespace.upstream = namespace.upstream.trim_end_matches('/').to_string();
        }
        for header in self
            .proxy
            .forwarded_request_headers
            .iter_mut()
            .chain(self.proxy.stripped_response_headers.iter_mut())
        {
            *header = header.to_ascii_lowercase();
        }
    }

    pub fn registry(&self) -> ProjectRegistry {
        ProjectRegistry::new(self.projects.clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.upstream.base_url.is_empty() {
            return Err("Upstream base URL must not be empty".to_string());
        }

        if self.projects.is_empty() {
            return Err("At least one project must be configured".to_string());
        }
        let mut seen = HashSet::new();
        for project in &self.projects {
            project.validate()?;
            if !seen.insert(project.slug.as_str()) {
                return Err(format!("Duplicate project slug: {}", project.slug));
            }
        }

        let sim = &self.simulation;
        if !(sim.default_fdv >= 0.0 && sim.default_fdv.is_finite()) {
            return Err("Default FDV must be a non-negative number".to_string());
        }
        if !(sim.max_fdv >= sim.default_fdv && sim.max_fdv.is_finite()) {
            return Err("Maximum FDV must be at least the default FDV".to_string());
        }
        if !(sim.fdv_step > 0.0) {
            return Err("FDV step must be positive".to_string());
        }

        let mut prefixes = HashSet::new();
        for namespace in &self.proxy.namespaces {
            if namespace.prefix.is_empty() || namespace.prefix.contains('/') {
                return Err(format!("Invalid proxy namespace prefix: {:?}", namespace.prefix));
            }
            if RESERVED_API_ROUTES.contains(&namespace.prefix.as_str()) {
                return Err(format!(
                    "Proxy namespace prefix {} collides with a built-in route",
                    namespace.prefix
                ));
            }
            if !prefixes.insert(namespace.prefix.as_str()) {
                return Err(format!("Duplicate proxy namespace prefix: {}", namespace.prefix));
            }
            if !(400..=599).contains(&namespace.failure_status) {
                return Err(format!(
                    "Proxy namespace {} has a non-error failure status {}",
                    namespace.prefix, namespace.failure_status
                ));
            }
        }

        Ok(())
    }
}
