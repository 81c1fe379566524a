use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub board: BoardConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            board: BoardConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_RESUME_MAX_MB: u64 = 5;
pub const DEFAULT_ADMIN_INVITE_CODE: &str = "LETMEIN";
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@jobportal.local";

/// Business rules handed to the eligibility, signup and lifecycle components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub resume: ResumePolicy,
    pub signup: SignupPolicy,
    pub transitions: TransitionMode,
    pub from_email: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            resume: ResumePolicy::default(),
            signup: SignupPolicy::default(),
            transitions: TransitionMode::Permissive,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
        }
    }
}

impl BoardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_bytes = match env::var("BOARD_RESUME_MAX_MB") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|mb| *mb > 0)
                .and_then(|mb| mb.checked_mul(1024 * 1024))
                .ok_or(ConfigError::InvalidNumber {
                    key: "BOARD_RESUME_MAX_MB",
                    value: raw,
                })?,
            Err(_) => DEFAULT_RESUME_MAX_MB * 1024 * 1024,
        };

        let allow_admin_signup = flag_from_env("BOARD_ALLOW_ADMIN_SIGNUP", true)?;
        let strict = flag_from_env("BOARD_STRICT_TRANSITIONS", false)?;

        Ok(Self {
            resume: ResumePolicy {
                max_bytes,
                ..ResumePolicy::default()
            },
            signup: SignupPolicy {
                allow_admin_signup,
                admin_invite_code: env::var("BOARD_ADMIN_INVITE_CODE")
                    .unwrap_or_else(|_| DEFAULT_ADMIN_INVITE_CODE.to_string()),
            },
            transitions: if strict {
                TransitionMode::Strict
            } else {
                TransitionMode::Permissive
            },
            from_email: env::var("BOARD_FROM_EMAIL")
                .unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string()),
        })
    }
}

/// Upload rules for resumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePolicy {
    pub max_bytes: u64,
    pub require_pdf_extension: bool,
}

impl Default for ResumePolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_RESUME_MAX_MB * 1024 * 1024,
            require_pdf_extension: true,
        }
    }
}

/// Admin self-registration controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupPolicy {
    pub allow_admin_signup: bool,
    pub admin_invite_code: String,
}

impl Default for SignupPolicy {
    fn default() -> Self {
        Self {
            allow_admin_signup: true,
            admin_invite_code: DEFAULT_ADMIN_INVITE_CODE.to_string(),
        }
    }
}

/// Whether application status changes must follow the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Any status may be set from any other.
    Permissive,
    /// Only edges of the lifecycle graph are accepted.
    Strict,
}

fn flag_from_env(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidFlag { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive integer (found '{value}')")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true/false (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
