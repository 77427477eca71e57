//! Configuration management for kakeibo
//!
//! This module handles loading, validation, and management of
//! kakeibo configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Identity provider settings
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: AuthConfig::default(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Authentication configuration
///
/// Sign-in is handled by an upstream proxy which forwards the verified
/// email address in a request header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the signed-in email
    #[serde(default = "default_email_header")]
    pub email_header: String,
    /// Fixed identity used when the header is absent (local development)
    #[serde(default)]
    pub dev_email: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            email_header: default_email_header(),
            dev_email: None,
        }
    }
}

fn default_email_header() -> String {
    "x-forwarded-email".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Create the database file when it does not exist
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            create_if_missing: true,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://kakeibo.sqlite3".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_true() -> bool {
    true
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for detail lists
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            symbol_position: SymbolPosition::After,
            thousands_separator: default_thousands_sep(),
        }
    }
}

fn default_symbol() -> String {
    "円".to_string()
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::After
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::After
    }
}

impl std::str::FromStr for SymbolPosition {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" => Ok(SymbolPosition::Before),
            "after" => Ok(SymbolPosition::After),
            _ => Err(format!("Invalid symbol position: {}", s)),
        }
    }
}

impl std::fmt::Display for SymbolPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolPosition::Before => write!(f, "before"),
            SymbolPosition::After => write!(f, "after"),
        }
    }
}

/// Defaults seeded into every new household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdDefaults {
    /// Expense categories
    #[serde(default = "default_expense_categories")]
    pub expense_categories: Vec<String>,
    /// Income categories
    #[serde(default = "default_income_categories")]
    pub income_categories: Vec<String>,
    /// Tags
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
}

impl Default for HouseholdDefaults {
    fn default() -> Self {
        Self {
            expense_categories: default_expense_categories(),
            income_categories: default_income_categories(),
            tags: default_tags(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_expense_categories() -> Vec<String> {
    to_strings(&[
        "Groceries",
        "Dining out",
        "Household goods",
        "Transport",
        "Housing",
        "Electricity",
        "Gas",
        "Water",
        "Telecom",
        "Medical",
        "Insurance",
        "Education",
        "Entertainment",
        "Clothing",
        "Beauty",
        "Social",
        "Taxes",
        "Travel",
        "Other",
    ])
}

fn default_income_categories() -> Vec<String> {
    to_strings(&["Salary", "Bonus", "Side income", "Other"])
}

fn default_tags() -> Vec<String> {
    to_strings(&["Needed", "Not needed"])
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// New household defaults
    #[serde(default)]
    pub household: HouseholdDefaults,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

const MAX_PAGE_SIZE: usize = 500;

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|source| {
            let path = path.display().to_string();
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound { path }
            } else {
                ConfigError::Unreadable { path, source }
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document means "all defaults"
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
                message: e.to_string(),
            })?
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.server.auth.email_header.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.auth.email_header".to_string(),
                reason: "Email header name must not be empty".to_string(),
            });
        }

        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database.url".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                reason: "At least one connection is required".to_string(),
            });
        }

        if self.pagination.page_size == 0 || self.pagination.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                reason: format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: "Log level must be one of trace, debug, info, warn, error".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Format an amount with the configured separator and currency symbol
    pub fn format_amount(&self, digits: &str) -> String {
        match self.currency.symbol_position {
            SymbolPosition::Before => format!("{}{}", self.currency.symbol, digits),
            SymbolPosition::After => format!("{} {}", digits, self.currency.symbol),
        }
    }
}

/// Accepted log levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}
