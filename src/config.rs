use crate::error::AppError;
use std::env;
use std::str::FromStr;

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub database_max_connections: u32,
    /// Log every executed SQL statement at `Info`.
    pub log_queries: bool,
    /// Hide the message of internal errors from GraphQL clients.
    pub mask_errors: bool,
    pub depth_limit: Option<usize>,
    pub complexity_limit: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Configuration("DATABASE_URL must be set".into()))?;

        Ok(Self {
            database_url,
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            log_queries: parse_flag("LOG_QUERIES", true)?,
            mask_errors: parse_flag("MASK_ERRORS", false)?,
            depth_limit: parse_optional("GRAPHQL_DEPTH_LIMIT")?,
            complexity_limit: parse_optional("GRAPHQL_COMPLEXITY_LIMIT")?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_optional<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Configuration(format!("{} must be a number, got {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    Ok(parse_optional(name)?.unwrap_or(default))
}

fn parse_flag(name: &str, default: bool) -> Result<bool, AppError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Configuration(format!(
                "{} must be a boolean, got {:?}",
                name, raw
            ))),
        },
        Err(_) => Ok(default),
    }
}
