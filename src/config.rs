//! Widget configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::position::Viewport;
use crate::theme::Theme;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TRIGGER_SIZE: f64 = 56.0;
pub const DEFAULT_MARGIN: f64 = 24.0;
pub const DEFAULT_STORAGE_PATH: &str = ".chat-widget/storage.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid { key: &'static str, value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub base_url: String,
    pub trigger_size: f64,
    pub margin: f64,
    pub storage_path: PathBuf,
    /// `None` leaves connection setup to the transport default.
    pub connect_timeout: Option<Duration>,
    /// `None` leaves the request deadline to the transport default.
    pub request_timeout: Option<Duration>,
    pub user_id: Option<String>,
    pub theme: Theme,
    /// `None` in non-interactive hosts.
    pub viewport: Option<Viewport>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            trigger_size: DEFAULT_TRIGGER_SIZE,
            margin: DEFAULT_MARGIN,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            connect_timeout: None,
            request_timeout: None,
            user_id: None,
            theme: Theme::Light,
            viewport: None,
        }
    }
}

impl WidgetConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional (defaults in parentheses):
    /// - `CHAT_WIDGET_BASE_URL` (`http://localhost:3000`)
    /// - `CHAT_WIDGET_TRIGGER_SIZE` (56), `CHAT_WIDGET_MARGIN` (24)
    /// - `CHAT_WIDGET_STORAGE_PATH` (`.chat-widget/storage.json`)
    /// - `CHAT_WIDGET_CONNECT_TIMEOUT_SECS` (unset: transport default)
    /// - `CHAT_WIDGET_REQUEST_TIMEOUT_SECS` (unset: transport default)
    /// - `CHAT_WIDGET_USER_ID`, `CHAT_WIDGET_THEME` (`light`)
    /// - `CHAT_WIDGET_VIEWPORT` as `WIDTHxHEIGHT` (unset: non-interactive)
    ///
    /// # Errors
    ///
    /// Returns an error if any present value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any present value fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get("CHAT_WIDGET_BASE_URL")
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_owned();
        let trigger_size = parse_or("CHAT_WIDGET_TRIGGER_SIZE", get("CHAT_WIDGET_TRIGGER_SIZE"), defaults.trigger_size)?;
        let margin = parse_or("CHAT_WIDGET_MARGIN", get("CHAT_WIDGET_MARGIN"), defaults.margin)?;
        let storage_path = get("CHAT_WIDGET_STORAGE_PATH").map_or(defaults.storage_path, PathBuf::from);
        let connect_timeout = parse_secs("CHAT_WIDGET_CONNECT_TIMEOUT_SECS", get("CHAT_WIDGET_CONNECT_TIMEOUT_SECS"))?;
        let request_timeout = parse_secs("CHAT_WIDGET_REQUEST_TIMEOUT_SECS", get("CHAT_WIDGET_REQUEST_TIMEOUT_SECS"))?;
        let user_id = get("CHAT_WIDGET_USER_ID");
        let theme = match get("CHAT_WIDGET_THEME") {
            Some(raw) => raw.parse::<Theme>().map_err(|e| ConfigError::Invalid {
                key: "CHAT_WIDGET_THEME",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.theme,
        };
        let viewport = get("CHAT_WIDGET_VIEWPORT")
            .map(|raw| parse_viewport(&raw))
            .transpose()?;

        if trigger_size <= 0.0 || !trigger_size.is_finite() {
            return Err(ConfigError::Invalid {
                key: "CHAT_WIDGET_TRIGGER_SIZE",
                value: trigger_size.to_string(),
                reason: "must be a positive number".into(),
            });
        }

        Ok(Self {
            base_url,
            trigger_size,
            margin,
            storage_path,
            connect_timeout,
            request_timeout,
            user_id,
            theme,
            viewport,
        })
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::Invalid { key, value: raw.to_owned(), reason: e.to_string() })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_secs(key: &'static str, raw: Option<String>) -> Result<Option<Duration>, ConfigError> {
    raw.map(|raw| parse_value::<u64>(key, &raw))
        .transpose()
        .map(|secs| secs.map(Duration::from_secs))
}

fn parse_viewport(raw: &str) -> Result<Viewport, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: "CHAT_WIDGET_VIEWPORT",
        value: raw.to_owned(),
        reason: reason.to_owned(),
    };
    let (w, h) = raw
        .trim()
        .split_once(|c: char| c.eq_ignore_ascii_case(&'x'))
        .ok_or_else(|| invalid("expected WIDTHxHEIGHT"))?;
    let width = parse_value::<f64>("CHAT_WIDGET_VIEWPORT", w)?;
    let height = parse_value::<f64>("CHAT_WIDGET_VIEWPORT", h)?;
    if width <= 0.0 || height <= 0.0 {
        return Err(invalid("dimensions must be positive"));
    }
    Ok(Viewport::new(width, height))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
