//! Config command handler

use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::capture::LanguageTag;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    store.save(&config).await?;

    let shown = display_value(&config, key).unwrap_or_else(|| value.to_string());
    presenter.success(&format!("{} = {}", key, shown));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match display_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = display_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(invalid(
            key,
            format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        ))
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Validate `value` for `key` and store it in normalized form
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "api_key" => {
            let value = value.trim();
            if value.is_empty() {
                return Err(invalid(key, "Value must not be empty"));
            }
            config.api_key = Some(value.to_string());
        }
        "language" => {
            let tag: LanguageTag = value.parse().map_err(|e| invalid(key, format!("{}", e)))?;
            config.language = Some(tag.to_string());
        }
        "data_dir" => {
            if value.trim().is_empty() {
                return Err(invalid(key, "Value must not be empty"));
            }
            config.data_dir = Some(PathBuf::from(value));
        }
        "max_duration" | "interim_interval" | "segment_length" => {
            let duration = parse_duration(key, value)?;
            let slot = match key {
                "max_duration" => &mut config.max_duration,
                "interim_interval" => &mut config.interim_interval,
                _ => &mut config.segment_length,
            };
            *slot = Some(duration.to_string());
        }
        "notify" => {
            config.notify = Some(
                parse_bool(value).map_err(|_| invalid(key, "Value must be 'true' or 'false'"))?,
            );
        }
        _ => unreachable!(), // Already validated
    }
    Ok(())
}

fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value.parse().map_err(|e: crate::domain::error::DurationParseError| invalid(key, e.to_string()))
}

/// Value of `key` as shown to the user, with the API key masked
fn display_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "api_key" => config.api_key.as_deref().map(mask_api_key),
        "language" => config.language.clone(),
        "data_dir" => config
            .data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        "max_duration" => config.max_duration.clone(),
        "interim_interval" => config.interim_interval.clone(),
        "segment_length" => config.segment_length.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        _ => None,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

/// Mask API key for display (show first 4 and last 4 chars)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
