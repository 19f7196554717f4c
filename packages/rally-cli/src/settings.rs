//! Config layering: built-in defaults, then an optional TOML file, then
//! command-line flags and environment variables.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use rally_core::ChatConfig;

/// Values that may override the file config
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub delivery_delay_ms: Option<u64>,
    pub read_delay_ms: Option<u64>,
    pub sender: Option<String>,
}

/// Read a TOML config file. Missing keys keep their defaults.
pub fn load_file(path: &Path) -> Result<ChatConfig> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    parse_toml(&raw).wrap_err_with(|| format!("parsing config file {}", path.display()))
}

fn parse_toml(raw: &str) -> Result<ChatConfig> {
    Ok(toml::from_str(raw)?)
}

/// Build the effective config and check it
pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<ChatConfig> {
    let base = match file {
        Some(path) => load_file(path)?,
        None => ChatConfig::default(),
    };
    let config = apply(base, overrides);
    config.validate()?;
    Ok(config)
}

fn apply(mut config: ChatConfig, overrides: Overrides) -> ChatConfig {
    if let Some(ms) = overrides.delivery_delay_ms {
        config.delivery_delay_ms = ms;
    }
    if let Some(ms) = overrides.read_delay_ms {
        config.read_delay_ms = ms;
    }
    if let Some(sender) = overrides.sender {
        config.local_sender = sender;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = parse_toml("read_delay_ms = 5000\n").unwrap();
        assert_eq!(config.read_delay_ms, 5000);
        assert_eq!(config.delivery_delay_ms, 1000);
        assert_eq!(config.local_sender, "You");
    }

    #[test]
    fn test_flags_override_file() {
        let file = parse_toml("delivery_delay_ms = 300\nlocal_sender = \"Coach\"\n").unwrap();
        let config = apply(
            file,
            Overrides {
                delivery_delay_ms: Some(500),
                sender: None,
                ..Default::default()
            },
        );
        assert_eq!(config.delivery_delay_ms, 500);
        assert_eq!(config.local_sender, "Coach");
        assert_eq!(config.read_delay_ms, 2000);
    }

    #[test]
    fn test_resolve_validates() {
        let err = resolve(
            None,
            Overrides {
                read_delay_ms: Some(10),
                ..Default::default()
            },
        );
        assert!(err.is_err());

        let config = resolve(None, Overrides::default()).unwrap();
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        assert!(parse_toml("delivery_delay_ms = \"soon\"").is_err());
    }
}
