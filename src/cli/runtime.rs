use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use supplychain_assistant::AppConfig;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const ENV_FILES: &[&str] = &[".env", "config/local.env"];

/// Copies `KEY=value` entries from the local env files into the process
/// environment. Variables that are already set are left alone.
pub fn load_local_env_overrides() {
    for file in ENV_FILES {
        let path = Path::new(file);
        if !path.exists() {
            continue;
        }
        match stdfs::read_to_string(path) {
            Ok(contents) => {
                let applied = apply_env_lines(&contents, path);
                info!(path = %path.display(), applied, "Loaded environment overrides");
            }
            Err(err) => {
                warn!(path = %path.display(), ?err, "failed to read env overrides");
            }
        }
    }
}

fn apply_env_lines(contents: &str, path: &Path) -> usize {
    let mut applied = 0;
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            warn!(path = %path.display(), line = idx + 1, "invalid env entry; skipping");
            continue;
        };
        let key = key.trim();
        if key.is_empty() || env::var(key).is_ok() {
            continue;
        }
        env::set_var(key, unquote(value.trim()));
        applied += 1;
    }
    applied
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\t", "\t")
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // ./config/config.yaml, then the per-user config directory
            let local_config = PathBuf::from("config/config.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("supplychain");
                path.push("config.yaml");
                path
            }
        }
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;

        let config: AppConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: AppConfig::default(),
            path: config_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquotes_env_values() {
        assert_eq!(unquote("\"a \\\"b\\\"\""), "a \"b\"");
        assert_eq!(unquote("'raw $value'"), "raw $value");
        assert_eq!(unquote("plain"), "plain");
    }

    #[test]
    fn existing_variables_win() {
        env::set_var("SCA_TEST_EXISTING", "kept");
        let applied = apply_env_lines(
            "# comment\nSCA_TEST_EXISTING=replaced\nexport SCA_TEST_FRESH=\"fresh\"\nnot a pair\n",
            Path::new("test.env"),
        );
        assert_eq!(applied, 1);
        assert_eq!(env::var("SCA_TEST_EXISTING").unwrap(), "kept");
        assert_eq!(env::var("SCA_TEST_FRESH").unwrap(), "fresh");
    }
}
