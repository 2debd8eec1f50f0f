//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.devtyper/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;

use crate::core::sentences::{DEFAULT_WORD_COUNT, Language};
use crate::monitor::output::DEFAULT_OUTPUT_CAP;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DevTyperConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub task: TaskConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub force_exit: Option<bool>,
    pub keep_alive: Option<bool>,
    pub ask_before_playing: Option<bool>,
    pub default_language: Option<Language>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GameConfig {
    pub default_word_count: Option<usize>,
    pub tick_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TaskConfig {
    pub output_cap_bytes: Option<usize>,
    pub stop_grace_ms: Option<u64>,
    pub output_lines: Option<usize>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_TICK_MS: u64 = 100;
pub const DEFAULT_STOP_GRACE_MS: u64 = 100;
pub const DEFAULT_OUTPUT_LINES: usize = 8;
/// Upper bound for `task.output_lines`; taller panels never fit a terminal.
pub const MAX_OUTPUT_LINES: usize = 200;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub force_exit: bool,
    pub keep_alive: bool,
    pub ask_before_playing: bool,
    /// Set when the language menu should be skipped.
    pub language: Option<Language>,
    pub log_level: LevelFilter,
    pub word_count: usize,
    pub tick: Duration,
    pub output_cap: usize,
    pub stop_grace: Duration,
    pub output_lines: usize,
}

/// Settings given on the command line. `None`/`false` means "not specified".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub force_exit: bool,
    pub keep_alive: Option<bool>,
    pub yes: bool,
    pub language: Option<Language>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.devtyper`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".devtyper"))
}

/// Returns the path to `~/.devtyper/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Returns the default log file, `~/.devtyper/devtyper.log`.
pub fn default_log_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("devtyper.log"))
}

/// Load config from `path` (normally [`config_path`]).
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `DevTyperConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<DevTyperConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(DevTyperConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: DevTyperConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# DevTyper Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# force_exit = false           # Or DEVTYPER_FORCE_EXIT; quit as soon as the command finishes
# keep_alive = true            # Or DEVTYPER_KEEP_ALIVE; keep the command running after you quit
# ask_before_playing = true    # Ask before opening the game
# default_language = "go"      # Or DEVTYPER_LANG; "go", "javascript", "rust", "generic"
# log_level = "info"           # "error", "warn", "info", "debug", "trace"

# [game]
# default_word_count = 10      # Generic mode: 10, 25, 50 or 100
# tick_ms = 100                # Frame interval

# [task]
# output_cap_bytes = 102400    # Or DEVTYPER_OUTPUT_CAP; retained command output
# stop_grace_ms = 100          # Wait between interrupt and kill
# output_lines = 8             # Lines of command output shown under the game
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DevTyperConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &DevTyperConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Force exit: CLI flag → env → config → default
    let force_exit = cli.force_exit
        || env_bool(&env, "DEVTYPER_FORCE_EXIT")
            .or(config.general.force_exit)
            .unwrap_or(false);

    // Keep alive: CLI → env → config → default
    let keep_alive = cli
        .keep_alive
        .or_else(|| env_bool(&env, "DEVTYPER_KEEP_ALIVE"))
        .or(config.general.keep_alive)
        .unwrap_or(true);

    // --yes skips the prompt
    let ask_before_playing = !cli.yes && config.general.ask_before_playing.unwrap_or(true);

    // Language: CLI → env → config
    let language = cli
        .language
        .or_else(|| {
            env("DEVTYPER_LANG").and_then(|value| match Language::from_str(&value, true) {
                Ok(language) => Some(language),
                Err(_) => {
                    warn!("Ignoring unknown DEVTYPER_LANG '{}'", value);
                    None
                }
            })
        })
        .or(config.general.default_language);

    // Output cap: env → config → default
    let output_cap = env("DEVTYPER_OUTPUT_CAP")
        .and_then(|value| match value.trim().parse::<usize>() {
            Ok(cap) if cap > 0 => Some(cap),
            _ => {
                warn!("Ignoring invalid DEVTYPER_OUTPUT_CAP '{}'", value);
                None
            }
        })
        .or(config.task.output_cap_bytes)
        .unwrap_or(DEFAULT_OUTPUT_CAP);

    let log_level = config
        .general
        .log_level
        .as_deref()
        .and_then(|level| match level.parse::<LevelFilter>() {
            Ok(filter) => Some(filter),
            Err(_) => {
                warn!("Unknown log_level '{}', using info", level);
                None
            }
        })
        .unwrap_or(LevelFilter::Info);

    let output_lines = match config.task.output_lines {
        Some(n) if n > MAX_OUTPUT_LINES => {
            warn!("output_lines {} is too large, using {}", n, MAX_OUTPUT_LINES);
            MAX_OUTPUT_LINES
        }
        Some(n) => n,
        None => DEFAULT_OUTPUT_LINES,
    };

    let word_count = match config.game.default_word_count {
        Some(0) | None => DEFAULT_WORD_COUNT,
        Some(n) => n,
    };

    ResolvedConfig {
        force_exit,
        keep_alive,
        ask_before_playing,
        language,
        log_level,
        word_count,
        tick: Duration::from_millis(config.game.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(1)),
        output_cap,
        stop_grace: Duration::from_millis(
            config.task.stop_grace_ms.unwrap_or(DEFAULT_STOP_GRACE_MS),
        ),
        output_lines,
    }
}

fn env_bool(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let value = env(key)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring invalid {} '{}'", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&DevTyperConfig::default(), &CliOverrides::default(), no_env);
        assert!(!resolved.force_exit);
        assert!(resolved.keep_alive);
        assert!(resolved.ask_before_playing);
        assert_eq!(resolved.language, None);
        assert_eq!(resolved.log_level, LevelFilter::Info);
        assert_eq!(resolved.word_count, DEFAULT_WORD_COUNT);
        assert_eq!(resolved.tick, Duration::from_millis(100));
        assert_eq!(resolved.output_cap, 102_400);
        assert_eq!(resolved.stop_grace, Duration::from_millis(100));
        assert_eq!(resolved.output_lines, 8);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = DevTyperConfig {
            general: GeneralConfig {
                force_exit: Some(true),
                keep_alive: Some(false),
                ask_before_playing: Some(false),
                default_language: Some(Language::Rust),
                log_level: Some("debug".to_string()),
            },
            game: GameConfig {
                default_word_count: Some(50),
                tick_ms: Some(40),
            },
            task: TaskConfig {
                output_cap_bytes: Some(4096),
                stop_grace_ms: Some(250),
                output_lines: Some(3),
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert!(resolved.force_exit);
        assert!(!resolved.keep_alive);
        assert!(!resolved.ask_before_playing);
        assert_eq!(resolved.language, Some(Language::Rust));
        assert_eq!(resolved.log_level, LevelFilter::Debug);
        assert_eq!(resolved.word_count, 50);
        assert_eq!(resolved.tick, Duration::from_millis(40));
        assert_eq!(resolved.output_cap, 4096);
        assert_eq!(resolved.stop_grace, Duration::from_millis(250));
        assert_eq!(resolved.output_lines, 3);
    }

    #[test]
    fn test_env_overrides_config() {
        let config = DevTyperConfig {
            general: GeneralConfig {
                keep_alive: Some(true),
                default_language: Some(Language::Go),
                ..Default::default()
            },
            task: TaskConfig {
                output_cap_bytes: Some(10),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = env_from(&[
            ("DEVTYPER_FORCE_EXIT", "1"),
            ("DEVTYPER_KEEP_ALIVE", "false"),
            ("DEVTYPER_LANG", "js"),
            ("DEVTYPER_OUTPUT_CAP", "2048"),
        ]);
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert!(resolved.force_exit);
        assert!(!resolved.keep_alive);
        assert_eq!(resolved.language, Some(Language::JavaScript));
        assert_eq!(resolved.output_cap, 2048);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let env = env_from(&[
            ("DEVTYPER_KEEP_ALIVE", "maybe"),
            ("DEVTYPER_LANG", "cobol"),
            ("DEVTYPER_OUTPUT_CAP", "lots"),
        ]);
        let resolved = resolve_with_env(&DevTyperConfig::default(), &CliOverrides::default(), env);
        assert!(resolved.keep_alive);
        assert_eq!(resolved.language, None);
        assert_eq!(resolved.output_cap, DEFAULT_OUTPUT_CAP);
    }

    #[test]
    fn test_cli_wins() {
        let env = env_from(&[("DEVTYPER_KEEP_ALIVE", "true"), ("DEVTYPER_LANG", "go")]);
        let cli = CliOverrides {
            force_exit: true,
            keep_alive: Some(false),
            yes: true,
            language: Some(Language::Generic),
        };
        let resolved = resolve_with_env(&DevTyperConfig::default(), &cli, env);
        assert!(resolved.force_exit);
        assert!(!resolved.keep_alive);
        assert!(!resolved.ask_before_playing);
        assert_eq!(resolved.language, Some(Language::Generic));
    }

    #[test]
    fn test_output_lines_are_clamped() {
        let config = DevTyperConfig {
            task: TaskConfig {
                output_lines: Some(65_535),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.output_lines, MAX_OUTPUT_LINES);
    }

    #[test]
    fn test_toml_parses() {
        let toml_str = r#"
[general]
force_exit = true
default_language = "javascript"
log_level = "warn"

[game]
default_word_count = 25

[task]
output_cap_bytes = 2048
"#;
        let config: DevTyperConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.force_exit, Some(true));
        assert_eq!(config.general.default_language, Some(Language::JavaScript));
        assert_eq!(config.game.default_word_count, Some(25));
        assert_eq!(config.task.output_cap_bytes, Some(2048));
        assert!(config.task.stop_grace_ms.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing, everything else stays default
        let toml_str = r#"
[game]
tick_ms = 50
"#;
        let config: DevTyperConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.tick_ms, Some(50));
        assert!(config.general.force_exit.is_none());
        assert!(config.task.output_lines.is_none());
    }

    #[test]
    fn test_generated_default_parses_as_empty() {
        let config: DevTyperConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.general.default_language.is_none());
        assert!(config.game.tick_ms.is_none());
    }

    #[test]
    fn test_missing_file_generates_default() {
        let dir = std::env::temp_dir().join(format!("devtyper-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let config = load_config_from(&path).unwrap();
        assert!(config.general.force_exit.is_none());
        assert!(path.exists());

        fs::write(&path, "[general\nbroken").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));

        let _ = fs::remove_dir_all(&dir);
    }
}
