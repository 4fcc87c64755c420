//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--eager`, `--no-watcher`, `--log-file`)
//! 2. `--config <path>`
//! 3. `$MDNAV_CONFIG` environment variable (path to config file)
//! 4. Project-local `.mdnav.toml` in the current working directory
//! 5. Global `~/.config/mdnav/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::document::DEFAULT_SYNTAX_THEME;

// ── Section configs ──────────────────────────────────────────────────────────

/// Tree panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TreeConfig {
    /// Fixed preferred panel width; unset derives it from the widest label.
    pub width: Option<u16>,
    /// Directory scan strategy: "lazy" or "eager".
    pub scan: Option<String>,
    /// Whether the tree panel starts visible.
    pub show: Option<bool>,
}

/// Document rendering settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RenderConfig {
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
    /// Tab rendering width.
    pub tab_width: Option<usize>,
}

/// Filesystem watcher settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct WatcherConfig {
    /// Reload the open document when it changes on disk.
    pub enabled: Option<bool>,
}

/// Color overrides for the custom scheme.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub tree_fg: Option<String>,
    pub tree_dir_fg: Option<String>,
    pub tree_selected_bg: Option<String>,
    pub tree_selected_fg: Option<String>,
    pub tree_selected_inactive_bg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub border_focused_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// File to append logs to. Logging is off without one.
    pub file: Option<PathBuf>,
    /// Level for the `mdnav` target when `RUST_LOG` is unset.
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tree: TreeConfig,
    pub render: RenderConfig,
    pub watcher: WatcherConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

/// Default tab width.
pub const DEFAULT_TAB_WIDTH: usize = 4;

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path, which is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("MDNAV_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".mdnav.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mdnav").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            tree: TreeConfig {
                width: other.tree.width.or(self.tree.width),
                scan: other.tree.scan.clone().or(self.tree.scan),
                show: other.tree.show.or(self.tree.show),
            },
            render: RenderConfig {
                syntax_theme: other
                    .render
                    .syntax_theme
                    .clone()
                    .or(self.render.syntax_theme),
                tab_width: other.render.tab_width.or(self.render.tab_width),
            },
            watcher: WatcherConfig {
                enabled: other.watcher.enabled.or(self.watcher.enabled),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                level: other.log.level.clone().or(self.log.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so higher ones overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn tree_width(&self) -> Option<u16> {
        self.tree.width
    }

    /// Whether the whole tree is scanned up front instead of on expansion.
    pub fn eager_scan(&self) -> bool {
        self.tree
            .scan
            .as_deref()
            .is_some_and(|scan| scan.eq_ignore_ascii_case("eager"))
    }

    pub fn tree_visible(&self) -> bool {
        self.tree.show.unwrap_or(true)
    }

    /// Syntax highlighting theme name.
    pub fn syntax_theme_name(&self) -> &str {
        self.render
            .syntax_theme
            .as_deref()
            .unwrap_or(DEFAULT_SYNTAX_THEME)
    }

    pub fn tab_width(&self) -> usize {
        self.render.tab_width.unwrap_or(DEFAULT_TAB_WIDTH)
    }

    /// Whether the watcher is enabled.
    pub fn watcher_enabled(&self) -> bool {
        self.watcher.enabled.unwrap_or(true)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log.file.as_deref()
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log.level.as_deref()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.tree_width(), None);
        assert!(!cfg.eager_scan());
        assert!(cfg.tree_visible());
        assert_eq!(cfg.syntax_theme_name(), "base16-ocean.dark");
        assert_eq!(cfg.tab_width(), 4);
        assert!(cfg.watcher_enabled());
        assert_eq!(cfg.theme_scheme(), "dark");
        assert!(cfg.log_file().is_none());
        assert!(cfg.log_level().is_none());
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[tree]
width = 40
scan = "eager"
show = false

[render]
syntax_theme = "Solarized (dark)"
tab_width = 8

[watcher]
enabled = false

[theme]
scheme = "light"

[log]
file = "/tmp/mdnav.log"
level = "debug"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.tree_width(), Some(40));
        assert!(cfg.eager_scan());
        assert!(!cfg.tree_visible());
        assert_eq!(cfg.syntax_theme_name(), "Solarized (dark)");
        assert_eq!(cfg.tab_width(), 8);
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.theme_scheme(), "light");
        assert_eq!(cfg.log_file(), Some(Path::new("/tmp/mdnav.log")));
        assert_eq!(cfg.log_level(), Some("debug"));
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[render]
tab_width = 2
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.tab_width(), 2);
        assert_eq!(cfg.syntax_theme_name(), "base16-ocean.dark");
        assert!(cfg.watcher_enabled());
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(!cfg.eager_scan());
        assert!(cfg.tree_visible());
    }

    #[test]
    fn test_unknown_scan_value_is_lazy() {
        let cfg: AppConfig = toml::from_str("[tree]\nscan = \"sometimes\"").expect("parse");
        assert!(!cfg.eager_scan());
        let cfg: AppConfig = toml::from_str("[tree]\nscan = \"EAGER\"").expect("parse");
        assert!(cfg.eager_scan());
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            render: RenderConfig {
                syntax_theme: Some("InspiredGitHub".to_string()),
                tab_width: Some(2),
            },
            ..Default::default()
        };
        let over = AppConfig {
            render: RenderConfig {
                tab_width: Some(8),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert_eq!(merged.tab_width(), 8);
        assert_eq!(merged.syntax_theme_name(), "InspiredGitHub");
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            watcher: WatcherConfig {
                enabled: Some(false),
            },
            log: LogConfig {
                file: Some(PathBuf::from("a.log")),
                level: None,
            },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert!(!merged.watcher_enabled());
        assert_eq!(merged.log_file(), Some(Path::new("a.log")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[tree]
scan = "eager"

[render]
tab_width = 3
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(cfg.eager_scan());
        assert_eq!(cfg.tab_width(), 3);
        assert!(cfg.tree_visible());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[watcher]
enabled = true

[render]
tab_width = 6
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            watcher: WatcherConfig {
                enabled: Some(false),
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert!(!cfg.watcher_enabled());
        assert_eq!(cfg.tab_width(), 6);
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
tree_fg = "#c0caf5"
border_fg = "#565f89"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.tree_fg.as_deref(), Some("#c0caf5"));
        assert_eq!(custom.border_fg.as_deref(), Some("#565f89"));
        assert!(custom.dialog_bg.is_none());
    }
}
