//! Runtime configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indoc::indoc;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_DIR_NAME, DEFAULT_DUMP_FILE, ESCAPE_CHORD_TIMEOUT, IDLE_CHECK_INTERVAL,
    POSITION_WRITE_DELAY,
};
use crate::error::{WmError, WmResult};
use crate::keybindings::KeyBindings;

/// Annotated configuration printed by `--print-config`.
pub const EXAMPLE_CONFIG: &str = indoc! {r#"
    # Remember window positions by title across sessions.
    remember-positions = true
    # positions-file = "/home/me/.config/term-ws/positions.toml"
    # log-file = "/tmp/term-ws.log"
    idle-check-interval-secs = 5
    position-write-delay-secs = 10
    escape-chord-millis = 250
    # Command run by the "Run pager" action; the terminal is handed over
    # until it exits.
    # pager = "less -R /tmp/term-ws.log"
    # Where dump-screen writes the screen text.
    # dump-file = "/tmp/term-ws-dump.txt"

    [[workspaces]]
    name = "chat"
    # Windows whose title contains one of these go here.
    window-titles = ["Chat"]
    # Windows whose name contains one of these go here.
    window-names = ["conversation"]

    [[workspaces]]
    name = "work"

    [keys]
    window-next = "alt+n"
    workspace-new = "f9"
"#};

/// Workspace declared in the config, with its placement rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WorkspaceConfig {
    pub name: String,
    /// Substrings matched against a new window's name.
    pub window_names: Vec<String>,
    /// Substrings matched against a new window's title. Title rules win
    /// over name rules.
    pub window_titles: Vec<String>,
}

/// Window manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub remember_positions: bool,
    pub positions_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub idle_check_interval_secs: u64,
    pub position_write_delay_secs: u64,
    pub escape_chord_millis: u64,
    pub pager: Option<String>,
    pub dump_file: Option<PathBuf>,
    pub workspaces: Vec<WorkspaceConfig>,
    /// `action-name = "combo [combo ...]"` overrides.
    pub keys: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remember_positions: true,
            positions_file: None,
            log_file: None,
            idle_check_interval_secs: IDLE_CHECK_INTERVAL.as_secs(),
            position_write_delay_secs: POSITION_WRITE_DELAY.as_secs(),
            escape_chord_millis: ESCAPE_CHORD_TIMEOUT.as_millis() as u64,
            pager: None,
            dump_file: None,
            workspaces: Vec::new(),
            keys: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> WmResult<Self> {
        toml::from_str(text).map_err(|source| WmError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> WmResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let config = Self::parse(&text, path)?;
                tracing::info!(?path, workspaces = config.workspaces.len(), "loaded configuration");
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(?path, "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Load from the user config directory, falling back to defaults on
    /// any error.
    pub fn load_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(?path, error = %err, "failed to load config");
                Self::default()
            }
        }
    }

    /// Where positions are persisted, or `None` when remembering is off.
    pub fn positions_path(&self) -> Option<PathBuf> {
        if !self.remember_positions {
            return None;
        }
        self.positions_file
            .clone()
            .or_else(|| dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).join("positions.toml")))
    }

    /// Target of `dump-screen`, relative to the working directory unless
    /// configured.
    pub fn dump_path(&self) -> PathBuf {
        self.dump_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_FILE))
    }

    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_secs(self.idle_check_interval_secs.max(1))
    }

    pub fn position_write_delay(&self) -> Duration {
        Duration::from_secs(self.position_write_delay_secs)
    }

    pub fn escape_chord_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_chord_millis)
    }

    /// Split the pager command line the way a shell would.
    pub fn pager_command(&self) -> Option<Vec<String>> {
        let pager = self.pager.as_deref()?;
        match shell_words::split(pager) {
            Ok(words) if !words.is_empty() => Some(words),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(%pager, error = %err, "invalid pager command");
                None
            }
        }
    }

    /// Default bindings with the `[keys]` overrides applied.
    pub fn keybindings(&self) -> WmResult<KeyBindings> {
        let mut kb = KeyBindings::default();
        kb.apply_overrides(self.keys.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        Ok(kb)
    }
}

/// `config.toml` under the platform config directory (`$XDG_CONFIG_HOME`
/// on Linux, `Application Support` on macOS, `%APPDATA%` on Windows).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::Action;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn example_config_parses() {
        let config = Config::parse(EXAMPLE_CONFIG, Path::new("example.toml")).expect("valid");
        assert_eq!(config.workspaces.len(), 2);
        assert_eq!(config.workspaces[0].window_titles, vec!["Chat"]);
        assert!(config.remember_positions);
        assert!(config.keybindings().is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("", Path::new("empty.toml")).expect("valid");
        assert_eq!(config, Config::default());
        assert_eq!(config.idle_check_interval(), IDLE_CHECK_INTERVAL);
        assert_eq!(config.position_write_delay(), POSITION_WRITE_DELAY);
    }

    #[test]
    fn parse_error_names_the_file() {
        let err = Config::parse("remember-positions = 3", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(&dir.path().join("absent.toml")).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn remember_positions_off_disables_path() {
        let config = Config {
            remember_positions: false,
            positions_file: Some(PathBuf::from("/tmp/p.toml")),
            ..Config::default()
        };
        assert!(config.positions_path().is_none());
    }

    #[test]
    fn default_paths_live_under_the_platform_config_dir() {
        let config = Config::default();
        assert_eq!(config.dump_path(), PathBuf::from(DEFAULT_DUMP_FILE));
        let Some(base) = dirs::config_dir() else {
            return;
        };
        let dir = base.join(CONFIG_DIR_NAME);
        assert_eq!(default_config_path(), Some(dir.join("config.toml")));
        assert_eq!(config.positions_path(), Some(dir.join("positions.toml")));
    }

    #[test]
    fn pager_command_is_shell_split() {
        let config = Config {
            pager: Some("less -R 'my log.txt'".into()),
            ..Config::default()
        };
        assert_eq!(
            config.pager_command(),
            Some(vec!["less".into(), "-R".into(), "my log.txt".into()])
        );
    }

    #[test]
    fn key_overrides_flow_into_bindings() {
        let text = indoc! {r#"
            [keys]
            window-close = "ctrl+w"
        "#};
        let config = Config::parse(text, Path::new("keys.toml")).expect("valid");
        let kb = config.keybindings().expect("valid keys");
        let ev = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::WindowClose, &ev));
    }
}
