//! Shared crate-wide constants.

use std::time::Duration;

/// How often the idle tracker samples whether any input arrived.
///
/// Idle time therefore has a resolution of this interval: input observed
/// between two samples only moves the last-activity timestamp at the next
/// sample.
pub const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Debounce applied to position writes. Every confirmed move re-arms the
/// deadline so a drag produces a single write.
pub const POSITION_WRITE_DELAY: Duration = Duration::from_secs(10);

/// Window in which an `Esc` followed by another key is read as `Alt+key`.
pub const ESCAPE_CHORD_TIMEOUT: Duration = Duration::from_millis(250);

/// Name used for the workspace created at startup when none are configured.
pub const DEFAULT_WORKSPACE_NAME: &str = "default";

/// Label shown for workspaces created without a name.
pub const UNNAMED_WORKSPACE_LABEL: &str = "(noname)";

/// Taskbar label for windows without a title.
pub const UNTITLED_WINDOW_LABEL: &str = "(untitled)";

/// Marker drawn in the top border of tagged windows.
pub const TAG_MARKER: &str = "[T]";

/// File `dump-screen` writes to when no `dump-file` is configured.
pub const DEFAULT_DUMP_FILE: &str = "term-ws-dump.txt";

/// Default location of the configuration file under the user config dir.
pub const CONFIG_DIR_NAME: &str = "term-ws";
