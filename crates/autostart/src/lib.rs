//! Login autostart registration.
//!
//! Windows gets a batch file in the user's Startup folder, Linux an XDG
//! autostart desktop entry. Other platforms are unsupported.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Base name of the installed entry.
pub const ENTRY_NAME: &str = "steamwatch";

/// Errors for autostart operations.
#[derive(Debug, thiserror::Error)]
pub enum AutostartError {
    #[error("autostart is not supported on this platform")]
    Unsupported,

    #[error("could not determine the startup directory")]
    NoStartupDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Format of the startup entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `.bat` file run from the Windows Startup folder.
    WindowsBatch,
    /// `.desktop` file in `~/.config/autostart`.
    XdgDesktop,
}

impl EntryKind {
    fn file_name(&self) -> String {
        match self {
            EntryKind::WindowsBatch => format!("{ENTRY_NAME}.bat"),
            EntryKind::XdgDesktop => format!("{ENTRY_NAME}.desktop"),
        }
    }

    /// Renders the entry that launches `exe` with `args`.
    fn render(&self, exe: &Path, args: &[&str]) -> String {
        let args = args.join(" ");
        match self {
            EntryKind::WindowsBatch => format!(
                "@echo off\r\nstart \"\" /min \"{}\" {args}\r\n",
                exe.display().to_string().replace('%', "%%")
            ),
            EntryKind::XdgDesktop => format!(
                "[Desktop Entry]\n\
                 Type=Application\n\
                 Name=steamwatch\n\
                 Comment=Steam download monitor\n\
                 Exec={} {args}\n\
                 Terminal=false\n\
                 X-GNOME-Autostart-enabled=true\n",
                desktop_exec_quote(&exe.display().to_string())
            ),
        }
    }
}

/// Quotes one `Exec=` argument of a desktop entry.
///
/// Inside the quotes `"`, `` ` ``, `$` and `\` take a backslash, and the
/// value-level escaping then doubles every backslash. `%` starts a field
/// code, so a literal one is written as `%%`.
fn desktop_exec_quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        match c {
            '"' | '`' | '$' => {
                out.push_str("\\\\");
                out.push(c);
            }
            '\\' => out.push_str("\\\\\\\\"),
            '%' => out.push_str("%%"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Manages the startup entry in a single directory.
#[derive(Debug, Clone)]
pub struct Autostart {
    kind: EntryKind,
    dir: PathBuf,
}

impl Autostart {
    /// Creates a manager for the current platform's startup directory.
    pub fn for_current_platform() -> Result<Self, AutostartError> {
        let (kind, dir) = platform_startup_dir()?;
        Ok(Self { kind, dir })
    }

    /// Creates a manager for a custom directory.
    pub fn with_dir(kind: EntryKind, dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            dir: dir.into(),
        }
    }

    /// Path of the startup entry file.
    pub fn entry_path(&self) -> PathBuf {
        self.dir.join(self.kind.file_name())
    }

    /// Returns true if the startup entry exists.
    pub fn is_installed(&self) -> bool {
        self.entry_path().is_file()
    }

    /// Writes the startup entry, replacing any previous one.
    pub fn install(&self, exe: &Path, args: &[&str]) -> Result<PathBuf, AutostartError> {
        let path = self.entry_path();
        fs::create_dir_all(&self.dir)?;

        let mut file = fs::File::create(&path)?;
        file.write_all(self.kind.render(exe, args).as_bytes())?;

        tracing::info!(path = %path.display(), "autostart entry installed");
        Ok(path)
    }

    /// Deletes the startup entry. Returns false if there was none.
    pub fn remove(&self) -> Result<bool, AutostartError> {
        let path = self.entry_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "autostart entry removed");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(target_os = "windows")]
fn platform_startup_dir() -> Result<(EntryKind, PathBuf), AutostartError> {
    let appdata = std::env::var_os("APPDATA").ok_or(AutostartError::NoStartupDir)?;
    let dir = PathBuf::from(appdata)
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("Startup");
    Ok((EntryKind::WindowsBatch, dir))
}

#[cfg(target_os = "linux")]
fn platform_startup_dir() -> Result<(EntryKind, PathBuf), AutostartError> {
    let config = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(AutostartError::NoStartupDir)?;
    Ok((EntryKind::XdgDesktop, config.join("autostart")))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn platform_startup_dir() -> Result<(EntryKind, PathBuf), AutostartError> {
    Err(AutostartError::Unsupported)
}
