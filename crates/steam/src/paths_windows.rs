use std::path::PathBuf;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

use crate::SteamError;
use crate::paths::find_base_dir_in;

/// Default install location when the registry has nothing.
const DEFAULT_INSTALL_DIR: &str = "C:/Program Files (x86)/Steam";

/// Returns the Steam base directory on Windows using the registry.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    // Per-user key written by the running client.
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    if let Ok(path) = read_registry(&hkcu, r"Software\Valve\Steam", "SteamPath") {
        return Ok(path);
    }

    // Machine-wide install keys, 64-bit view first.
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    for subkey in [r"SOFTWARE\Wow6432Node\Valve\Steam", r"SOFTWARE\Valve\Steam"] {
        if let Ok(path) = read_registry(&hklm, subkey, "InstallPath") {
            return Ok(path);
        }
    }

    tracing::debug!("steam not in registry, trying default directory");
    find_base_dir_in(&[PathBuf::from(DEFAULT_INSTALL_DIR)]).ok_or(SteamError::NotFound)
}

fn read_registry(root: &RegKey, subkey: &str, value: &str) -> Result<PathBuf, SteamError> {
    let key = root.open_subkey(subkey).map_err(|_| SteamError::NotFound)?;
    let path: String = key.get_value(value).map_err(|_| SteamError::NotFound)?;
    Ok(PathBuf::from(path))
}
