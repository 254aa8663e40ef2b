use std::path::{Path, PathBuf};

use crate::SteamError;
use crate::paths::find_base_dir_in;

/// Returns the Steam base directory on Linux.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(SteamError::NotFound)?;
    find_base_dir_in(&candidates(&home)).ok_or(SteamError::NotFound)
}

/// Well-known Steam roots under a home directory, in lookup order.
fn candidates(home: &Path) -> Vec<PathBuf> {
    vec![
        // Primary location: ~/.steam/steam
        home.join(".steam").join("steam"),
        // Fallback: ~/.local/share/Steam
        home.join(".local").join("share").join("Steam"),
        // Flatpak location
        home.join(".var")
            .join("app")
            .join("com.valvesoftware.Steam")
            .join(".steam")
            .join("steam"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_order() {
        let list = candidates(Path::new("/home/deck"));
        assert_eq!(list[0], PathBuf::from("/home/deck/.steam/steam"));
        assert_eq!(list[1], PathBuf::from("/home/deck/.local/share/Steam"));
        assert!(list[2].ends_with("com.valvesoftware.Steam/.steam/steam"));
    }

    #[test]
    fn falls_back_to_local_share() {
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join(".local/share/Steam");
        std::fs::create_dir_all(&local).unwrap();

        assert_eq!(find_base_dir_in(&candidates(tmp.path())), Some(local));
    }
}
