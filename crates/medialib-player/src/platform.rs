use std::path::{Path, PathBuf};

use crate::player_db::{PlayerDatabase, PlayerDef};

/// Locate an executable on `PATH`.
///
/// Names containing a path separator are checked as-is.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 {
        return direct.is_file().then(|| direct.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    search_dirs(name, std::env::split_paths(&paths))
}

/// Look for `name` in each directory, trying platform suffixes.
pub fn search_dirs(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter().find_map(|dir| {
        candidate_names(name)
            .into_iter()
            .map(|candidate| dir.join(candidate))
            .find(|path| path.is_file())
    })
}

#[cfg(target_os = "windows")]
fn candidate_names(name: &str) -> Vec<String> {
    if name.to_ascii_lowercase().ends_with(".exe") {
        vec![name.to_string()]
    } else {
        vec![format!("{name}.exe"), name.to_string()]
    }
}

#[cfg(not(target_os = "windows"))]
fn candidate_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

/// First executable of `def` present on this machine.
pub fn locate(def: &PlayerDef) -> Option<PathBuf> {
    def.executables.iter().find_map(|exe| find_executable(exe))
}

/// Every enabled player that is installed, in database order.
pub fn installed(db: &PlayerDatabase) -> Vec<(&PlayerDef, PathBuf)> {
    db.enabled()
        .filter_map(|def| locate(def).map(|path| (def, path)))
        .collect()
}
