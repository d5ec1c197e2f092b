use std::{env, io, path::PathBuf};

use anyhow::Result;

/// Resolves the application directory holding auth, store and log files.
/// `TSUMIAGE_DIR` overrides the platform default; otherwise the state goes
/// into `$XDG_STATE_HOME`/`$HOME/.local/state` (or `%APPDATA%` on Windows).
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = match env::var("TSUMIAGE_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            #[cfg(windows)]
            {
                let mut path = PathBuf::from(
                    env::var("APPDATA").expect("APPDATA should be present on Windows"),
                );
                path.push("tsumiage");
                path
            }
            #[cfg(not(windows))]
            {
                let mut path = env::var("XDG_STATE_HOME")
                    .map(PathBuf::from)
                    .or_else(|_| {
                        env::var("HOME").map(|home| {
                            let mut path = PathBuf::from(home);
                            path.push(".local/state");
                            path
                        })
                    })
                    .expect("Couldn't find neither XDG_STATE_HOME nor HOME");
                path.push("tsumiage");
                path
            }
        }
    };

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
