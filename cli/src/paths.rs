//! Path utilities for facecluster applications.

use std::io;
use std::path::PathBuf;

/// Default base directory name.
pub const DEFAULT_BASE_DIR: &str = ".facecluster";

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Provides access to the facecluster directory structure.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Application name.
    pub app_name: String,
    /// User's home directory.
    pub home_dir: PathBuf,
}

impl Paths {
    /// Creates a new Paths instance for the given app.
    pub fn new(app_name: impl Into<String>) -> io::Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self {
            app_name: app_name.into(),
            home_dir,
        })
    }

    /// Returns the base directory (~/.facecluster).
    pub fn base_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_BASE_DIR)
    }

    /// Returns the app-specific directory (~/.facecluster/<app>).
    pub fn app_dir(&self) -> PathBuf {
        self.base_dir().join(&self.app_name)
    }

    /// Returns the config file path (~/.facecluster/<app>/config.yaml).
    pub fn config_file(&self) -> PathBuf {
        self.app_dir().join(DEFAULT_CONFIG_FILE)
    }

    /// Returns the data directory (~/.facecluster/<app>/data), where the
    /// cluster snapshot lives by default.
    pub fn data_dir(&self) -> PathBuf {
        self.app_dir().join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> Paths {
        Paths {
            app_name: "testapp".into(),
            home_dir: PathBuf::from("/home/tester"),
        }
    }

    #[test]
    fn test_paths_structure() {
        let paths = paths();
        assert_eq!(paths.base_dir(), PathBuf::from("/home/tester/.facecluster"));
        assert!(paths.app_dir().ends_with("testapp"));
        assert!(paths.config_file().ends_with("testapp/config.yaml"));
        assert!(paths.data_dir().ends_with("testapp/data"));
    }
}
