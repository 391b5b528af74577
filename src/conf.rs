//! Configuration file utilities.
//!
//! Credentials are stored as YAML in `~/.tesla_cli/config.yaml`:
//!
//! ```yaml
//! username: elon@example.com
//! password: hunter2
//! vin: 5YJ3E1EA7KF000001
//! ```
//!
//! The password is stored in the clear, so `setup` creates the file
//! readable only by its owner where the platform allows it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory, relative to the user's home directory, that
/// holds the configuration file.
pub const CONFIG_DIR: &str = ".tesla_cli";

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "config.yaml";

/// Default location of the configuration file, or `None` if the user's
/// home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use tesla_cli::conf::default_path;
/// # use temp_env::with_var;
/// # with_var("HOME", Some("/home/elon"), || {
/// let path = default_path().unwrap();
/// assert_eq!(path.to_str().unwrap(), "/home/elon/.tesla_cli/config.yaml");
/// # });
/// ```
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Login details for an account, and the vehicle to operate on.
#[derive(Clone, Deserialize, PartialEq, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
    vin: String,
}

impl Credentials {
    /// Creates a new set of credentials.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        vin: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            vin: vin.into(),
        }
    }

    /// Reads credentials from the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::Missing(path.to_path_buf()),
            _ => Error::Io(err),
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Writes credentials to the YAML file at `path`, creating its parent
    /// directory if necessary.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_yaml::to_string(self)?;
        fs::write(path, contents)?;
        restrict_permissions(path)?;
        Ok(())
    }

    /// E-mail address used to log in.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password used to log in.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// VIN of the vehicle to operate on.
    pub fn vin(&self) -> &str {
        &self.vin
    }

    /// Uses `vin` as the vehicle to operate on.
    pub fn with_vin(mut self, vin: impl Into<String>) -> Self {
        self.vin = vin.into();
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("vin", &self.vin)
            .finish()
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// A configuration error.
#[derive(Debug, Error)]
pub enum Error {
    /// There is no configuration file.
    #[error("No configuration found at {}", .0.display())]
    Missing(PathBuf),

    /// The configuration file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The configuration file is not valid YAML, or is missing fields.
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_yaml::Error),
}
