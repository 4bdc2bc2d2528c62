use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("root directory '{path}' is not accessible: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("root directory '{0}' is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("cannot derive a default root directory from the executable location")]
    NoDefaultRoot,

    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Process-wide settings, fixed at startup and shared read-only with every request.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical root directory that documents are served from.
    pub base_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsPaths>,
    /// Pass raw HTML embedded in documents through instead of escaping it.
    pub allow_raw_html: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = match lookup("BASE_DIR").filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_base_dir()?,
        };
        let base_dir = base_dir
            .canonicalize()
            .map_err(|source| ConfigError::RootUnavailable {
                path: base_dir.clone(),
                source,
            })?;
        if !base_dir.is_dir() {
            return Err(ConfigError::RootNotDirectory(base_dir));
        }

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let tls = match (lookup("CERT_PATH"), lookup("KEY_PATH")) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            }),
            _ => None,
        };

        let allow_raw_html = lookup("ALLOW_RAW_HTML")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(Self {
            base_dir,
            host,
            port,
            tls,
            allow_raw_html,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Last component of the root directory, shown in the page header.
    pub fn base_short(&self) -> String {
        self.base_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.base_dir.to_string_lossy().to_string())
    }
}

fn default_base_dir() -> Result<PathBuf, ConfigError> {
    let exe = env::current_exe().map_err(|_| ConfigError::NoDefaultRoot)?;
    default_root_for(&exe).ok_or(ConfigError::NoDefaultRoot)
}

/// Install root for an executable path.
///
/// Inside a cargo `target/` directory this is the project above `target/`;
/// otherwise it is the directory above the one holding the executable
/// (`<prefix>/bin/mdview` gives `<prefix>`).
fn default_root_for(exe: &Path) -> Option<PathBuf> {
    let exe_dir = exe.parent()?;
    if let Some(target) = exe_dir.ancestors().find(|dir| dir.file_name() == Some(OsStr::new("target"))) {
        return target.parent().map(Path::to_path_buf);
    }
    exe_dir.parent().map(Path::to_path_buf)
}
