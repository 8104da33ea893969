use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("NekoCore error: {0}")]
    NekoCore(#[from] nekocore::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] toml::de::Error),

    #[error("Settings write error: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    #[error("No configuration directory available on this system")]
    NoConfigDir,

    #[error("Project file {path} is not a translation project: {message}")]
    InvalidProject { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
