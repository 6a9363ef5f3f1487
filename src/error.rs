/// Errors raised while loading level data. The simulation itself is infallible.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level table is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("level {level}: missing or malformed `{key}`")]
    MissingKey { level: usize, key: String },
    #[error("level {0} has no platforms")]
    NoPlatforms(usize),
    #[error("level {0} does not exist")]
    UnknownLevel(usize),
}
