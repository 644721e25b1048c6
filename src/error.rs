use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("settings database error: {0}")]
    Settings(#[from] rusqlite::Error),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image: {0}")]
    ImageWrite(#[from] image::ImageError),

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid duration '{value}': {source}")]
    Duration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("could not determine {0} directory")]
    NoProjectDir(&'static str),

    #[error("no scanned code matches id '{0}'")]
    UnknownId(String),

    #[error("id prefix '{0}' matches more than one scanned code")]
    AmbiguousId(String),

    #[error("{0} image(s) could not be read")]
    ScanFailed(usize),

    #[error("nothing to encode: text is empty")]
    EmptyText,

    #[error("text does not fit in a QR code")]
    TextTooLong,

    #[error("QR image would be {0} px wide, the limit is {max} px", max = crate::generate::MAX_IMAGE_SIDE)]
    ImageTooLarge(u64),

    #[error("'{0}' is not an openable URL")]
    NotAUrl(String),

    #[error("failed to launch {program}: {reason}")]
    Launch { program: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
