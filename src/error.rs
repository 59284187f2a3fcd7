use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing a sliced dataset. All of them abort the batch.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("{path}: sampling rate is expected to be {expected} Hz, found {found} Hz")]
    SampleRateMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("{split}: clean sliced ({clean} rows) and noisy sliced ({noisy} rows) are not of the same size")]
    ChannelSizeMismatch {
        split: String,
        clean: usize,
        noisy: usize,
    },

    #[error("{channel}/{split}: sliced matrix has {rows} rows but the file index declares {declared}")]
    SizeMismatch {
        split: String,
        channel: String,
        rows: usize,
        declared: usize,
    },

    #[error("{path}: expected a single-channel waveform, found {channels} channels")]
    UnsupportedChannels { path: PathBuf, channels: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{path}: blank entry on line {line}")]
    InvalidFileList { path: PathBuf, line: usize },

    #[error("{path}: {msg}")]
    Decode { path: PathBuf, msg: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, PrepError>;
