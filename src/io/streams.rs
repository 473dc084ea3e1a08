use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to open source stream {path}: {source}")]
    OpenSource {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open sink stream {path}: {source}")]
    OpenSink {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read from source stream: {0}")]
    Read(std::io::Error),

    #[error("failed to write to sink stream: {0}")]
    Write(std::io::Error),

    #[error("failed to flush sink stream: {0}")]
    Flush(std::io::Error),
}

/// Opens the readable byte source the producer will drain.
pub fn open_source(path: &Path) -> Result<BufReader<File>, StreamError> {
    let file = File::open(path).map_err(|source| StreamError::OpenSource {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(BufReader::new(file))
}

/// Opens (creating or truncating) the writable byte sink the consumer fills.
pub fn open_sink(path: &Path) -> Result<BufWriter<File>, StreamError> {
    let file = File::create(path).map_err(|source| StreamError::OpenSink {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(BufWriter::new(file))
}
