//! File appender implementation

use crate::core::{Appender, Encoder, EncoderConfig, LoggerError, OutputFormat, Record, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FileAppender {
    path: PathBuf,
    writer: BufWriter<File>,
    encoder: Box<dyn Encoder>,
    buf: Vec<u8>,
}

impl FileAppender {
    /// Append plain text records to `path`, creating it if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_encoder(path, OutputFormat::Console.encoder(EncoderConfig::new()))
    }

    pub fn with_encoder(path: impl Into<PathBuf>, encoder: Box<dyn Encoder>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            encoder,
            buf: Vec::with_capacity(256),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::io_operation(
                "opening log output",
                format!("cannot open '{}'", path.display()),
                e,
            )
        })
}

impl Appender for FileAppender {
    fn append(&mut self, record: &Record) -> Result<()> {
        self.buf.clear();
        self.encoder.encode(record, &mut self.buf)?;
        self.writer.write_all(&self.buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
