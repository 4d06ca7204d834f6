//! Console appender implementation

use crate::core::{Appender, EncoderConfig, Encoder, OutputFormat, Record, Result};
use std::io::Write;

/// Standard stream a [`ConsoleAppender`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

pub struct ConsoleAppender {
    stream: ConsoleStream,
    encoder: Box<dyn Encoder>,
    buf: Vec<u8>,
}

impl ConsoleAppender {
    /// Colored text output on stdout
    pub fn new() -> Self {
        Self::with_encoder(
            ConsoleStream::Stdout,
            OutputFormat::Console.encoder(EncoderConfig::new().with_color(true)),
        )
    }

    pub fn with_encoder(stream: ConsoleStream, encoder: Box<dyn Encoder>) -> Self {
        Self {
            stream,
            encoder,
            buf: Vec::with_capacity(256),
        }
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &Record) -> Result<()> {
        self.buf.clear();
        self.encoder.encode(record, &mut self.buf)?;

        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().lock().write_all(&self.buf)?,
            ConsoleStream::Stderr => std::io::stderr().lock().write_all(&self.buf)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}
