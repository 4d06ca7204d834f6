//! Appender implementations

pub mod console;
pub mod file;
pub mod memory;

pub use console::{ConsoleAppender, ConsoleStream};
pub use file::FileAppender;
pub use memory::MemoryAppender;

pub use crate::core::Appender;

use crate::core::{Encoder, Result};
use std::io::Write;

/// Appender for an output destination: `stdout`, `stderr`, or a file path
pub fn for_path(path: &str, encoder: Box<dyn Encoder>) -> Result<Box<dyn Appender>> {
    Ok(match path {
        "stdout" => Box::new(ConsoleAppender::with_encoder(ConsoleStream::Stdout, encoder)),
        "stderr" => Box::new(ConsoleAppender::with_encoder(ConsoleStream::Stderr, encoder)),
        _ => Box::new(FileAppender::with_encoder(path, encoder)?),
    })
}

/// Raw writer for an error output destination
pub fn error_output_for_path(path: &str) -> Result<Box<dyn Write + Send>> {
    Ok(match path {
        "stdout" => Box::new(std::io::stdout()),
        "stderr" => Box::new(std::io::stderr()),
        _ => Box::new(file::open_append(std::path::Path::new(path))?),
    })
}
