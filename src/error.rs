use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// failures at the edges of the machine. nothing the interpreter does while
/// running a program is an error: it halts or carries on instead
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("program image is empty")]
    EmptyProgram,
    #[error("no such key: 0x{0:02x}")]
    InvalidKey(u8),
    #[error("sound error: {0}")]
    Sound(String),
}
