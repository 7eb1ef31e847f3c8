//! Core error types for Nanogame

#[derive(thiserror::Error, Debug)]
pub enum NanoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected end of stream while reading {0}")]
    EndOfStream(&'static str),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("VarInt too long")]
    VarIntTooLong,

    #[error("String is too long: {0} bytes")]
    StringTooLong(i32),

    #[error("Invalid frame length: {0}")]
    FrameLength(i32),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    #[error("Username already in use: {0}")]
    NameTaken(String),

    #[error("No packet received for {0:?}")]
    IdleTimeout(std::time::Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NanoError {
    /// True for failures of the byte stream itself rather than of its contents.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Io(_) | Self::EndOfStream(_) | Self::ConnectionClosed)
    }
}

pub type Result<T> = std::result::Result<T, NanoError>;
