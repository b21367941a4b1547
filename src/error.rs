use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UngzError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid gzip header: {0}")]
    InvalidHeader(String),

    #[error("block {block}: unsupported block type {btype} (only dynamic Huffman is handled)")]
    UnsupportedBlockType { btype: u8, block: usize },

    #[error("malformed Huffman code: {0}")]
    MalformedHuffmanCode(&'static str),

    #[error("length repeat code with no previous length")]
    InvalidRunLengthContext,

    #[error("code length run overflows the table")]
    RunLengthOverflow,

    #[error("back-reference distance {distance} exceeds the {available} bytes decoded so far")]
    InvalidBackReference { distance: usize, available: usize },

    #[error("compressed stream ended while more bits were required")]
    StreamExhausted,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl UngzError {
    pub fn invalid_header<T: fmt::Display>(msg: T) -> Self {
        UngzError::InvalidHeader(msg.to_string())
    }

    pub fn invalid_argument<T: fmt::Display>(msg: T) -> Self {
        UngzError::InvalidArgument(msg.to_string())
    }
}

pub type UngzResult<T> = Result<T, UngzError>;
