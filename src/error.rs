use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StereoError {
    #[error("Dimension mismatch: depth map is {depth_width}x{depth_height}, pattern is {pattern_width}x{pattern_height}")]
    DimensionMismatch {
        depth_width: u32,
        depth_height: u32,
        pattern_width: u32,
        pattern_height: u32,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Scaled pattern is empty ({width}x{height}); increase the pattern scale")]
    EmptyPattern { width: u32, height: u32 },

    #[error("Message too large: needs {required_bits} bits, image holds {available_bits} bits")]
    CapacityExceeded {
        required_bits: u64,
        available_bits: u64,
    },

    #[error("Incomplete header: image holds fewer than 32 embedded bits")]
    IncompleteHeader,

    #[error("Message data incomplete: header declares {declared_len} bytes, image holds at most {available_bytes}")]
    IncompleteMessage {
        declared_len: u32,
        available_bytes: u64,
    },

    #[error("Invalid encoding: hidden bytes are not valid UTF-8")]
    InvalidEncoding(#[from] FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, StereoError>;
