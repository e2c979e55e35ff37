use thiserror::Error;

use crate::Handle;

#[derive(Error, Debug)]
pub enum ObjectStreamError {
    #[error("Invalid stream header: magic 0x{magic:04X}, version {version}")]
    MalformedHeader { magic: u16, version: u16 },
    #[error("Illegal content element tag 0x{tag:02X} at offset {offset}")]
    IllegalContentTag { tag: u8, offset: usize },
    #[error("Illegal field type code 0x{code:02X} at offset {offset}")]
    IllegalFieldTypeCode { code: u8, offset: usize },
    #[error("Illegal classDescFlags 0x{flags:02X} at offset {offset}")]
    IllegalClassDescFlags { flags: u8, offset: usize },
    #[error("Unknown handle {0}")]
    UnknownHandle(Handle),
    #[error("Handle {handle} refers to a {found}, expected a {expected}")]
    UnexpectedEntity {
        handle: Handle,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Unable to parse externalContents of {class}, the format is specific to the implementation class")]
    UnsupportedExternalContents { class: String },
    #[error("Missing class descriptor at offset {offset}")]
    MissingClassDesc { offset: usize },
    #[error("Illegal array class descriptor: {name:?}")]
    IllegalArrayClassDesc { name: String },
    #[error("Read of {requested} bytes at offset {offset} exceeds the {remaining} remaining")]
    OutOfRange {
        offset: usize,
        requested: usize,
        remaining: usize,
    },
    #[error("Nesting depth exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

impl ObjectStreamError {
    /// A rejected header is reported as invalid input; everything else aborts
    /// a decode that had already started.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ObjectStreamError::MalformedHeader { .. })
    }
}
