// https://docs.oracle.com/en/java/javase/17/docs/specs/serialization/protocol.html

mod class_desc;
mod class_desc_flags;
mod content;
mod cursor;
mod error;
mod field;
mod handles;
mod parser;
mod stream;
mod tag;

pub use class_desc::{ClassDescriptor, ClassDescriptorChain};
pub use class_desc_flags::ClassDescFlags;
pub use content::{Content, Entity};
pub use cursor::BinaryCursor;
pub use error::ObjectStreamError;
pub use field::{FieldDescriptor, FieldValue};
pub use handles::{Handle, HandleTable, BASE_WIRE_HANDLE};
pub use parser::{DecoderOptions, StreamDecoder};
pub use stream::DecodedStream;
pub use tag::{Tag, TypeCode, STREAM_MAGIC, STREAM_VERSION};

pub type Result<T, E = ObjectStreamError> = std::result::Result<T, E>;

/// Decodes a complete version 2 object stream with default options.
pub fn decode_stream(bytes: &[u8]) -> Result<DecodedStream> {
    StreamDecoder::new(bytes).decode()
}
