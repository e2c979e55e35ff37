use std::{convert::TryFrom, fmt};

pub const STREAM_MAGIC: u16 = 0xACED;
pub const STREAM_VERSION: u16 = 5;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Tag {
    Null = 0x70,
    Reference = 0x71,
    ClassDesc = 0x72,
    Object = 0x73,
    String = 0x74,
    Array = 0x75,
    Class = 0x76,
    BlockData = 0x77,
    EndBlockData = 0x78,
    BlockDataLong = 0x7A,
    LongString = 0x7C,
    ProxyClassDesc = 0x7D,
    Enum = 0x7E,
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x70 => Ok(Tag::Null),
            0x71 => Ok(Tag::Reference),
            0x72 => Ok(Tag::ClassDesc),
            0x73 => Ok(Tag::Object),
            0x74 => Ok(Tag::String),
            0x75 => Ok(Tag::Array),
            0x76 => Ok(Tag::Class),
            0x77 => Ok(Tag::BlockData),
            0x78 => Ok(Tag::EndBlockData),
            0x7A => Ok(Tag::BlockDataLong),
            0x7C => Ok(Tag::LongString),
            0x7D => Ok(Tag::ProxyClassDesc),
            0x7E => Ok(Tag::Enum),
            _ => Err(value),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Null => "TC_NULL",
            Tag::Reference => "TC_REFERENCE",
            Tag::ClassDesc => "TC_CLASSDESC",
            Tag::Object => "TC_OBJECT",
            Tag::String => "TC_STRING",
            Tag::Array => "TC_ARRAY",
            Tag::Class => "TC_CLASS",
            Tag::BlockData => "TC_BLOCKDATA",
            Tag::EndBlockData => "TC_ENDBLOCKDATA",
            Tag::BlockDataLong => "TC_BLOCKDATALONG",
            Tag::LongString => "TC_LONGSTRING",
            Tag::ProxyClassDesc => "TC_PROXYCLASSDESC",
            Tag::Enum => "TC_ENUM",
        };
        write!(f, "{} - 0x{:02X}", name, *self as u8)
    }
}

/// Field type codes as written in a class descriptor's field table.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TypeCode {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    Array,
    Object,
}

impl TypeCode {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, TypeCode::Array | TypeCode::Object)
    }

    pub fn as_char(&self) -> char {
        match self {
            TypeCode::Byte => 'B',
            TypeCode::Char => 'C',
            TypeCode::Double => 'D',
            TypeCode::Float => 'F',
            TypeCode::Int => 'I',
            TypeCode::Long => 'J',
            TypeCode::Short => 'S',
            TypeCode::Boolean => 'Z',
            TypeCode::Array => '[',
            TypeCode::Object => 'L',
        }
    }
}

impl TryFrom<u8> for TypeCode {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            b'B' => Ok(TypeCode::Byte),
            b'C' => Ok(TypeCode::Char),
            b'D' => Ok(TypeCode::Double),
            b'F' => Ok(TypeCode::Float),
            b'I' => Ok(TypeCode::Int),
            b'J' => Ok(TypeCode::Long),
            b'S' => Ok(TypeCode::Short),
            b'Z' => Ok(TypeCode::Boolean),
            b'[' => Ok(TypeCode::Array),
            b'L' => Ok(TypeCode::Object),
            _ => Err(value),
        }
    }
}


#[cfg(test)]
mod type_code_tests {
    use super::*;

    #[test]
    fn it_should_parse_every_type_code() {
        for c in "BCDFIJSZ[L".bytes() {
            let code = TypeCode::try_from(c).unwrap();
            assert_eq!(code.as_char() as u8, c);
        }
    }

    #[test]
    fn it_should_reject_unknown_type_codes() {
        assert_eq!(TypeCode::try_from(b'V'), Err(b'V'));
    }

    #[test]
    fn it_should_only_treat_arrays_and_objects_as_references() {
        assert!(TypeCode::Int.is_primitive());
        assert!(!TypeCode::Array.is_primitive());
        assert!(!TypeCode::Object.is_primitive());
    }
}
