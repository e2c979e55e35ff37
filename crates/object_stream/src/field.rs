use std::{fmt, rc::Rc};

use crate::{ClassDescriptorChain, Handle, TypeCode};

/// A decoded field value or array element.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Byte(i8),
    /// A UTF-16 code unit.
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(Rc<str>),
    Object(Rc<ClassDescriptorChain>),
    Array(Rc<ClassDescriptorChain>),
    Class(Rc<ClassDescriptorChain>),
    BlockData(Vec<u8>),
    /// A back-reference, resolvable through [`crate::DecodedStream::resolve`].
    Reference(Handle),
    Null,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(&**s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Byte(v) => write!(f, "{}", v),
            FieldValue::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            FieldValue::Double(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
            FieldValue::Short(v) => write!(f, "{}", v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Object(chain) | FieldValue::Array(chain) | FieldValue::Class(chain) => {
                write!(f, "{}", chain)
            }
            FieldValue::BlockData(bytes) => {
                write!(f, "0x")?;
                bytes.iter().try_for_each(|b| write!(f, "{:02X}", b))
            }
            FieldValue::Reference(handle) => write!(f, "ref {}", handle),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// One entry of a class descriptor's field table.
///
/// `value` is `None` in the registered descriptor and is filled in on the
/// per-instance copy once the instance data has been decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub type_code: TypeCode,
    pub name: String,
    pub class_name: Option<Rc<str>>,
    pub value: Option<FieldValue>,
}

impl FieldDescriptor {
    pub fn new(type_code: TypeCode, name: String) -> Self {
        Self {
            type_code,
            name,
            class_name: None,
            value: None,
        }
    }

    /// An unnamed entry holding an array element or an object annotation.
    pub fn with_value(type_code: TypeCode, value: FieldValue) -> Self {
        Self {
            type_code,
            name: String::new(),
            class_name: None,
            value: Some(value),
        }
    }

    /// Copy of the declaration without any decoded value.
    pub fn declaration(&self) -> Self {
        Self {
            value: None,
            ..self.clone()
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(n: {}, v: ", self.name)?;
        match &self.value {
            Some(value) => write!(f, "{})", value),
            None => write!(f, ")"),
        }
    }
}
