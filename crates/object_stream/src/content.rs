use std::rc::Rc;

use crate::{ClassDescriptorChain, FieldValue, Handle};

/// Anything that can be reached through a handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    ClassDesc(Rc<ClassDescriptorChain>),
    Class(Rc<ClassDescriptorChain>),
    Object(Rc<ClassDescriptorChain>),
    Array(Rc<ClassDescriptorChain>),
    String(Rc<str>),
}

impl Entity {
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::ClassDesc(_) => "class descriptor",
            Entity::Class(_) => "class",
            Entity::Object(_) => "object",
            Entity::Array(_) => "array",
            Entity::String(_) => "string",
        }
    }
}

/// One decoded content element.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Object(Rc<ClassDescriptorChain>),
    Class(Rc<ClassDescriptorChain>),
    Array(Rc<ClassDescriptorChain>),
    String(Rc<str>),
    LongString(Rc<str>),
    ClassDesc(Rc<ClassDescriptorChain>),
    ProxyClassDesc(Rc<ClassDescriptorChain>),
    Reference(Handle),
    Null,
    BlockData(Vec<u8>),
    BlockDataLong(Vec<u8>),
}

impl From<Content> for FieldValue {
    fn from(content: Content) -> Self {
        match content {
            Content::Object(chain) => FieldValue::Object(chain),
            Content::Class(chain) | Content::ClassDesc(chain) | Content::ProxyClassDesc(chain) => {
                FieldValue::Class(chain)
            }
            Content::Array(chain) => FieldValue::Array(chain),
            Content::String(s) | Content::LongString(s) => FieldValue::String(s),
            Content::Reference(handle) => FieldValue::Reference(handle),
            Content::Null => FieldValue::Null,
            Content::BlockData(bytes) | Content::BlockDataLong(bytes) => {
                FieldValue::BlockData(bytes)
            }
        }
    }
}

#[cfg(test)]
mod content_tests {
    use super::*;

    #[test]
    fn it_should_keep_references_as_handles() {
        assert_eq!(
            FieldValue::from(Content::Reference(Handle(0x7E0002))),
            FieldValue::Reference(Handle(0x7E0002))
        );
    }

    #[test]
    fn it_should_merge_short_and_long_block_data() {
        assert_eq!(
            FieldValue::from(Content::BlockDataLong(vec![1, 2])),
            FieldValue::from(Content::BlockData(vec![1, 2]))
        );
    }

    #[test]
    fn it_should_name_entity_kinds() {
        assert_eq!(Entity::String(Rc::from("a")).kind(), "string");
        assert_eq!(Entity::Class(Rc::default()).kind(), "class");
    }
}
