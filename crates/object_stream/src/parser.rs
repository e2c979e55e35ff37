use std::{convert::TryFrom, fmt, rc::Rc};

use crate::{
    content::{Content, Entity},
    cursor::BinaryCursor,
    handles::HandleTable,
    stream::DecodedStream,
    tag::{Tag, TypeCode, STREAM_MAGIC, STREAM_VERSION},
    ClassDescFlags, ClassDescriptor, ClassDescriptorChain, FieldDescriptor, FieldValue, Handle,
    ObjectStreamError, Result,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderOptions {
    /// Maximum nesting of content elements and class descriptors.
    /// `None` leaves recursion bounded only by the input.
    pub max_depth: Option<usize>,
}

/// One decode session over a complete serialized stream.
pub struct StreamDecoder<'a> {
    cursor: BinaryCursor<'a>,
    handles: HandleTable,
    objects: Vec<Rc<ClassDescriptorChain>>,
    options: DecoderOptions,
    depth: usize,
}

impl<'a> StreamDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecoderOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecoderOptions) -> Self {
        Self {
            cursor: BinaryCursor::new(buf),
            handles: HandleTable::new(),
            objects: Vec::new(),
            options,
            depth: 0,
        }
    }

    pub fn decode(mut self) -> Result<DecodedStream> {
        self.parse_header()?;

        self.trace("Contents");
        while self.cursor.remaining() > 0 {
            if let Content::Object(chain) = self.parse_content()? {
                self.objects.push(chain);
            }
        }

        Ok(DecodedStream::new(self.objects, self.handles))
    }

    fn parse_header(&mut self) -> Result<()> {
        let (magic, version) = match (self.cursor.read_u16(), self.cursor.read_u16()) {
            (Ok(magic), Ok(version)) => (magic, version),
            (Ok(magic), Err(_)) => (magic, 0),
            _ => (0, 0),
        };

        if magic != STREAM_MAGIC || version != STREAM_VERSION {
            return Err(ObjectStreamError::MalformedHeader { magic, version });
        }

        self.trace(format_args!("STREAM_MAGIC - 0x{:04X}", magic));
        self.trace(format_args!("STREAM_VERSION - {}", version));
        Ok(())
    }

    fn parse_content(&mut self) -> Result<Content> {
        self.nested(|p| match p.peek_tag()? {
            Tag::Object => p.parse_new_object().map(Content::Object),
            Tag::Class => p.parse_new_class().map(Content::Class),
            Tag::Array => p.parse_new_array().map(Content::Array),
            Tag::String => p.parse_tc_string().map(Content::String),
            Tag::LongString => p.parse_tc_long_string().map(Content::LongString),
            Tag::Enum => p.parse_new_enum(),
            Tag::ClassDesc => p.parse_tc_classdesc().map(Content::ClassDesc),
            Tag::ProxyClassDesc => p.parse_tc_proxyclassdesc().map(Content::ProxyClassDesc),
            Tag::Reference => p
                .parse_prev_object()
                .map(|(handle, _)| Content::Reference(handle)),
            Tag::Null => p.parse_null().map(|_| Content::Null),
            Tag::BlockData => p.parse_block_data().map(Content::BlockData),
            Tag::BlockDataLong => p.parse_long_block_data().map(Content::BlockDataLong),
            Tag::EndBlockData => Err(p.illegal_tag()),
        })
    }

    fn parse_new_object(&mut self) -> Result<Rc<ClassDescriptorChain>> {
        self.expect_tag(Tag::Object)?;

        let class_desc = self.parse_required_class_desc()?;
        let handle = self.handles.mint();

        // Registered before the field data so the fields can refer back to it.
        let mut instance = class_desc.instantiate();
        self.handles
            .register(handle, Entity::Object(Rc::new(instance.clone())));

        self.parse_class_data(&mut instance)?;

        let instance = Rc::new(instance);
        self.handles
            .register(handle, Entity::Object(Rc::clone(&instance)));
        Ok(instance)
    }

    fn parse_class_desc(&mut self) -> Result<Option<Rc<ClassDescriptorChain>>> {
        self.nested(|p| match p.peek_tag()? {
            Tag::ClassDesc => p.parse_tc_classdesc().map(Some),
            Tag::ProxyClassDesc => p.parse_tc_proxyclassdesc().map(Some),
            Tag::Null => p.parse_null().map(|_| None),
            Tag::Reference => match p.parse_prev_object()? {
                (_, Entity::ClassDesc(chain)) => Ok(Some(chain)),
                (handle, found) => Err(ObjectStreamError::UnexpectedEntity {
                    handle,
                    expected: "class descriptor",
                    found: found.kind(),
                }),
            },
            _ => Err(p.illegal_tag()),
        })
    }

    fn parse_required_class_desc(&mut self) -> Result<Rc<ClassDescriptorChain>> {
        let offset = self.cursor.position();
        self.parse_class_desc()?
            .ok_or(ObjectStreamError::MissingClassDesc { offset })
    }

    fn parse_tc_classdesc(&mut self) -> Result<Rc<ClassDescriptorChain>> {
        self.expect_tag(Tag::ClassDesc)?;

        self.trace("className");
        let mut class = ClassDescriptor::new(self.parse_utf()?);
        class.serial_version_uid = self.cursor.read_i64()?;
        self.trace(format_args!(
            "serialVersionUID - 0x{:016X}",
            class.serial_version_uid
        ));

        let handle = self.handles.mint();
        class.handle = Some(handle);
        self.register_class_desc(handle, &class);

        let offset = self.cursor.position();
        let raw_flags = self.cursor.read_byte()?;
        class.flags =
            ClassDescFlags::parse(raw_flags).ok_or(ObjectStreamError::IllegalClassDescFlags {
                flags: raw_flags,
                offset,
            })?;
        self.trace(format_args!("classDescFlags - {}", class.flags));

        let field_count = self.cursor.read_u16()?;
        self.trace(format_args!("fieldCount - {}", field_count));
        for _ in 0..field_count {
            let field = self.parse_field_desc()?;
            class.fields.push(field);
        }

        self.trace("classAnnotations");
        self.parse_annotation()?;

        // The superclass descriptor is consumed (and its handles minted) but
        // not linked onto the chain.
        self.trace("superClassDesc");
        let _superclass = self.parse_class_desc()?;

        log::debug!("classDesc {} registered as {}", class.name, handle);
        Ok(self.register_class_desc(handle, &class))
    }

    fn parse_tc_proxyclassdesc(&mut self) -> Result<Rc<ClassDescriptorChain>> {
        self.expect_tag(Tag::ProxyClassDesc)?;

        let handle = self.handles.mint();
        let mut chain = ClassDescriptorChain::new();
        self.handles
            .register(handle, Entity::ClassDesc(Rc::new(chain.clone())));

        let interface_count = self.cursor.read_u32()?;
        self.trace(format_args!("proxyInterfaceNames - {}", interface_count));
        for i in 0..interface_count {
            let name = self.parse_utf()?;
            self.trace(format_args!("{}: {}", i, name));
        }

        self.trace("classAnnotations");
        self.parse_annotation()?;

        self.trace("superClassDesc");
        if let Some(superclass) = self.parse_class_desc()? {
            chain.append_superclass(&superclass);
        }

        let chain = Rc::new(chain);
        self.handles
            .register(handle, Entity::ClassDesc(Rc::clone(&chain)));
        Ok(chain)
    }

    fn register_class_desc(
        &mut self,
        handle: Handle,
        class: &ClassDescriptor,
    ) -> Rc<ClassDescriptorChain> {
        let mut chain = ClassDescriptorChain::new();
        chain.push(class.clone());
        let chain = Rc::new(chain);
        self.handles
            .register(handle, Entity::ClassDesc(Rc::clone(&chain)));
        chain
    }

    fn parse_field_desc(&mut self) -> Result<FieldDescriptor> {
        let offset = self.cursor.position();
        let code = self.cursor.read_byte()?;
        let type_code = TypeCode::try_from(code)
            .map_err(|code| ObjectStreamError::IllegalFieldTypeCode { code, offset })?;

        let mut field = FieldDescriptor::new(type_code, self.parse_utf()?);
        if !type_code.is_primitive() {
            field.class_name = Some(self.parse_new_string()?);
        }

        self.trace(format_args!(
            "{} {} {}",
            type_code.as_char(),
            field.name,
            field.class_name.as_deref().unwrap_or_default()
        ));
        Ok(field)
    }

    /// Skips content elements up to and including the next `TC_ENDBLOCKDATA`.
    fn parse_annotation(&mut self) -> Result<()> {
        while self.cursor.peek_byte()? != Tag::EndBlockData as u8 {
            self.parse_content()?;
        }
        self.expect_tag(Tag::EndBlockData)
    }

    fn parse_class_data(&mut self, chain: &mut ClassDescriptorChain) -> Result<()> {
        // Class data is written from the most distant linked superclass down.
        for class in chain.classes_mut().iter_mut().rev() {
            self.trace(&class.name);

            if class.flags.contains(ClassDescFlags::SERIALIZABLE) {
                for field in class.fields.iter_mut() {
                    self.trace(&field.name);
                    field.value = Some(self.parse_field_value(field.type_code)?);
                }
            }

            if class.flags.has_object_annotation() {
                self.trace("objectAnnotation");
                self.parse_object_annotation(class)?;
            }

            if class.flags.contains(ClassDescFlags::EXTERNALIZABLE)
                && !class.flags.contains(ClassDescFlags::BLOCK_DATA)
            {
                return Err(ObjectStreamError::UnsupportedExternalContents {
                    class: class.name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Appends the elements written by a custom `writeObject` as unnamed
    /// fields.
    ///
    /// The first element replaces the first declared field: writers such as
    /// `ArrayList` emit their size both as a field and as leading block data.
    fn parse_object_annotation(&mut self, class: &mut ClassDescriptor) -> Result<()> {
        let mut first = true;
        while self.cursor.peek_byte()? != Tag::EndBlockData as u8 {
            let content = self.parse_content()?;
            if first {
                first = false;
                if !class.fields.is_empty() {
                    let replaced = class.fields.remove(0);
                    log::debug!(
                        "{}: annotation replaces field {:?}",
                        class.name,
                        replaced.name
                    );
                }
                continue;
            }
            class
                .fields
                .push(FieldDescriptor::with_value(TypeCode::Object, content.into()));
        }
        self.expect_tag(Tag::EndBlockData)
    }

    fn parse_field_value(&mut self, type_code: TypeCode) -> Result<FieldValue> {
        let value = match type_code {
            TypeCode::Byte => FieldValue::Byte(self.cursor.read_byte()? as i8),
            TypeCode::Char => FieldValue::Char(self.cursor.read_u16()?),
            TypeCode::Double => FieldValue::Double(f64::from_bits(self.cursor.read_u64()?)),
            TypeCode::Float => FieldValue::Float(f32::from_bits(self.cursor.read_u32()?)),
            TypeCode::Int => FieldValue::Int(self.cursor.read_i32()?),
            TypeCode::Long => FieldValue::Long(self.cursor.read_i64()?),
            TypeCode::Short => FieldValue::Short(self.cursor.read_i16()?),
            TypeCode::Boolean => FieldValue::Boolean(self.cursor.read_byte()? != 0),
            TypeCode::Array => return self.parse_array_field(),
            TypeCode::Object => return self.parse_object_field(),
        };

        self.trace(format_args!("({}) {}", type_code.as_char(), value));
        Ok(value)
    }

    fn parse_array_field(&mut self) -> Result<FieldValue> {
        match self.peek_tag()? {
            Tag::Null => self.parse_null().map(|_| FieldValue::Null),
            Tag::Array => self
                .nested(|p| p.parse_new_array())
                .map(FieldValue::Array),
            Tag::Reference => self
                .parse_prev_object()
                .map(|(handle, _)| FieldValue::Reference(handle)),
            _ => Err(self.illegal_tag()),
        }
    }

    fn parse_object_field(&mut self) -> Result<FieldValue> {
        match self.peek_tag()? {
            Tag::Object
            | Tag::Class
            | Tag::Array
            | Tag::String
            | Tag::LongString
            | Tag::Enum
            | Tag::Reference
            | Tag::Null => self.parse_content().map(FieldValue::from),
            _ => Err(self.illegal_tag()),
        }
    }

    fn parse_new_array(&mut self) -> Result<Rc<ClassDescriptorChain>> {
        self.expect_tag(Tag::Array)?;

        let class_desc = self.parse_required_class_desc()?;
        let element_type = match class_desc.classes() {
            [class] if class.is_array() => {
                match class
                    .name
                    .as_bytes()
                    .get(1)
                    .and_then(|&code| TypeCode::try_from(code).ok())
                {
                    Some(element_type) => element_type,
                    None => {
                        return Err(ObjectStreamError::IllegalArrayClassDesc {
                            name: class.name.clone(),
                        })
                    }
                }
            }
            _ => {
                return Err(ObjectStreamError::IllegalArrayClassDesc {
                    name: class_desc.class_name().unwrap_or_default().to_owned(),
                })
            }
        };

        let handle = self.handles.mint();
        let mut instance = class_desc.instantiate();
        self.handles
            .register(handle, Entity::Array(Rc::new(instance.clone())));

        let size = self.cursor.read_u32()?;
        self.trace(format_args!("Values - {}", size));
        for i in 0..size {
            self.trace(format_args!("Index {}:", i));
            let value = self.parse_field_value(element_type)?;
            instance.classes_mut()[0]
                .fields
                .push(FieldDescriptor::with_value(element_type, value));
        }

        let instance = Rc::new(instance);
        self.handles
            .register(handle, Entity::Array(Rc::clone(&instance)));
        Ok(instance)
    }

    fn parse_new_class(&mut self) -> Result<Rc<ClassDescriptorChain>> {
        self.expect_tag(Tag::Class)?;

        let class_desc = self.parse_required_class_desc()?;
        let handle = self.handles.mint();
        self.handles
            .register(handle, Entity::Class(Rc::clone(&class_desc)));
        Ok(class_desc)
    }

    fn parse_new_enum(&mut self) -> Result<Content> {
        self.expect_tag(Tag::Enum)?;

        let _class_desc = self.parse_required_class_desc()?;
        let _handle = self.handles.mint();
        let constant = self.parse_new_string()?;
        self.trace(format_args!("enumConstantName - {}", constant));

        Err(ObjectStreamError::NotImplemented("TC_ENUM"))
    }

    fn parse_prev_object(&mut self) -> Result<(Handle, Entity)> {
        self.expect_tag(Tag::Reference)?;

        let handle = Handle(self.cursor.read_u32()?);
        self.trace(format_args!("Handle - {}", handle));
        let entity = self.handles.resolve(handle)?.clone();
        Ok((handle, entity))
    }

    fn parse_null(&mut self) -> Result<()> {
        self.expect_tag(Tag::Null)
    }

    fn parse_block_data(&mut self) -> Result<Vec<u8>> {
        self.expect_tag(Tag::BlockData)?;

        let length = self.cursor.read_byte()? as usize;
        self.parse_block_contents(length)
    }

    fn parse_long_block_data(&mut self) -> Result<Vec<u8>> {
        self.expect_tag(Tag::BlockDataLong)?;

        let length = self.cursor.read_u32()? as usize;
        self.parse_block_contents(length)
    }

    fn parse_block_contents(&mut self, length: usize) -> Result<Vec<u8>> {
        let contents = self.cursor.read_bytes(length)?.to_vec();
        self.trace(format_args!("Length - {}", length));
        Ok(contents)
    }

    fn parse_new_string(&mut self) -> Result<Rc<str>> {
        match self.peek_tag()? {
            Tag::String => self.parse_tc_string(),
            Tag::LongString => self.parse_tc_long_string(),
            Tag::Reference => match self.parse_prev_object()? {
                (_, Entity::String(s)) => Ok(s),
                (handle, found) => Err(ObjectStreamError::UnexpectedEntity {
                    handle,
                    expected: "string",
                    found: found.kind(),
                }),
            },
            _ => Err(self.illegal_tag()),
        }
    }

    fn parse_tc_string(&mut self) -> Result<Rc<str>> {
        self.expect_tag(Tag::String)?;

        let handle = self.handles.mint();
        let value: Rc<str> = Rc::from(self.parse_utf()?);
        self.handles
            .register(handle, Entity::String(Rc::clone(&value)));
        Ok(value)
    }

    fn parse_tc_long_string(&mut self) -> Result<Rc<str>> {
        self.expect_tag(Tag::LongString)?;

        let handle = self.handles.mint();
        let length = usize::try_from(self.cursor.read_u64()?).unwrap_or(usize::MAX);
        let value: Rc<str> = Rc::from(self.cursor.read_modified_utf8(length)?);
        self.trace(format_args!("Value - {}", value));
        self.handles
            .register(handle, Entity::String(Rc::clone(&value)));
        Ok(value)
    }

    fn parse_utf(&mut self) -> Result<String> {
        let length = self.cursor.read_u16()?;
        let value = self.cursor.read_modified_utf8(length as usize)?;
        self.trace(format_args!("Value - {}", value));
        Ok(value)
    }

    fn peek_tag(&self) -> Result<Tag> {
        let tag = self.cursor.peek_byte()?;
        Tag::try_from(tag).map_err(|tag| ObjectStreamError::IllegalContentTag {
            tag,
            offset: self.cursor.position(),
        })
    }

    fn expect_tag(&mut self, expected: Tag) -> Result<()> {
        let offset = self.cursor.position();
        let tag = self.cursor.read_byte()?;
        if tag != expected as u8 {
            return Err(ObjectStreamError::IllegalContentTag { tag, offset });
        }

        self.trace(expected);
        Ok(())
    }

    /// Error for the tag under the cursor, which the caller cannot accept.
    fn illegal_tag(&self) -> ObjectStreamError {
        ObjectStreamError::IllegalContentTag {
            tag: self.cursor.peek_byte().unwrap_or_default(),
            offset: self.cursor.position(),
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        if let Some(limit) = self.options.max_depth {
            if self.depth > limit {
                return Err(ObjectStreamError::DepthLimitExceeded { limit });
            }
        }

        let result = f(self);
        self.depth -= 1;
        result
    }

    fn trace(&self, message: impl fmt::Display) {
        log::trace!("{:indent$}{}", "", message, indent = self.depth * 2);
    }
}


#[cfg(test)]
mod parse_block_data_tests {
    use super::*;

    #[test]
    fn it_should_parse_empty_block_data() {
        let mut decoder = StreamDecoder::new(&[0x77, 0x00, 0x70]);

        assert_eq!(decoder.parse_content().unwrap(), Content::BlockData(vec![]));
        assert_eq!(decoder.cursor.position(), 2);
    }

    #[test]
    fn it_should_parse_long_block_data() {
        let mut decoder = StreamDecoder::new(&[0x7a, 0x00, 0x00, 0x00, 0x02, 0xbe, 0xef]);

        assert_eq!(
            decoder.parse_content().unwrap(),
            Content::BlockDataLong(vec![0xbe, 0xef])
        );
    }

    #[test]
    fn it_should_fail_if_the_block_is_truncated() {
        let mut decoder = StreamDecoder::new(&[0x77, 0x04, 0x01]);

        assert!(matches!(
            decoder.parse_content(),
            Err(ObjectStreamError::OutOfRange {
                offset: 2,
                requested: 4,
                remaining: 1
            })
        ));
    }
}

#[cfg(test)]
mod parse_string_tests {
    use super::*;

    #[test]
    fn it_should_mint_a_handle_for_a_new_string() {
        let mut decoder = StreamDecoder::new(&[0x74, 0x00, 0x02, b'h', b'i']);

        assert_eq!(
            decoder.parse_content().unwrap(),
            Content::String(Rc::from("hi"))
        );
        assert!(matches!(
            decoder.handles.resolve(Handle(0x7E0000)),
            Ok(Entity::String(s)) if &**s == "hi"
        ));
    }

    #[test]
    fn it_should_parse_a_long_string() {
        let mut decoder = StreamDecoder::new(&[
            0x7c, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, b'a', b'b', b'c',
        ]);

        assert_eq!(
            decoder.parse_content().unwrap(),
            Content::LongString(Rc::from("abc"))
        );
    }

    #[test]
    fn it_should_resolve_a_string_reference() {
        let mut decoder = StreamDecoder::new(&[
            0x74, 0x00, 0x01, b'x', 0x71, 0x00, 0x7e, 0x00, 0x00,
        ]);
        decoder.parse_content().unwrap();

        assert_eq!(&*decoder.parse_new_string().unwrap(), "x");
    }

    #[test]
    fn it_should_reject_a_reference_to_something_else_as_a_string() {
        let mut decoder = StreamDecoder::new(&[0x71, 0x00, 0x7e, 0x00, 0x00]);
        let handle = decoder.handles.mint();
        decoder
            .handles
            .register(handle, Entity::ClassDesc(Rc::default()));

        assert!(matches!(
            decoder.parse_new_string(),
            Err(ObjectStreamError::UnexpectedEntity {
                expected: "string",
                found: "class descriptor",
                ..
            })
        ));
    }
}


#[cfg(test)]
mod parse_field_value_tests {
    use super::*;

    #[test]
    fn it_should_reinterpret_floating_point_bits() {
        let mut decoder = StreamDecoder::new(&[
            0x3f, 0xc0, 0x00, 0x00, 0x40, 0x09, 0x21, 0xfb, 0x54, 0x44, 0x2d, 0x18,
        ]);

        assert_eq!(
            decoder.parse_field_value(TypeCode::Float).unwrap(),
            FieldValue::Float(1.5)
        );
        assert_eq!(
            decoder.parse_field_value(TypeCode::Double).unwrap(),
            FieldValue::Double(std::f64::consts::PI)
        );
    }

    #[test]
    fn it_should_parse_narrow_primitives() {
        let mut decoder = StreamDecoder::new(&[0xff, 0x00, 0x41, 0x01, 0x80, 0x00]);

        assert_eq!(
            decoder.parse_field_value(TypeCode::Byte).unwrap(),
            FieldValue::Byte(-1)
        );
        assert_eq!(
            decoder.parse_field_value(TypeCode::Char).unwrap(),
            FieldValue::Char(0x41)
        );
        assert_eq!(
            decoder.parse_field_value(TypeCode::Boolean).unwrap(),
            FieldValue::Boolean(true)
        );
        assert_eq!(
            decoder.parse_field_value(TypeCode::Short).unwrap(),
            FieldValue::Short(i16::MIN)
        );
    }

    #[test]
    fn it_should_reject_block_data_as_an_object_value() {
        let mut decoder = StreamDecoder::new(&[0x77, 0x00]);

        assert!(matches!(
            decoder.parse_field_value(TypeCode::Object),
            Err(ObjectStreamError::IllegalContentTag { tag: 0x77, .. })
        ));
    }

    #[test]
    fn it_should_reject_a_string_as_an_array_value() {
        let mut decoder = StreamDecoder::new(&[0x74, 0x00, 0x00]);

        assert!(matches!(
            decoder.parse_field_value(TypeCode::Array),
            Err(ObjectStreamError::IllegalContentTag { tag: 0x74, .. })
        ));
    }
}
