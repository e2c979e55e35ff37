use std::fmt;

use crate::{ClassDescFlags, FieldDescriptor, FieldValue, Handle};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    pub serial_version_uid: i64,
    pub flags: ClassDescFlags,
    pub handle: Option<Handle>,
    pub fields: Vec<FieldDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: String) -> Self {
        Self {
            name,
            serial_version_uid: 0,
            flags: ClassDescFlags::empty(),
            handle: None,
            fields: Vec::new(),
        }
    }

    pub fn is_array(&self) -> bool {
        self.name.starts_with('[')
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name)?.value.as_ref()
    }

    /// Decoded values in field order, skipping entries without a value.
    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().filter_map(|f| f.value.as_ref())
    }

    fn declaration(&self) -> Self {
        Self {
            name: self.name.clone(),
            serial_version_uid: self.serial_version_uid,
            flags: self.flags,
            handle: self.handle,
            fields: self.fields.iter().map(FieldDescriptor::declaration).collect(),
        }
    }
}

impl fmt::Display for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "classname\"{}\" <", self.name)?;
        for field in &self.fields {
            write!(f, "{} ", field)?;
        }
        write!(f, ">")
    }
}

/// The classes describing one object, most-derived first.
///
/// Only proxy class descriptors carry their superclass descriptors here;
/// a plain class descriptor's superclass is decoded but never linked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDescriptorChain {
    classes: Vec<ClassDescriptor>,
}

impl ClassDescriptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, class: ClassDescriptor) {
        self.classes.push(class);
    }

    pub fn append_superclass(&mut self, superclass: &ClassDescriptorChain) {
        self.classes.extend(superclass.classes.iter().cloned());
    }

    /// A copy of the chain with every field value cleared, ready to receive
    /// the data of one instance.
    pub fn instantiate(&self) -> Self {
        Self {
            classes: self
                .classes
                .iter()
                .map(ClassDescriptor::declaration)
                .collect(),
        }
    }

    pub fn classes(&self) -> &[ClassDescriptor] {
        &self.classes
    }

    pub(crate) fn classes_mut(&mut self) -> &mut [ClassDescriptor] {
        &mut self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn most_derived(&self) -> Option<&ClassDescriptor> {
        self.classes.first()
    }

    pub fn class_name(&self) -> Option<&str> {
        self.most_derived().map(|c| c.name.as_str())
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ClassDescriptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for class in &self.classes {
            write!(f, "{} ", class)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod chain_tests {
    use super::*;
    use crate::TypeCode;

    fn point() -> ClassDescriptor {
        let mut class = ClassDescriptor::new("Point".to_owned());
        class.flags = ClassDescFlags::SERIALIZABLE;
        class.fields.push(FieldDescriptor::new(TypeCode::Int, "x".to_owned()));
        class.fields.push(FieldDescriptor::new(TypeCode::Int, "y".to_owned()));
        class
    }

    #[test]
    fn it_should_clear_values_when_instantiated() {
        let mut chain = ClassDescriptorChain::new();
        let mut class = point();
        class.fields[0].value = Some(FieldValue::Int(3));
        chain.push(class);

        let instance = chain.instantiate();

        assert_eq!(instance.len(), 1);
        assert_eq!(instance.classes()[0].fields.len(), 2);
        assert!(instance.classes()[0].values().next().is_none());
        assert_eq!(chain.classes()[0].field_value("x"), Some(&FieldValue::Int(3)));
    }

    #[test]
    fn it_should_append_superclasses_after_the_subclass() {
        let mut chain = ClassDescriptorChain::new();
        chain.push(point());
        let mut superclass = ClassDescriptorChain::new();
        superclass.push(ClassDescriptor::new("java.lang.Object".to_owned()));

        chain.append_superclass(&superclass);

        assert_eq!(chain.class_name(), Some("Point"));
        assert_eq!(chain.classes()[1].name, "java.lang.Object");
        assert!(chain.find_class("java.lang.Object").is_some());
    }

    #[test]
    fn it_should_render_like_a_class_dump() {
        let mut chain = ClassDescriptorChain::new();
        let mut class = point();
        class.fields[0].value = Some(FieldValue::Int(1));
        class.fields[1].value = Some(FieldValue::Int(2));
        chain.push(class);

        assert_eq!(
            chain.to_string(),
            "[classname\"Point\" <(n: x, v: 1) (n: y, v: 2) > ]"
        );
    }
}
