use std::rc::Rc;

use crate::{content::Entity, handles::HandleTable, ClassDescriptor, ClassDescriptorChain, Handle};

/// Everything recovered from one stream.
#[derive(Debug)]
pub struct DecodedStream {
    objects: Vec<Rc<ClassDescriptorChain>>,
    handles: HandleTable,
}

impl DecodedStream {
    pub(crate) fn new(objects: Vec<Rc<ClassDescriptorChain>>, handles: HandleTable) -> Self {
        Self { objects, handles }
    }

    /// Top-level objects in stream order.
    pub fn objects(&self) -> &[Rc<ClassDescriptorChain>] {
        &self.objects
    }

    pub fn resolve(&self, handle: Handle) -> Option<&Entity> {
        self.handles.resolve(handle).ok()
    }

    pub fn handles(&self) -> impl Iterator<Item = Handle> {
        self.handles.minted()
    }

    /// Every class named `name` among the top-level objects.
    pub fn find_class<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = &'s ClassDescriptor> + 's {
        self.objects
            .iter()
            .filter_map(move |chain| chain.find_class(name))
    }
}
