use std::{collections::HashMap, fmt};

use crate::{content::Entity, ObjectStreamError, Result};

/// First handle assigned in every stream.
pub const BASE_WIRE_HANDLE: u32 = 0x7E0000;

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Debug)]
pub struct Handle(pub u32);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

#[derive(Debug)]
pub struct HandleTable {
    next: u32,
    entries: HashMap<Handle, Entity>,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            next: BASE_WIRE_HANDLE,
            entries: HashMap::new(),
        }
    }

    pub fn mint(&mut self) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        log::debug!("newHandle {}", handle);
        handle
    }

    /// Binds `entity` to `handle`, replacing an earlier binding.
    pub fn register(&mut self, handle: Handle, entity: Entity) {
        self.entries.insert(handle, entity);
    }

    pub fn resolve(&self, handle: Handle) -> Result<&Entity> {
        self.entries
            .get(&handle)
            .ok_or(ObjectStreamError::UnknownHandle(handle))
    }

    /// Every handle minted so far, in mint order.
    pub fn minted(&self) -> impl Iterator<Item = Handle> {
        (BASE_WIRE_HANDLE..self.next).map(Handle)
    }
}
