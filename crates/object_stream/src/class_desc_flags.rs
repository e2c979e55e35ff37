use std::fmt;

use bitflags::bitflags;

bitflags! {
    pub struct ClassDescFlags: u8 {
        const WRITE_METHOD = 0x01;
        const SERIALIZABLE = 0x02;
        const EXTERNALIZABLE = 0x04;
        const BLOCK_DATA = 0x08;
    }
}

impl ClassDescFlags {
    /// Validates a raw classDescFlags byte.
    ///
    /// `SERIALIZABLE` excludes both `EXTERNALIZABLE` and `BLOCK_DATA`,
    /// `EXTERNALIZABLE` excludes `WRITE_METHOD`, and no other bits may be set.
    pub fn parse(raw: u8) -> Option<Self> {
        let flags = Self::from_bits(raw)?;

        let valid = if flags.contains(Self::SERIALIZABLE) {
            !flags.intersects(Self::EXTERNALIZABLE | Self::BLOCK_DATA)
        } else if flags.contains(Self::EXTERNALIZABLE) {
            !flags.contains(Self::WRITE_METHOD)
        } else {
            !flags.contains(Self::BLOCK_DATA)
        };

        valid.then(|| flags)
    }

    pub fn has_object_annotation(&self) -> bool {
        self.contains(Self::SERIALIZABLE | Self::WRITE_METHOD)
            || self.contains(Self::EXTERNALIZABLE | Self::BLOCK_DATA)
    }
}

impl fmt::Display for ClassDescFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::WRITE_METHOD, "SC_WRITE_METHOD"),
            (Self::SERIALIZABLE, "SC_SERIALIZABLE"),
            (Self::EXTERNALIZABLE, "SC_EXTERNALIZABLE"),
            (Self::BLOCK_DATA, "SC_BLOCKDATA"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect::<Vec<_>>();

        write!(f, "0x{:02X} - {}", self.bits(), names.join(" | "))
    }
}
