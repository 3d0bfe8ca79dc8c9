//! Memory Access Types.
//!
//! This module defines the classification of memory accesses the MMU sees.
//! These types are used for the following:
//! 1. **Permission Validation:** Deciding which of R/W/X a leaf PTE must grant.
//! 2. **Fault Generation:** Choosing between fetch, load and store/AMO exceptions.
//! 3. **Dirty Tracking:** Deciding whether a successful access must set the D bit.

/// A platform-defined access kind.
///
/// Platforms that add their own memory operations (cache-block management,
/// vector segment loads, ...) describe them by what they do to memory; the
/// MMU derives permission requirements and the fault flavour from that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlatformAccess {
    /// Platform-chosen identifier, carried for diagnostics only.
    pub id: u8,
    /// The access reads memory and needs R permission. An access that
    /// declares neither reads nor writes is treated as a read.
    pub reads: bool,
    /// The access writes memory and needs W permission (and sets D).
    pub writes: bool,
}

/// Type of memory access operation requesting translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Data load. Requires R, or X when MXR is set.
    Read,
    /// Data store. Requires W (and therefore R).
    Write,
    /// Atomic read-modify-write. Requires both R and W, reported as a store.
    ReadWrite,
    /// Instruction fetch. Requires X.
    Execute,
    /// Platform-defined access.
    Platform(PlatformAccess),
}

impl AccessKind {
    /// Returns `true` if the access needs read permission on the page.
    ///
    /// A platform access with no declared effect still touches the page, so
    /// it is held to load rules.
    pub const fn reads(self) -> bool {
        match self {
            Self::Read | Self::ReadWrite => true,
            Self::Write | Self::Execute => false,
            Self::Platform(p) => p.reads || !p.writes,
        }
    }

    /// Returns `true` if the access modifies memory.
    ///
    /// Writing accesses need W permission, set the dirty bit and are reported
    /// as store/AMO faults.
    pub const fn writes(self) -> bool {
        match self {
            Self::Write | Self::ReadWrite => true,
            Self::Read | Self::Execute => false,
            Self::Platform(p) => p.writes,
        }
    }

    /// Returns `true` for instruction fetches.
    pub const fn is_fetch(self) -> bool {
        matches!(self, Self::Execute)
    }
}
