//! RISC-V Privilege Modes.
//!
//! This module defines the privilege levels an access can be made at.
//! It implements the following:
//! 1. **Mode Classification:** User (U), Supervisor (S), and Machine (M) modes.
//! 2. **Encoding:** Conversion to and from the two-bit `xPP` encoding.
//! 3. **Translation Policy:** Whether accesses at a level are subject to paging.

/// RISC-V privilege mode levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivilegeMode {
    /// User mode (U-mode).
    User = 0,

    /// Supervisor mode (S-mode).
    Supervisor = 1,

    /// Machine mode (M-mode).
    Machine = 3,
}

impl PrivilegeMode {
    /// Decodes a two-bit privilege encoding; `None` for the reserved value 2.
    pub const fn from_bits(val: u8) -> Option<Self> {
        match val & 0b11 {
            0 => Some(Self::User),
            1 => Some(Self::Supervisor),
            3 => Some(Self::Machine),
            _ => None,
        }
    }

    /// Returns the two-bit encoding of the mode.
    pub const fn to_bits(self) -> u8 {
        self as u8
    }

    /// Returns `true` if accesses at this level go through SATP translation.
    ///
    /// Machine-mode accesses are never translated.
    pub const fn is_translated(self) -> bool {
        !matches!(self, Self::Machine)
    }

    /// Returns the human-readable name of the privilege mode.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Supervisor => "Supervisor",
            Self::Machine => "Machine",
        }
    }
}

impl std::fmt::Display for PrivilegeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
