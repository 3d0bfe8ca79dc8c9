//! Physical System Memory.
//!
//! A flat, little-endian RAM region mapped at a physical base address. It is
//! the simplest [`PhysicalMemory`] a hart can translate against: every
//! naturally aligned access inside the region succeeds, anything else faults.

use crate::common::{AccessKind, PhysAddr};
use crate::soc::traits::{MemoryFault, PhysicalMemory};

/// System Memory structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ram {
    /// Backing bytes.
    data: Vec<u8>,
    /// The base physical address where this memory is mapped.
    base_addr: u64,
}

impl Ram {
    /// Creates a zero-filled RAM of `size` bytes at `base_addr`.
    pub fn new(base_addr: u64, size: usize) -> Self {
        Self {
            data: vec![0; size],
            base_addr,
        }
    }

    /// Returns `(base_address, size_in_bytes)`.
    pub fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.data.len() as u64)
    }

    /// Copies `data` into memory at byte `offset` from the base.
    ///
    /// Slices that do not fit are ignored.
    pub fn load(&mut self, data: &[u8], offset: usize) {
        let end = offset.checked_add(data.len());
        if let Some(dst) = end.and_then(|end| self.data.get_mut(offset..end)) {
            dst.copy_from_slice(data);
        }
    }

    /// Resolves an access to a byte range of the backing store.
    fn span(&self, addr: PhysAddr, width: u64) -> Result<std::ops::Range<usize>, MemoryFault> {
        let addr = addr.val();
        if !matches!(width, 1 | 2 | 4 | 8) || addr % width != 0 {
            return Err(MemoryFault::Misaligned { addr, width });
        }
        let offset = addr
            .checked_sub(self.base_addr)
            .filter(|off| {
                off.checked_add(width)
                    .is_some_and(|end| end <= self.data.len() as u64)
            })
            .ok_or(MemoryFault::OutOfRange { addr, width })?;
        let start = offset as usize;
        Ok(start..start + width as usize)
    }
}

impl PhysicalMemory for Ram {
    fn read_phys(
        &mut self,
        addr: PhysAddr,
        width: u64,
        _access: AccessKind,
    ) -> Result<u64, MemoryFault> {
        let span = self.span(addr, width)?;
        let mut bytes = [0u8; 8];
        bytes[..span.len()].copy_from_slice(&self.data[span]);
        Ok(u64::from_le_bytes(bytes))
    }

    fn write_phys(
        &mut self,
        addr: PhysAddr,
        width: u64,
        value: u64,
        _access: AccessKind,
    ) -> Result<(), MemoryFault> {
        let span = self.span(addr, width)?;
        let len = span.len();
        self.data[span].copy_from_slice(&value.to_le_bytes()[..len]);
        Ok(())
    }
}
