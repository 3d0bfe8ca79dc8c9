

/// PTE codec.
pub mod pte;

/// Page table walker.
pub mod ptw;
