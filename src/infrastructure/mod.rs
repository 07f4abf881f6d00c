//! Storage backends behind the domain ports. Everything is in memory and is
//! lost when the process exits.

pub mod in_memory;
pub mod inventory;
pub mod random;
