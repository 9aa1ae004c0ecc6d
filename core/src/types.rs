//! Shared primitive types used across the entire save system.

/// A scheduling step. One tick = one host frame.
pub type Tick = u64;

/// A stable identifier assigned when an entity is defined, never at runtime.
pub type EntityId = String;

/// The short name of a save slot (file stem under the data root).
pub type SlotName = String;
