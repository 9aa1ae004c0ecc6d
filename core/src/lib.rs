//! savestate-core: save/load persistence and reconciliation for the
//! machine world.
//!
//! A save walks the live world and writes one versioned document per slot.
//! A load reads that document back (bootstrapping a fresh one when the slot
//! is missing) and reconciles it against the live world by stable id.

pub mod assembler;
pub mod blueprint;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod flag_registry;
pub mod load_scheduler;
pub mod progress;
pub mod reconciliation;
pub mod records;
pub mod resources;
pub mod save_system;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod world;
