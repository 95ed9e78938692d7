//! Adapter implementations for character ports.

pub mod memory;
pub mod postgres;
