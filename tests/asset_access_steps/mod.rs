//! Step definitions for asset access scenarios.

pub mod given;
pub mod then;
pub mod world;
