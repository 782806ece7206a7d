//! Domain types and the storage ports the application layer depends on.

pub mod point;
pub mod ports;
