//! Hexagonal boundary of the button subsystem.

pub mod ports;
