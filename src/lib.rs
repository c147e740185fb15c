//! Emulator for the LS-8, a tiny 8-bit register machine with 256 bytes of
//! memory and a downward growing stack.

pub mod config;
pub mod error;
pub mod memory;
pub mod processor;
