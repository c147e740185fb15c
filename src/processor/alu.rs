//! Arithmetic logic unit. Only comparison is wired up so far, every other
//! operation is rejected.

use std::fmt;

use crate::error::{CpuError, Result};
use crate::memory::Byte;

use super::registers::{Flags, RegisterFile};

/// Operations the ALU can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Compare two registers and set the flags
    Cmp,
    Add,
    Mul,
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AluOp::Cmp => f.write_str("CMP"),
            AluOp::Add => f.write_str("ADD"),
            AluOp::Mul => f.write_str("MUL"),
        }
    }
}

/// Compares two values
pub fn compare(a: Byte, b: Byte) -> Flags {
    Flags::from(a.cmp(&b))
}

/// Runs `op` on the registers `reg_a` and `reg_b`
pub fn execute(op: AluOp, registers: &mut RegisterFile, reg_a: Byte, reg_b: Byte) -> Result<()> {
    match op {
        AluOp::Cmp => {
            let a = registers.get(reg_a)?;
            let b = registers.get(reg_b)?;
            registers.flags = compare(a, b);

            log::debug!("CMP {} {}: {:03b}", a, b, registers.flags);
        }
        AluOp::Add | AluOp::Mul => return Err(CpuError::UnsupportedAluOperation(op)),
    }

    Ok(())
}
