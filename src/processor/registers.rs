use std::cmp::Ordering;
use std::fmt;

use crate::error::{CpuError, Result};
use crate::memory::Byte;

/// Number of general purpose registers
pub const REGISTER_COUNT: usize = 8;

/// Index of the register reserved as stack pointer
pub const SP: Byte = 7;

/// Initial stack pointer. The stack grows downwards from here.
pub const STACK_TOP: Byte = 0xF4;

/// Outcome of the last comparison. Exactly one bit is set at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(Byte);

impl Flags {
    pub const EQUAL: Flags = Flags(0b0000_0001);
    pub const GREATER: Flags = Flags(0b0000_0010);
    pub const LESS: Flags = Flags(0b0000_0100);

    pub fn bits(self) -> Byte {
        self.0
    }

    pub fn is_equal(self) -> bool {
        self.0 & Self::EQUAL.0 != 0
    }

    pub fn is_greater(self) -> bool {
        self.0 & Self::GREATER.0 != 0
    }

    pub fn is_less(self) -> bool {
        self.0 & Self::LESS.0 != 0
    }
}

impl Default for Flags {
    /// No comparison has happened yet, so this is an arbitrary non-zero value
    fn default() -> Self {
        Self::EQUAL
    }
}

impl From<Ordering> for Flags {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::LESS,
            Ordering::Greater => Self::GREATER,
            Ordering::Equal => Self::EQUAL,
        }
    }
}

impl fmt::Binary for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

/// The registers R0 to R7 and the flags register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterFile {
    registers: [Byte; REGISTER_COUNT],
    /// Result of the last `CMP`
    pub flags: Flags,
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut registers = [0; REGISTER_COUNT];
        registers[SP as usize] = STACK_TOP;

        Self {
            registers,
            flags: Flags::default(),
        }
    }
}

impl RegisterFile {
    /// Reads the register with the given index
    pub fn get(&self, index: Byte) -> Result<Byte> {
        self.registers
            .get(index as usize)
            .copied()
            .ok_or(CpuError::InvalidRegister(index))
    }

    /// Writes the register with the given index
    pub fn set(&mut self, index: Byte, value: Byte) -> Result<()> {
        let register = self
            .registers
            .get_mut(index as usize)
            .ok_or(CpuError::InvalidRegister(index))?;
        *register = value;
        Ok(())
    }

    pub fn sp(&self) -> Byte {
        self.registers[SP as usize]
    }

    pub fn set_sp(&mut self, value: Byte) {
        self.registers[SP as usize] = value;
    }

    /// All register values, R0 first
    pub fn values(&self) -> &[Byte; REGISTER_COUNT] {
        &self.registers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::Result;

    #[test]
    fn test_initial_state() -> Result<()> {
        let registers = RegisterFile::default();

        assert_eq!(registers.sp(), 0xF4);
        assert_eq!(registers.get(SP)?, 0xF4);
        assert_eq!(&registers.values()[..7], &[0; 7]);
        assert_eq!(registers.flags.bits(), 0b001);

        Ok(())
    }

    #[test]
    fn test_set_and_get() -> Result<()> {
        let mut registers = RegisterFile::default();
        registers.set(3, 0x42)?;

        assert_eq!(registers.get(3)?, 0x42);
        assert_eq!(registers.values()[3], 0x42);

        Ok(())
    }

    #[test]
    fn test_invalid_register() -> Result<()> {
        let mut registers = RegisterFile::default();

        assert!(matches!(registers.get(8), Err(CpuError::InvalidRegister(8))));
        assert!(matches!(
            registers.set(0xFF, 1),
            Err(CpuError::InvalidRegister(0xFF))
        ));

        Ok(())
    }

    #[test]
    fn test_flags_from_ordering() -> Result<()> {
        assert_eq!(Flags::from(Ordering::Less).bits(), 0b100);
        assert_eq!(Flags::from(Ordering::Greater).bits(), 0b010);
        assert_eq!(Flags::from(Ordering::Equal).bits(), 0b001);

        assert!(Flags::LESS.is_less() && !Flags::LESS.is_equal());
        assert!(Flags::GREATER.is_greater() && !Flags::GREATER.is_less());
        assert_eq!(format!("{:03b}", Flags::LESS), "100");

        Ok(())
    }
}
