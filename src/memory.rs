use crate::error::{CpuError, Result};

pub mod parse;

pub type Byte = u8; // 1 byte

/// Number of addressable cells
pub const MEMORY_SIZE: usize = 256;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Emulates memory for use with the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory
    pub data: [Byte; S],
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes the memory with zeroes
    fn default() -> Self {
        Memory { data: [0; S] }
    }
}

impl<const S: usize> Memory<S> {
    /// Reads a byte from the memory, if `position` is addressable
    pub fn get(&self, position: usize) -> Option<Byte> {
        self.data.get(position).copied()
    }

    /// Reads a byte from the memory
    pub fn read_byte(&self, position: usize) -> Result<Byte> {
        self.get(position)
            .ok_or(CpuError::OutOfBounds { address: position })
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, position: usize, value: Byte) -> Result<()> {
        let cell = self
            .data
            .get_mut(position)
            .ok_or(CpuError::OutOfBounds { address: position })?;
        *cell = value;
        Ok(())
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, position: usize, data: &[Byte]) -> Result<()> {
        let end = position + data.len();
        if end > S {
            // report the first cell that does not exist
            return Err(CpuError::OutOfBounds {
                address: position.max(S),
            });
        }

        self.data[position..end].copy_from_slice(data);
        Ok(())
    }

    /// Logs every 16 byte row which holds at least one non-zero byte
    pub fn dump(&self) {
        for (row, chunk) in self.data.chunks(16).enumerate() {
            if chunk.iter().all(|&byte| byte == 0) {
                continue;
            }

            let bytes: Vec<String> = chunk.iter().map(|byte| format!("{:02X}", byte)).collect();
            log::debug!("{:02X}: {}", row * 16, bytes.join(" "));
        }
    }
}

/// Writes a block of instructions directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $byte:expr ),+ ) => {
        $mem.write_array($pos, &[
            $(
                $byte as $crate::memory::Byte,
            )+
        ])
    };
}
