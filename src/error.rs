use std::io;

use crate::memory::Byte;
use crate::processor::alu::AluOp;

/// Errors which stop the execution of a program
#[derive(thiserror::Error, Debug)]
pub enum CpuError {
    #[error("unsupported instruction 0x{opcode:02X} at address 0x{pc:02X}")]
    UnsupportedOpcode { opcode: Byte, pc: usize },

    #[error("unsupported ALU operation `{0}`")]
    UnsupportedAluOperation(AluOp),

    #[error("memory has no address `0x{address:x}`")]
    OutOfBounds { address: usize },

    #[error("register index {0} out of bounds")]
    InvalidRegister(Byte),

    #[error("stack overflow: stack pointer at 0x{sp:02X}")]
    StackOverflow { sp: Byte },

    #[error("stack underflow: stack pointer at 0x{sp:02X}")]
    StackUnderflow { sp: Byte },

    #[error("stack pointer 0x{sp:02X} is above the top of the stack")]
    InvalidStackPointer { sp: Byte },

    #[error("machine is halted")]
    Halted,

    #[error("failed to write program output")]
    Output(#[from] io::Error),
}

pub type Result<T, E = CpuError> = std::result::Result<T, E>;
