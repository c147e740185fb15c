use std::convert::TryFrom;
use std::fmt::Write as _;
use std::io::Write;

use crate::error::{CpuError, Result};
use crate::memory::{Byte, StdMem};
use log::*;
use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

pub mod alu;
pub mod registers;

use alu::AluOp;
use registers::{RegisterFile, STACK_TOP};

/// Emulates the CPU together with the memory it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// Program counter
    pub pc: usize,
    /// R0 to R7 and the flags
    pub registers: RegisterFile,
    pub memory: StdMem,
    /// Cleared by `HLT`
    pub running: bool,
    /// First address past the loaded program. The stack may not grow below it.
    stack_limit: Byte,
}

impl Default for Processor {
    /// Initializes a new CPU with empty memory
    fn default() -> Self {
        Self::new(StdMem::default())
    }
}

impl Processor {
    /// Initializes a new CPU which executes `memory` starting at address 0.
    /// Nothing keeps the stack out of the program; load programs through
    /// [`Processor::with_program`] for that.
    pub fn new(memory: StdMem) -> Self {
        Self {
            pc: 0,
            registers: RegisterFile::default(),
            memory,
            running: true,
            stack_limit: 0,
        }
    }

    /// Initializes a new CPU and loads `program` at address 0. The stack is
    /// kept from growing into the program.
    pub fn with_program(program: &[Byte]) -> Result<Self> {
        let mut memory = StdMem::default();
        memory.write_array(0, program)?;

        let mut cpu = Self::new(memory);
        cpu.stack_limit = program.len().min(STACK_TOP as usize) as Byte;
        Ok(cpu)
    }

    /// Reads the opcode at the program counter and as many operands as it
    /// takes. Operands the instruction does not use are returned as zero.
    fn fetch(&self) -> Result<(Instruction, Byte, Byte)> {
        let opcode = self.memory.read_byte(self.pc)?;
        let instruction = Instruction::try_from(opcode)
            .map_err(|_| CpuError::UnsupportedOpcode { opcode, pc: self.pc })?;

        let mut operands = [0; 2];
        for (offset, operand) in operands
            .iter_mut()
            .enumerate()
            .take(instruction.operands() as usize)
        {
            *operand = self.memory.read_byte(self.pc + 1 + offset)?;
        }

        Ok((instruction, operands[0], operands[1]))
    }

    /// Moves the program counter past `instruction` and its operands
    fn advance(&mut self, instruction: Instruction) {
        self.pc += instruction.len();
    }

    fn push(&mut self, value: Byte) -> Result<()> {
        let sp = self.registers.sp();
        if sp > STACK_TOP {
            return Err(CpuError::InvalidStackPointer { sp });
        }
        if sp <= self.stack_limit {
            return Err(CpuError::StackOverflow { sp });
        }

        let sp = sp - 1;
        self.registers.set_sp(sp);
        self.memory.write_byte(sp as usize, value)
    }

    fn pop(&mut self) -> Result<Byte> {
        let sp = self.registers.sp();
        if sp > STACK_TOP {
            return Err(CpuError::InvalidStackPointer { sp });
        }
        if sp == STACK_TOP {
            return Err(CpuError::StackUnderflow { sp });
        }

        let value = self.memory.read_byte(sp as usize)?;
        self.registers.set_sp(sp + 1);
        Ok(value)
    }

    /// Executes a single instruction. Every instruction moves the program
    /// counter itself.
    pub fn execute_instruction<W: Write>(
        &mut self,
        instruction: Instruction,
        op_a: Byte,
        op_b: Byte,
        out: &mut W,
    ) -> Result<()> {
        match instruction {
            Instruction::HLT => {
                self.running = false;

                debug!("{}", instruction.name());
            }
            Instruction::LDI => {
                self.registers.set(op_a, op_b)?;
                self.advance(instruction);

                debug!("{} R{} {}", instruction.name(), op_a, op_b);
            }
            Instruction::PRN => {
                let value = self.registers.get(op_a)?;
                writeln!(out, "{}", value)?;
                self.advance(instruction);

                debug!("{} R{}: {}", instruction.name(), op_a, value);
            }
            Instruction::PUSH => {
                let value = self.registers.get(op_a)?;
                self.push(value)?;
                self.advance(instruction);

                debug!("{} R{}: {}", instruction.name(), op_a, value);
            }
            Instruction::POP => {
                // validate the register before touching the stack
                self.registers.get(op_a)?;
                let value = self.pop()?;
                self.registers.set(op_a, value)?;
                self.advance(instruction);

                debug!("{} R{}: {}", instruction.name(), op_a, value);
            }
            Instruction::CALL => {
                let ret = self.pc + instruction.len();
                let ret = Byte::try_from(ret).map_err(|_| CpuError::OutOfBounds { address: ret })?;
                self.registers.get(op_a)?;
                self.push(ret)?;
                // read after the push, so `CALL R7` jumps to the new stack top
                let target = self.registers.get(op_a)?;
                self.pc = target as usize;

                debug!(
                    "{} R{}: 0x{:02X} (return to 0x{:02X})",
                    instruction.name(),
                    op_a,
                    target,
                    ret
                );
            }
            Instruction::RET => {
                let ret = self.pop()?;
                self.pc = ret as usize;

                debug!("{} 0x{:02X}", instruction.name(), ret);
            }
            Instruction::CMP => {
                alu::execute(AluOp::Cmp, &mut self.registers, op_a, op_b)?;
                self.advance(instruction);
            }
            Instruction::ADD => {
                alu::execute(AluOp::Add, &mut self.registers, op_a, op_b)?;
                self.advance(instruction);
            }
            Instruction::MUL => {
                alu::execute(AluOp::Mul, &mut self.registers, op_a, op_b)?;
                self.advance(instruction);
            }
            Instruction::JMP => {
                let target = self.registers.get(op_a)?;
                self.pc = target as usize;

                debug!("{} R{}: 0x{:02X}", instruction.name(), op_a, target);
            }
            Instruction::JEQ => {
                let target = self.registers.get(op_a)?;
                let taken = self.registers.flags.is_equal();
                if taken {
                    self.pc = target as usize;
                } else {
                    self.advance(instruction);
                }

                debug!(
                    "{} R{}: 0x{:02X} taken: {}",
                    instruction.name(),
                    op_a,
                    target,
                    taken
                );
            }
            Instruction::JNE => {
                let target = self.registers.get(op_a)?;
                let taken = !self.registers.flags.is_equal();
                if taken {
                    self.pc = target as usize;
                } else {
                    self.advance(instruction);
                }

                debug!(
                    "{} R{}: 0x{:02X} taken: {}",
                    instruction.name(),
                    op_a,
                    target,
                    taken
                );
            }
        }

        Ok(())
    }

    /// Runs one fetch, decode and execute cycle
    pub fn step<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if !self.running {
            return Err(CpuError::Halted);
        }

        if log_enabled!(Level::Trace) {
            trace!("{}", self.trace());
        }

        let (instruction, op_a, op_b) = self.fetch()?;
        self.execute_instruction(instruction, op_a, op_b, out)
    }

    /// Run program until `HLT` is executed
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<()> {
        while self.running {
            self.step(out)?;
        }

        info!("Program halted at 0x{:02X}", self.pc);

        Ok(())
    }

    /// Formats the machine state as
    /// `TRACE: PC | B0 B1 B2 | R0 .. R7`, all in hex.
    pub fn trace(&self) -> String {
        let mut line = format!("TRACE: {:02X} |", self.pc);
        for offset in 0..3 {
            match self.memory.get(self.pc + offset) {
                Some(byte) => {
                    let _ = write!(line, " {:02X}", byte);
                }
                None => line.push_str(" --"),
            }
        }

        line.push_str(" |");
        for value in self.registers.values() {
            let _ = write!(line, " {:02X}", value);
        }

        line
    }
}

macro_rules! instructions {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instructions.
        /// Bits 7 and 6 of an opcode hold the number of operands following it.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Instruction {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Instruction {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }
    }
}

impl Instruction {
    /// Number of operand bytes following the opcode
    pub fn operands(&self) -> u8 {
        (*self as u8) >> 6
    }

    /// Size of the instruction in bytes, including the opcode
    pub fn len(&self) -> usize {
        1 + self.operands() as usize
    }
}

instructions! {
    /// Stop the execution of the program
    HLT = 0b0000_0001,
    /// Load an immediate value into a register
    /// @param reg The register to write
    /// @param value The value to load
    LDI = 0b1000_0010,
    /// Print the decimal value of a register
    /// @param reg The register to print
    PRN = 0b0100_0111,
    /// Push a register onto the stack
    /// @param reg The register to push
    PUSH = 0b0100_0101,
    /// Pop the top of the stack into a register
    /// @param reg The register to write
    POP = 0b0100_0110,
    /// Push the return address and jump to the address in a register
    /// @param reg The register holding the subroutine address
    CALL = 0b0101_0000,
    /// Pop the return address into the program counter
    RET = 0b0001_0001,
    /// Compare two registers and set the flags
    /// @param reg_a, reg_b The registers to compare
    CMP = 0b1010_0111,
    /// Add two registers (not supported by the ALU)
    ADD = 0b1010_0000,
    /// Multiply two registers (not supported by the ALU)
    MUL = 0b1010_0010,
    /// Jump to the address in a register
    /// @param reg The register holding the address
    JMP = 0b0101_0100,
    /// Jump if the equal flag is set
    /// @param reg The register holding the address
    JEQ = 0b0101_0101,
    /// Jump if the equal flag is clear
    /// @param reg The register holding the address
    JNE = 0b0101_0110,
}
