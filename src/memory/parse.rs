//! Loader for programs in the LS-8 text format: one byte per line, written as
//! eight binary digits, optionally followed by a `#` comment.
//!
//! ```text
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::Lines;

use super::{Byte, MEMORY_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidNumber { radix: u32 },
    InvalidAddress { address: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse number with radix `{}`", radix)
            }
            ParseErrorKind::InvalidAddress { address } => {
                write!(f, "memory has no address `0x{:x}`", address)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl std::error::Error for ParseError {}

/// Everything that can go wrong while getting a program into memory
#[derive(thiserror::Error, Debug)]
pub enum ProgramLoadError {
    #[error("failed to read program `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", display_errors(.0))]
    Parse(Vec<ParseError>),
}

fn display_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns the text of a program into the bytes to place at address 0.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    program: Vec<Byte>,
    capacity: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data` whose result has to fit into
    /// `capacity` bytes.
    pub fn new(data: &'a str, capacity: usize) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            program: Vec::new(),
            capacity,
        }
    }

    /// Consumes `self` and tries to parse every line of the data.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Vec<Byte>, ProgramLoadError> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(self.program)
        } else {
            Err(ProgramLoadError::Parse(errors))
        }
    }

    /// Tries to parse the next line. Each byte is located on its own line.
    fn parse_next_line(&mut self) -> Option<Result<(), ParseError>> {
        let line = self.lines.next()?;
        self.line_nr += 1;

        let value = line.split('#').next().unwrap_or("").trim();

        if value.is_empty() {
            // Comment or empty line; skip
            return Some(Ok(()));
        }

        let byte = match Byte::from_str_radix(value, 2) {
            Ok(byte) => byte,
            Err(_) => {
                return Some(Err(ParseError::new(
                    ParseErrorKind::InvalidNumber { radix: 2 },
                    format!("`{}` is not a binary byte", value),
                    self.line_nr,
                )))
            }
        };

        Some(self.write_byte(byte))
    }

    /// Appends `byte` to the program.
    ///
    /// # Errors
    ///
    /// This will return an error if the program outgrows the memory.
    fn write_byte(&mut self, byte: Byte) -> Result<(), ParseError> {
        let address = self.program.len();
        if address >= self.capacity {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAddress { address },
                "program is larger than memory",
                self.line_nr,
            ));
        }

        log::trace!("[{}] 0x{:02X} = {:08b}", self.line_nr, address, byte);
        self.program.push(byte);
        Ok(())
    }
}

/// Parses a program from its text.
pub fn parse_program(data: &str) -> Result<Vec<Byte>, ProgramLoadError> {
    Parser::new(data, MEMORY_SIZE).parse()
}

/// Reads and parses the program stored at `path`.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<Byte>, ProgramLoadError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| ProgramLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_program(&data)
}

#[cfg(test)]
mod tests {
    use crate::processor::{Instruction, Processor};

    use super::*;
    use color_eyre::Result;

    const PRINT8: &str = "\
10000010 # LDI R0,8
00000000
00001000
01000111 # PRN R0
00000000
00000001 # HLT
";

    #[test]
    fn parse_print8() -> Result<()> {
        let program = parse_program(PRINT8)?;

        assert_eq!(
            program,
            vec![
                Instruction::LDI as Byte,
                0,
                8,
                Instruction::PRN as Byte,
                0,
                Instruction::HLT as Byte,
            ]
        );

        Ok(())
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() -> Result<()> {
        let data = r#"
            # print8.ls8

            10000010   # LDI R0,8
            00000000
                # operand follows
            00001000
        "#;

        assert_eq!(parse_program(data)?, vec![0b1000_0010, 0, 8]);

        Ok(())
    }

    #[test]
    fn parse_into_memory() -> Result<()> {
        let cpu = Processor::with_program(&parse_program(PRINT8)?)?;
        let mem = cpu.memory;

        assert_eq!(mem.read_byte(0)?, Instruction::LDI.into());
        assert_eq!(mem.read_byte(2)?, 8);
        assert_eq!(mem.read_byte(5)?, Instruction::HLT.into());
        assert_eq!(mem.read_byte(6)?, 0);

        Ok(())
    }

    #[test]
    fn parse_collects_every_malformed_line() -> Result<()> {
        let data = "10000010\n0000000x\n00000001\n12\n";

        match parse_program(data) {
            Err(ProgramLoadError::Parse(errors)) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].line_nr(), 2);
                assert_eq!(errors[1].line_nr(), 4);
                assert_eq!(errors[0].kind(), ParseErrorKind::InvalidNumber { radix: 2 });
            }
            other => panic!("expected parse errors, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn parse_rejects_values_wider_than_a_byte() -> Result<()> {
        assert!(matches!(
            parse_program("100000000\n"),
            Err(ProgramLoadError::Parse(_))
        ));

        Ok(())
    }

    #[test]
    fn parse_rejects_programs_larger_than_memory() -> Result<()> {
        let data = "00000000\n".repeat(4);

        match Parser::new(&data, 3).parse() {
            Err(ProgramLoadError::Parse(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(
                    errors[0].kind(),
                    ParseErrorKind::InvalidAddress { address: 3 }
                );
            }
            other => panic!("expected parse errors, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn load_missing_file() -> Result<()> {
        let result = load_program("does/not/exist.ls8");

        assert!(matches!(result, Err(ProgramLoadError::Io { .. })));

        Ok(())
    }
}
