use std::ffi::OsString;
use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::LevelFilter;

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "LS8_LOG";

/// Settings of the `ls8` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program to load at address 0
    pub program: PathBuf,
    /// `warn` unless overridden, so a normal run only prints the program's output
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads the configuration from the command line and the environment
    pub fn from_env() -> Result<Self> {
        Self::new(std::env::args_os().skip(1), std::env::var(LOG_ENV).ok())
    }

    /// Builds the configuration from the arguments (without the binary name)
    /// and the value of [`LOG_ENV`]
    pub fn new<I>(args: I, log_level: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = OsString>,
    {
        let program = args
            .into_iter()
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("usage: ls8 <program>"))?;

        let log_level = match log_level {
            Some(level) => level
                .parse()
                .wrap_err_with(|| format!("invalid {} value `{}`", LOG_ENV, level))?,
            None => LevelFilter::Warn,
        };

        Ok(Self { program, log_level })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_program_argument() -> Result<()> {
        let config = Config::new(args(&["print8.ls8"]), None)?;

        assert_eq!(config.program, PathBuf::from("print8.ls8"));
        assert_eq!(config.log_level, LevelFilter::Warn);

        Ok(())
    }

    #[test]
    fn test_missing_program() -> Result<()> {
        assert!(Config::new(args(&[]), None).is_err());

        Ok(())
    }

    #[test]
    fn test_log_level() -> Result<()> {
        let config = Config::new(args(&["a.ls8"]), Some("trace".to_string()))?;
        assert_eq!(config.log_level, LevelFilter::Trace);

        assert!(Config::new(args(&["a.ls8"]), Some("loud".to_string())).is_err());

        Ok(())
    }
}
