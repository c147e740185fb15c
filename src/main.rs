use std::io;

use color_eyre::eyre::{Result, WrapErr};
use simple_logger::SimpleLogger;

use ls8::config::Config;
use ls8::memory::parse::load_program;
use ls8::processor::Processor;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling

    let config = Config::from_env()?;
    SimpleLogger::new().with_level(config.log_level).init()?; // logging

    let program = load_program(&config.program)
        .wrap_err_with(|| format!("failed to load `{}`", config.program.display()))?;
    let mut cpu = Processor::with_program(&program)?;
    cpu.memory.dump();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cpu.run(&mut out)
        .wrap_err_with(|| format!("execution failed\n{}", cpu.trace()))?;

    Ok(())
}
