//! External command execution.
//!
//! One child process at a time, stdout/stderr inherited from the parent,
//! failure fatal to the build. There is no retry, no timeout and no output
//! capture: the compiler's diagnostics go straight to the user's terminal.

use crate::ui;
use anyhow::{Context, Result, bail};
use std::process::Command;

/// Run `argv` (first element is the executable), echoing the invocation line
/// first. Spawn failure and non-zero exit both abort the caller.
pub fn run(argv: &[String]) -> Result<()> {
    let (program, args) = argv.split_first().context("Empty command")?;
    ui::command(&argv.join(" "));

    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("Could not execute command '{}'", program))?;

    if !status.success() {
        match status.code() {
            Some(code) => bail!("Command '{}' exited with exitcode '{}'", program, code),
            None => bail!("Command '{}' was terminated by a signal", program),
        }
    }
    Ok(())
}

/// Assemble `<compiler> <inputs...> <args...>` and run it. Exists so callers
/// with a dynamic input list do not have to build the argv by hand.
pub fn compile(compiler: &str, inputs: &[String], args: &[String]) -> Result<()> {
    let mut argv = Vec::with_capacity(inputs.len() + args.len() + 1);
    argv.push(compiler.to_string());
    argv.extend_from_slice(inputs);
    argv.extend_from_slice(args);
    run(&argv)
}
