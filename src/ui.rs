//! Terminal output helpers.
//!
//! All user-facing status lines go through these so the glyph prefixes stay
//! consistent across commands. Fatal conditions are not printed here; they
//! travel up as errors and the top-level handler reports them.

use colored::*;

pub fn info(msg: &str) {
    println!("{} {}", "i".blue(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "!".yellow(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "x".red(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Echo a command line before it is executed.
pub fn command(line: &str) {
    println!("{} {}", "CMD".cyan().bold(), line);
}
