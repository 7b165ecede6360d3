//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Every helper writes to an explicit sink so the menu can run against any writer.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix)
pub fn error<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}: {}", "error".red().bold(), msg)
}

/// Print success status (green checkmark)
pub fn success<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{} {}", "✓".green(), msg)
}

/// Print section header (cyan bold)
pub fn header<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg.to_string().cyan().bold())
}

/// Print plain output (no color, for data)
pub fn info<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(out, "{}", msg)
}

/// Print prompt without newline (cyan)
pub fn prompt<W: Write + ?Sized>(out: &mut W, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    write!(out, "{} ", msg.to_string().cyan())?;
    out.flush()
}
