//! Colored logging helpers for consistent CLI output, plus the [`Reporter`]
//! seam the provisioner writes its notices through.

use colored::*;

pub fn info(msg: &str) {
    println!("{}", msg.bright_blue());
}

pub fn success(msg: &str) {
    println!("{}", msg.bright_green());
}

pub fn warning(msg: &str) {
    println!("{}", msg.bright_yellow());
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.bright_red());
}

pub fn step(msg: &str) {
    println!("{} {}", "→".bright_cyan(), msg.bright_white());
}

pub fn header(msg: &str) {
    println!("{}", msg.bright_cyan().bold());
}

/// Sink for human-readable provisioning messages.
pub trait Reporter {
    fn notice(&mut self, msg: &str);
    fn warning(&mut self, msg: &str);
}

/// Prints to the terminal. Notices are dropped when `quiet` is set; with
/// `stderr` set everything goes to stderr so stdout stays machine-readable.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub quiet: bool,
    pub stderr: bool,
}

impl Reporter for ConsoleReporter {
    fn notice(&mut self, msg: &str) {
        if self.quiet {
            return;
        }
        if self.stderr {
            eprintln!("{}", msg.bright_green());
        } else {
            success(msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.stderr {
            eprintln!("{}", msg.bright_yellow());
        } else {
            warning(msg);
        }
    }
}

/// Collects messages in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingReporter {
    pub notices: Vec<String>,
    pub warnings: Vec<String>,
}

impl Reporter for RecordingReporter {
    fn notice(&mut self, msg: &str) {
        self.notices.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }
}
