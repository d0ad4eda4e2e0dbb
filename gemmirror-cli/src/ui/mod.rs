//! Terminal output for long-running commands.

mod progress;

pub use progress::ConsoleReporter;
