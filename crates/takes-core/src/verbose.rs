//! Opt-in diagnostics on stderr.
//!
//! Off by default. The CLI switches it on for `--verbose` or when the saved
//! settings ask for it; library code reports through `verbose!` and never
//! writes to stdout.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(false);

const PREFIX: &str = "[takes]";

pub fn set_verbose(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn emit(args: fmt::Arguments<'_>) {
    eprintln!("{PREFIX} {args}");
}

/// `format!`-style diagnostic line, dropped unless verbose output is on
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::verbose::is_verbose() {
            $crate::verbose::emit(format_args!($($arg)*));
        }
    };
}
