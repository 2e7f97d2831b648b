use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

static QUIET_MODE: AtomicBool = AtomicBool::new(false);
static VERBOSE_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_quiet_mode(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::Relaxed);
}

pub fn set_verbose_mode(verbose: bool) {
    VERBOSE_MODE.store(verbose, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::Relaxed)
}

pub fn is_verbose() -> bool {
    VERBOSE_MODE.load(Ordering::Relaxed)
}

/// Default filter directive for the given switches. Quiet wins over verbose.
pub fn default_directive(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "squeeze_workflow=debug,info"
    } else {
        "info"
    }
}

/// Installs the tracing subscriber on stderr. `RUST_LOG` overrides the switches.
pub fn init_logging(quiet: bool, verbose: bool) {
    set_quiet_mode(quiet);
    set_verbose_mode(verbose);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));

    // A subscriber may already be installed by an embedding application.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// User-facing report line on stdout, suppressed in quiet mode.
#[macro_export]
macro_rules! report {
    ($($arg:tt)*) => {
        if !$crate::logger::is_quiet() {
            println!($($arg)*);
        }
    };
}
