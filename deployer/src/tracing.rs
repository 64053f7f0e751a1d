//! Logging setup shared by the deployer binary.

use std::{panic, thread};

/// Initializes logging to stderr. `env_filter` uses the `EnvFilter` directive
/// syntax, for example `warn,deployer=debug`.
///
/// Standard output is left to the deployment report.
pub fn initialize(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    set_panic_hook();
}

// Logs panics in addition to the default panic printer.
fn set_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let thread = thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");
        tracing::error!("thread '{}' {}", thread_name, info);
        default_hook(info);
    }));
}
