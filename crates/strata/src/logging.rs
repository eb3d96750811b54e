//! Subscriber setup for the STRATA binaries.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a console subscriber.
///
/// `RUST_LOG` wins over `verbosity`; without either, [`DEFAULT_FILTER`] is
/// used. `verbosity` 1 enables `debug` for the pipeline, 2 and above `trace`.
pub fn init_logging(verbosity: u8) {
    let fallback = match verbosity {
        0 => DEFAULT_FILTER.to_string(),
        1 => "info,strata=debug,strata_procedural=debug".to_string(),
        _ => "info,strata=trace,strata_procedural=trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let console = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    // A second init (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(console).try_init();
}
