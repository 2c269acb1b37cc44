use tracing_subscriber::{EnvFilter, FmtSubscriber};

const QUIET: &str = "info";
/// Dependencies stay at info even with `--verbose`.
const VERBOSE: &str = "info,stratbench=debug";

/// Installs the global subscriber. Events go to stderr so that stdout stays
/// free for reports and the worker protocol.
pub fn init_logging(verbose: bool, no_color: bool) {
    let directive = filter_directive(
        verbose,
        std::env::var("STRATBENCH_LOG").ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("Ignoring log filter {:?}: {}", directive, err);
        EnvFilter::new(default_directive(verbose))
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}

/// `STRATBENCH_LOG` wins over `RUST_LOG`; blank values count as unset.
fn filter_directive(
    verbose: bool,
    stratbench_log: Option<String>,
    rust_log: Option<String>,
) -> String {
    stratbench_log
        .into_iter()
        .chain(rust_log)
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_directive(verbose).to_owned())
}

const fn default_directive(verbose: bool) -> &'static str {
    if verbose { VERBOSE } else { QUIET }
}
