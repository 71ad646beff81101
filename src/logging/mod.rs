use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG`, when set, replaces the
/// default filter entirely.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,env_injector=debug"
    } else {
        "warn,env_injector=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
