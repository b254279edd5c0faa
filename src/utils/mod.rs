pub mod artifact_config;
pub mod constants;
pub mod env;

/// Initialise `env_logger`, defaulting to `info` (or `debug` when verbose).
/// `RUST_LOG` still takes precedence when set.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
