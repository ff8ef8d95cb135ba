use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber filtered by `RUST_LOG`. Returns `false` when a
/// global subscriber was already set, in which case nothing changes.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init()
        .is_ok()
}
