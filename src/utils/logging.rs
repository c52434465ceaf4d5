use tracing::Level;

/// Installs the global fmt subscriber, writing to stderr at `level`.
///
/// Unknown level names fall back to `info`. stdout is left alone because
/// `psclient` prints broker lines there.
pub fn init(level: &str) {
    let max_level = level.parse().unwrap_or(Level::INFO);

    // a second call is a no-op
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
