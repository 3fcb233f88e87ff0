use env_logger::Builder;
use std::io::Write;

/// Convenience function for setting up `env_logger` to see the log messages of the consumer. The
/// level can be set by the `RUST_LOG` environment variable.
pub fn setup_logger() {
    let mut builder = Builder::from_default_env();

    builder
        .format_timestamp_millis()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - [{}] {}:{} {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or_default(),
                record.line().unwrap_or_default(),
                record.args()
            )
        })
        .init();
}
