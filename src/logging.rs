use env_logger::{Builder, Env, Target};
use std::io::Write;

/// Initialize env_logger with a timestamped line format. `RUST_LOG`
/// overrides the default `info` filter.
pub fn init_logging() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    builder.target(Target::Stderr);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.args()
        )
    });

    builder.init();
}
