use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter for a given `-v` count. `RUST_LOG` takes precedence.
#[must_use]
pub const fn default_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. Safe to call more than once; later calls are
/// ignored.
pub fn init(verbose: u8) {
    let level = default_level(verbose).as_str().to_ascii_lowercase();
    let _ = Builder::from_env(Env::default().default_filter_or(level))
        .target(Target::Stderr)
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0), LevelFilter::Warn);
        assert_eq!(default_level(1), LevelFilter::Info);
        assert_eq!(default_level(2), LevelFilter::Debug);
        assert_eq!(default_level(7), LevelFilter::Trace);
    }
}
