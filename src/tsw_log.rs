// stderr logger for the `log` facade
// Stdout belongs to the terminal UI, so run with `2>tswpr.log` to keep the records

use std::env;
use std::io::{self, Write};

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level (error, warn, info, debug, trace, off)
pub const LOG_ENV: &str = "TSWPR_LOG";

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                io::stderr().lock(),
                "{:<5} {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

/// Parse a level name, falling back to `warn`
pub fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|lvl| lvl.trim().parse().ok())
        .unwrap_or(LevelFilter::Warn)
}

/// Install the logger with the level from `TSWPR_LOG`
pub fn init_logging() {
    let level = level_from(env::var(LOG_ENV).ok().as_deref());
    let _ = log::set_logger(&LOGGER).map(|()| log::set_max_level(level));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing() {
        assert_eq!(level_from(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(level_from(Some("off")), LevelFilter::Off);
        assert_eq!(level_from(Some("loud")), LevelFilter::Warn);
        assert_eq!(level_from(None), LevelFilter::Warn);
    }
}
