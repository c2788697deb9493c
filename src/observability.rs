// In: src/observability.rs

//! Process-wide logger setup. The library itself only emits through the `log`
//! facade; this is for hosts (and the Python module) that want output.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::error::Result;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` backend that prints `[LEVEL] message` lines to
/// stderr, or appends them to `log_file`.
///
/// Only the first call has any effect. A logger installed elsewhere wins
/// silently.
pub fn init_logging(level: LevelFilter, log_file: Option<&str>) -> Result<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(level);

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
