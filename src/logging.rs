//! Logger setup that cooperates with the progress spinners.
//!
//! Walks log from rayon workers while a steady-tick spinner is drawing on
//! stderr. Each record is written with the spinners suspended, so a warning
//! lands on its own line and the spinner is redrawn underneath it.

use env_logger::{Builder, Env, Logger};
use indicatif::MultiProgress;
use log::{Log, Metadata, Record, SetLoggerError};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

/// An [`env_logger::Logger`] that hides every spinner in `progress` while it writes.
pub struct SpinnerAwareLogger {
    inner: Logger,
    progress: MultiProgress,
}

impl SpinnerAwareLogger {
    pub fn new(inner: Logger, progress: MultiProgress) -> Self {
        Self { inner, progress }
    }

    /// Builds the logger from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
    pub fn from_env(progress: MultiProgress) -> Self {
        let inner = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER)).build();
        Self::new(inner, progress)
    }

    /// Installs this logger as the global `log` backend.
    pub fn init(self) -> Result<(), SetLoggerError> {
        let max_level = self.inner.filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for SpinnerAwareLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.matches(record) {
            self.progress.suspend(|| self.inner.log(record));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::{ProgressBar, ProgressDrawTarget};
    use log::Level;

    fn hidden_logger(filter: &str) -> (SpinnerAwareLogger, MultiProgress) {
        let progress = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let inner = Builder::new().parse_filters(filter).build();
        (SpinnerAwareLogger::new(inner, progress.clone()), progress)
    }

    #[test]
    fn test_filter_is_delegated() {
        let (logger, _) = hidden_logger(DEFAULT_FILTER);
        let at = |level| Metadata::builder().level(level).target("backup_size").build();

        assert!(logger.enabled(&at(Level::Error)));
        assert!(logger.enabled(&at(Level::Warn)));
        assert!(!logger.enabled(&at(Level::Info)));
        assert!(!logger.enabled(&at(Level::Debug)));
    }

    #[test]
    fn test_logs_while_spinner_ticks() {
        let (logger, progress) = hidden_logger(DEFAULT_FILTER);
        let pb = progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(std::time::Duration::from_millis(5));

        std::thread::scope(|s| {
            for worker in 0..4 {
                let logger = &logger;
                s.spawn(move || {
                    logger.log(
                        &Record::builder()
                            .level(Level::Warn)
                            .target("backup_size::scan")
                            .args(format_args!("worker {worker} hit a permission error"))
                            .build(),
                    );
                });
            }
        });
        logger.flush();

        assert!(!pb.is_finished());
        pb.finish_and_clear();
        assert!(pb.is_finished());
    }
}
