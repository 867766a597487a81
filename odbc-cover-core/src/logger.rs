use log::LevelFilter;
use std::time::{Duration, Instant};

pub(crate) const QUERY_TARGET: &str = "odbc_cover::query";

#[derive(Clone, Debug)]
pub(crate) struct LogSettings {
    pub(crate) statements_level: LevelFilter,
    pub(crate) slow_statements_level: LevelFilter,
    pub(crate) slow_statements_duration: Duration,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            statements_level: LevelFilter::Info,
            slow_statements_level: LevelFilter::Warn,
            slow_statements_duration: Duration::from_secs(1),
        }
    }
}

impl LogSettings {
    pub(crate) fn log_statements(&mut self, level: LevelFilter) {
        self.statements_level = level;
    }
    pub(crate) fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) {
        self.slow_statements_level = level;
        self.slow_statements_duration = duration;
    }
}

/// Times one statement execution and reports it when dropped.
pub(crate) struct QueryLogger {
    sql: String,
    columns: usize,
    start: Instant,
    settings: LogSettings,
}

impl QueryLogger {
    pub(crate) fn new(sql: &str, settings: LogSettings) -> Self {
        Self {
            sql: sql.to_owned(),
            columns: 0,
            start: Instant::now(),
            settings,
        }
    }

    pub(crate) fn set_columns(&mut self, columns: usize) {
        self.columns = columns;
    }

    fn finish(&self) {
        let elapsed = self.start.elapsed();

        let lvl = if elapsed >= self.settings.slow_statements_duration {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        };

        if let Some(lvl) = lvl
            .to_level()
            .filter(|lvl| log::log_enabled!(target: QUERY_TARGET, *lvl))
        {
            let summary = parse_query_summary(&self.sql);

            log::logger().log(
                &log::Record::builder()
                    .args(format_args!(
                        "{}; columns returned: {}, elapsed: {:.3?}\n\n{}\n",
                        summary, self.columns, elapsed, self.sql
                    ))
                    .level(lvl)
                    .module_path_static(Some("odbc_cover::query"))
                    .target(QUERY_TARGET)
                    .build(),
            );
        }
    }
}

impl Drop for QueryLogger {
    fn drop(&mut self) {
        self.finish();
    }
}

/// First four words of the statement, for the log line header.
pub(crate) fn parse_query_summary(sql: &str) -> String {
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}
