use std::{env, io::Write, sync::Once};

use chrono::Local;
use env_logger::{fmt::Formatter, Builder as EnvLoggerBuilder};
use log::{LevelFilter, Record};

use crate::errors::error::{TestUtilsError, TestUtilsResult};

static TEST_LOGGING_INIT: Once = Once::new();

/// Installs the test logger once per test binary. Nothing is logged unless
/// `RUST_LOG` is set.
pub fn init_logger() {
    TEST_LOGGING_INIT.call_once(|| {
        if let Ok(pattern) = env::var("RUST_LOG") {
            if let Err(err) = ProofTemplateTestLogger::init(&pattern) {
                eprintln!("{}", err);
            }
        }
    })
}

#[derive(Clone, Copy, Debug)]
pub struct ProofTemplateTestLogger;

fn write_record(buf: &mut Formatter, record: &Record, colored: bool) -> std::io::Result<()> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S.%f");
    let file = record.file().unwrap_or("");
    let line = record.line().unwrap_or(0);
    if colored {
        let style = buf.default_level_style(record.level());
        writeln!(
            buf,
            "{}|{style}{:>5}{style:#}|{:<30}|{:>35}:{:<4}| {}",
            timestamp,
            record.level(),
            record.target(),
            file,
            line,
            record.args()
        )
    } else {
        writeln!(
            buf,
            "{}|{:>5}|{:<30}|{:>35}:{:<4}| {}",
            timestamp,
            record.level(),
            record.target(),
            file,
            line,
            record.args()
        )
    }
}

impl ProofTemplateTestLogger {
    pub fn init(pattern: &str) -> TestUtilsResult<()> {
        let colored = !matches!(
            env::var("RUST_LOG_FORMATTER").as_deref(),
            Ok("text_no_color")
        );
        EnvLoggerBuilder::new()
            .format(move |buf, record| write_record(buf, record, colored))
            .filter(None, LevelFilter::Off)
            .parse_filters(pattern)
            .is_test(true)
            .try_init()
            .map_err(|err| TestUtilsError::LoggingError(format!("Cannot init logger: {:?}", err)))
    }
}
