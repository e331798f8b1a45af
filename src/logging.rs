use flexi_logger::{opt_format, Logger, LoggerHandle};

pub fn setup_logging() -> LoggerHandle {
    Logger::try_with_env_or_str("info")
        .expect("invalid log specification")
        .format(opt_format)
        .start()
        .expect("logger failed to start")
}
