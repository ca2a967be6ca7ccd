use log::LevelFilter;
use log4rs::Config;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

const LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Raises `base` by one level per `-v`, stopping at trace.
pub fn raise_level(base: LevelFilter, verbose: u8) -> LevelFilter {
    let position = LEVELS.iter().position(|level| *level == base).unwrap_or(0);
    let raised = (position + usize::from(verbose)).min(LEVELS.len() - 1);
    LEVELS[raised]
}

/// Sends this crate's log lines to stderr so they never mix with command output.
pub fn init(level: LevelFilter) -> anyhow::Result<log4rs::Handle> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})}: {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .logger(Logger::builder().build("task_cli", level))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
    Ok(log4rs::init_config(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_level_steps_up() {
        assert_eq!(raise_level(LevelFilter::Warn, 0), LevelFilter::Warn);
        assert_eq!(raise_level(LevelFilter::Warn, 1), LevelFilter::Info);
        assert_eq!(raise_level(LevelFilter::Warn, 2), LevelFilter::Debug);
    }

    #[test]
    fn test_raise_level_saturates_at_trace() {
        assert_eq!(raise_level(LevelFilter::Info, 200), LevelFilter::Trace);
    }

    #[test]
    fn test_raise_level_from_off() {
        assert_eq!(raise_level(LevelFilter::Off, 1), LevelFilter::Error);
    }
}
