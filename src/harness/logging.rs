//! Process-wide log output configuration

use std::str::FromStr;
use structopt::StructOpt;
use thiserror::Error;

/// Layout of emitted log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-field lines
    Text,
    /// Abbreviated human readable lines
    Compact,
    /// One JSON object per line
    Json,
}

/// Error returned when parsing an unknown [`LogFormat`]
#[derive(Debug, Error)]
#[error("unknown log format {0}, expected one of text, compact, json")]
pub struct UnknownLogFormat(String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(UnknownLogFormat(s.to_owned())),
        }
    }
}

/// Options controlling the log output
#[derive(Debug, StructOpt)]
pub struct LoggingOptions {
    /// Log filter directives, e.g. `debug` or `info,stringsvc=trace`
    #[structopt(long, env = "RUST_LOG", default_value = "info,lapin=warn")]
    pub log: String,

    /// Format of the log output (text, compact or json)
    #[structopt(long, env, default_value = "text", value_name = "format")]
    pub log_format: LogFormat,
}

impl LoggingOptions {
    /// Installs the global tracing subscriber. Has to be called once, before any module is started.
    pub fn init(&self) {
        let formatter = tracing_subscriber::fmt().with_env_filter(self.log.as_str());

        match self.log_format {
            LogFormat::Text => formatter.init(),
            LogFormat::Compact => formatter.compact().init(),
            LogFormat::Json => formatter.json().init(),
        };
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_log_formats() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn reject_unknown_log_format() {
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn default_to_text_output() {
        let options = LoggingOptions::from_iter_safe(vec!["test"]).unwrap();
        assert_eq!(options.log_format, LogFormat::Text);
    }
}
