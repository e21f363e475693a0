use std::{fmt::{self, Display, Formatter}, io::Write, str::FromStr, sync::{Arc, Mutex}};

use protosync_utils::DataType;

use crate::error::Error;

#[cfg(test)]
#[path = "./report.test.rs"]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn data_type(&self) -> DataType {
        match self {
            Level::Trace => DataType::Trace,
            Level::Debug => DataType::Debug,
            Level::Info => DataType::Info,
            Level::Warn => DataType::Warning,
            Level::Error => DataType::Error,
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(Error::InvalidLogLevel(s.to_string())),
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        };

        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub enum ReportSink {
    /// Errors on stderr, everything else on stdout.
    Stdio,

    /// Uncolored lines kept in memory.
    Buffer(Arc<Mutex<Vec<String>>>),
}

/// Logging capability handed down to everything that needs to say something.
/// Children created through [`Report::sub`] share the level and the sink of
/// their parent.
#[derive(Clone, Debug)]
pub struct Report {
    level: Level,
    prefix: Option<String>,
    sink: ReportSink,
}

impl Report {
    pub fn new(level: Level) -> Self {
        Report {
            level,
            prefix: None,
            sink: ReportSink::Stdio,
        }
    }

    pub fn buffered(level: Level) -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines
            = Arc::new(Mutex::new(Vec::new()));

        let report = Report {
            level,
            prefix: None,
            sink: ReportSink::Buffer(lines.clone()),
        };

        (report, lines)
    }

    pub fn sub(&self, prefix: impl Into<String>) -> Arc<Report> {
        let prefix = match &self.prefix {
            Some(parent) => format!("{}: {}", parent, prefix.into()),
            None => prefix.into(),
        };

        Arc::new(Report {
            level: self.level,
            prefix: Some(prefix),
            sink: self.sink.clone(),
        })
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    pub fn trace(&self, message: impl Display) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Display) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Display) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Display) {
        self.log(Level::Warn, message);
    }

    pub fn error(&self, message: impl Display) {
        self.log(Level::Error, message);
    }

    pub fn log(&self, level: Level, message: impl Display) {
        if !self.enabled(level) {
            return;
        }

        let body = match &self.prefix {
            Some(prefix) => format!("{}: {}", prefix, message),
            None => message.to_string(),
        };

        match &self.sink {
            ReportSink::Stdio => {
                let line
                    = format!("{}: {}", level.data_type().colorize(&level.to_string()), body);

                // A closed pipe isn't worth aborting a sync over
                let _ = match level {
                    Level::Error => writeln!(std::io::stderr(), "{}", line),
                    _ => writeln!(std::io::stdout(), "{}", line),
                };
            },

            ReportSink::Buffer(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(format!("{}: {}", level, body));
                }
            },
        }
    }
}
