use std::fmt::{self, Write};

use jiff::{Zoned, tz::TimeZone};
use log::{Level, Record};
use logforth::{
    append::Stdout,
    layout::{JsonLayout, Layout},
};

use crate::args::{Args, LogStyle};

/// One line per record: timestamp, level, emitting crate, message.
///
/// The crate column is the root of the record target, so a line from
/// `completion::fallback` reads `completion` and lines up with the
/// per-crate directives of `--log-level`.
#[derive(Debug, Clone)]
struct CanvasLayout {
    colored: bool,
}

impl CanvasLayout {
    fn new(style: LogStyle) -> Self {
        Self {
            colored: matches!(style, LogStyle::Color),
        }
    }

    fn render(&self, record: &Record<'_>, now: &Zoned) -> Result<String, fmt::Error> {
        let mut output = String::new();
        let level = record.level();
        let component = component(record.target());

        write!(output, "{} ", now.strftime("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        if self.colored {
            write!(output, "\x1b[{}m{level:>5}\x1b[0m ", level_color(level))?;
            write!(output, "\x1b[2m{component:<10}\x1b[0m ")?;
        } else {
            write!(output, "{level:>5} {component:<10} ")?;
        }

        write!(output, "{}", record.args())?;

        Ok(output)
    }
}

impl Layout for CanvasLayout {
    fn format(
        &self,
        record: &Record<'_>,
        _diagnostics: &[Box<dyn logforth::diagnostic::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let now = Zoned::now().with_time_zone(TimeZone::UTC);

        Ok(self.render(record, &now)?.into_bytes())
    }
}

fn component(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

fn level_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 33,
        Level::Info => 32,
        Level::Debug => 34,
        Level::Trace => 35,
    }
}

pub(super) fn init(args: &Args) {
    logforth::builder()
        .dispatch(|d| {
            let d = d.filter(args.log_level.env_filter());

            match args.log_style {
                LogStyle::Json => d.append(Stdout::default().with_layout(JsonLayout::default())),
                style => d.append(Stdout::default().with_layout(CanvasLayout::new(style))),
            }
        })
        .apply();
}
