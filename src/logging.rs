use crate::config::Config;
use anyhow::{Error, Result};
use chrono::SecondsFormat;
use colored::{ColoredString, Colorize};
use std::fmt::{Debug, Result as FmtResult};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_log::NormalizeEvent;
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter};

fn level_color(level: Level, text: &str) -> ColoredString {
    match level {
        Level::ERROR => text.bright_red(),
        Level::WARN => text.bright_yellow(),
        Level::INFO => text.bright_green(),
        Level::DEBUG => text.bright_blue(),
        Level::TRACE => text.bright_purple(),
    }
}

/// Collects the message and the remaining fields of an event separately
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            name if name.starts_with("log.") => (),
            name => self.fields.push(format!("{}={:?}", name.cyan(), value)),
        }
    }
}

/// One line per event: `time LEVEL target: message key=value ...`
struct OneLine;

impl<C, N> FormatEvent<C, N> for OneLine
where
    C: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, C, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> FmtResult {
        // events forwarded from the `log` crate carry their real metadata in fields
        let normalized_meta = event.normalized_metadata();
        let meta = normalized_meta.as_ref().unwrap_or_else(|| event.metadata());

        write!(
            writer,
            "{} {} {}: ",
            chrono::Local::now()
                .to_rfc3339_opts(SecondsFormat::Millis, false)
                .dimmed(),
            level_color(*meta.level(), &format!("{:>5}", meta.level())),
            meta.target(),
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

impl<'w> FormatFields<'w> for OneLine {
    fn format_fields<R: RecordFields>(&self, mut writer: Writer<'w>, fields: R) -> FmtResult {
        let mut visitor = LineVisitor::default();
        fields.record(&mut visitor);

        write!(writer, "{}", visitor.message.bright_white())?;
        for field in visitor.fields {
            write!(writer, " {}", field)?;
        }
        Ok(())
    }
}

pub fn setup(config: &Config) -> Result<()> {
    setup_raw(config.json_log, &config.log)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn setup_raw(use_json: bool, filter: &str) -> Result<()> {
    let filter_layer = EnvFilter::try_new(filter)?;

    // logs go to stderr so they don't mix with command output
    if use_json {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(Error::msg)?;
    } else {
        let fmt_layer = fmt::layer()
            .event_format(OneLine)
            .fmt_fields(OneLine)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init()
            .map_err(Error::msg)?;
    }

    Ok(())
}
