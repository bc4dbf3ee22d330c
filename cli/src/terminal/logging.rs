use std::fmt;

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

/// Name of the boolean field carried by availability flip events.
pub const AVAILABLE_FIELD: &str = "available";

/// One line per event: a status symbol, the message, then any extra fields.
///
/// Events carrying an `available` field are availability flips and get an
/// up/down arrow instead of the level symbol.
pub struct HostmonFormatter {
    show_target: bool,
}

impl HostmonFormatter {
    pub fn new(show_target: bool) -> Self {
        Self { show_target }
    }
}

#[derive(Default)]
struct EventFields {
    message: String,
    available: Option<bool>,
    extra: Vec<(&'static str, String)>,
}

impl Visit for EventFields {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == AVAILABLE_FIELD {
            self.available = Some(value);
        } else {
            self.extra.push((field.name(), value.to_string()));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.extra.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.extra.push((field.name(), format!("{value:?}")));
        }
    }
}

impl<S, N> FormatEvent<S, N> for HostmonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let mut fields = EventFields::default();
        event.record(&mut fields);

        let symbol: ColoredString = match (fields.available, *meta.level()) {
            (Some(true), _) => "[▲]".green().bold(),
            (Some(false), _) => "[▼]".red().bold(),
            (None, Level::TRACE) => "[ ]".dimmed(),
            (None, Level::DEBUG) => "[?]".blue(),
            (None, Level::INFO) => "[+]".green().bold(),
            (None, Level::WARN) => "[*]".yellow().bold(),
            (None, Level::ERROR) => "[-]".red().bold(),
        };

        write!(writer, "{} ", symbol)?;
        if self.show_target {
            write!(writer, "{} ", meta.target().dimmed())?;
        }
        write!(writer, "{}", fields.message)?;

        for (name, value) in &fields.extra {
            write!(writer, " {}", format!("{name}={value}").dimmed())?;
        }

        writeln!(writer)
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level for our own
/// crates (0 = info, 1 = debug, 2+ = trace). From debug on, lines also name
/// the module that logged them.
pub fn init_logging(verbosity: u8) {
    let level: &str = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hostmon={level},hostmon_core={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(HostmonFormatter::new(verbosity > 0))
        .init();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
