use std::{fs::OpenOptions, path::Path};

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{FormatFields, format::Writer},
    layer::{Context, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::BridgeError;

const LOG_FILENAME: &str = "bridge.log";
const DEFAULT_LOG_FILTER: &str =
    "debug,h2=warn,rustls=warn,hyper=warn,hyper_util=warn,reqwest=warn,tower=warn";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub line: String,
    pub level: String,
}

/// Receiver of log statements forwarded to the embedding application
pub trait Logger: Send + Sync {
    fn log(&self, l: LogEntry);
}

struct BridgeLogger {
    /// Optional external log listener, that can receive a stream of log statements
    log_listener: Option<Box<dyn Logger>>,
}

impl<S> Layer<S> for BridgeLogger
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().level() > &Level::INFO {
            return;
        }
        let Some(listener) = self.log_listener.as_ref() else {
            return;
        };
        let mut buf = String::new();
        let writer = Writer::new(&mut buf);

        if tracing_subscriber::fmt::format::DefaultFields::new()
            .format_fields(writer, event)
            .is_ok()
        {
            listener.log(LogEntry {
                line: buf,
                level: event.metadata().level().to_string(),
            });
        }
    }
}

/// Installs the global subscriber writing to `bridge.log` inside `log_dir`.
///
/// Fails when the log file cannot be opened or a global subscriber is already set.
pub fn init_logging(
    log_dir: &Path,
    app_logger: Option<Box<dyn Logger>>,
    log_filter: Option<String>,
) -> Result<(), BridgeError> {
    std::fs::create_dir_all(log_dir).map_err(|e| BridgeError::Generic(e.to_string()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILENAME))
        .map_err(|e| BridgeError::Generic(e.to_string()))?;

    let filter = log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_line_number(true)
                .with_writer(log_file),
        )
        .with(BridgeLogger {
            log_listener: app_logger,
        })
        .try_init()
        .map_err(|e| BridgeError::Generic(e.to_string()))?;

    Ok(())
}
