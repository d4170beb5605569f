//! Tracing subscriber setup for the console binary.
//!
//! Plain and JSON output both go to the writer handed in. The binary uses
//! stderr; stdout belongs to the operator console.

use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Filter from `RUST_LOG`, falling back to `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Build the fmt subscriber, plain or JSON, writing to `writer`.
pub fn subscriber<W>(filter: EnvFilter, json: bool, writer: W) -> BoxedSubscriber
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    if json {
        Box::new(builder.json().finish())
    } else {
        Box::new(builder.finish())
    }
}

/// Install the global subscriber, logging to stderr.
pub fn init(filter: EnvFilter, json: bool) -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber(filter, json, std::io::stderr))
}
