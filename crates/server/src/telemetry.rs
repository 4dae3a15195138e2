//! Error tracking and log output, shared by `crm-server` and `crm-cli`.
//!
//! Sentry has to be started before the subscriber is installed so that the
//! Sentry tracing layer finds a client. Callers therefore run
//! [`init_sentry`] first, keep the guard, then call [`init_tracing`].

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{
    EnvFilter, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::CrmConfig;

/// Stream that log lines are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Server logs.
    Stdout,
    /// CLI logs; stdout carries command output.
    Stderr,
}

impl LogOutput {
    fn writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Start Sentry if `SENTRY_DSN` is configured.
///
/// The returned guard flushes pending events on drop and must live as long
/// as the process.
#[must_use]
pub fn init_sentry(config: &CrmConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            // Customer records are PII
            send_default_pii: false,
            ..Default::default()
        },
    )))
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_filter_for(level: tracing::Level) -> sentry_tracing::EventFilter {
    match level {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_filter`. Lines are JSON when `log_json` is
/// set, plain text otherwise.
pub fn init_tracing(log_json: bool, default_filter: &str, output: LogOutput) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json_layer = log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(output.writer())
    });
    let text_layer =
        (!log_json).then(|| tracing_subscriber::fmt::layer().with_writer(output.writer()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(|metadata| sentry_filter_for(*metadata.level())))
        .init();
}
