#![deny(unsafe_code)]

//! Prometheus exporter for a Transmission daemon.
//!
//! Every `GET /metrics` runs one scrape: the [`Exporter`] asks its
//! [`MetricsSource`] for session statistics, the session record and the
//! torrent list, turns the answers into [`MetricFamily`] values, and the
//! server renders them in the text exposition format.

use std::future::Future;
use std::pin::Pin;

pub mod build_info;
pub mod collector;
pub mod error;
pub mod metrics;
pub mod server;
pub mod source;

pub use collector::Exporter;
pub use error::ExporterError;
pub use metrics::{MetricFamily, MetricKind, Sample, render};
pub use source::MetricsSource;

/// A boxed, sendable future. Keeps [`MetricsSource`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
