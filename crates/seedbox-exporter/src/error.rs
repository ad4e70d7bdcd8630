//! Exporter error types.

/// Errors from binding or running the metrics server.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("failed to bind metrics listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics server failed: {0}")]
    Serve(#[from] std::io::Error),
}
