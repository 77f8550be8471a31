use frt_core::{ConfigError, TimerError};

/// Errors that stop the PC host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Tick rate and period do not fit the counter.
    #[error("Tick configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The timer table refused an operation.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// The interrupt thread could not be started.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// More probes than the bench has room for.
    #[error("Benchmark full, cannot add probe {probe}")]
    BenchFull { probe: String },

    /// The interrupt thread panicked.
    #[error("Interrupt thread panicked")]
    IrqPanicked,
}
