use tracing_subscriber::{EnvFilter, fmt};

pub struct LoggerUtils {}

impl LoggerUtils {
    /// Installs the global subscriber. `RUST_LOG` wins over `verbosity`.
    pub fn init(verbosity: u8) {
        let default_level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("formulary={default_level},warn")));

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .compact()
            .init();
    }
}
