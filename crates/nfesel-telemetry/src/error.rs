//! Error types for telemetry operations.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

/// Result alias for telemetry operations.
pub type TelemetryResult<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: TryInitError,
    },
    /// The configured level is not a valid filter directive.
    InvalidFilter {
        /// Directive text as supplied.
        directive: String,
        /// Underlying parse error.
        source: ParseError,
    },
    /// The requested log format is not recognised.
    UnknownFormat {
        /// Format name as supplied.
        value: String,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberInstall { .. } => {
                formatter.write_str("failed to install tracing subscriber")
            }
            Self::InvalidFilter { .. } => formatter.write_str("invalid log filter directive"),
            Self::UnknownFormat { .. } => {
                formatter.write_str("unknown log format (expected json or pretty)")
            }
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source } => Some(source),
            Self::InvalidFilter { source, .. } => Some(source),
            Self::UnknownFormat { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::util::SubscriberInitExt;

    fn try_init_error() -> Result<TryInitError, Box<dyn Error>> {
        match tracing_subscriber::registry().try_init() {
            Ok(()) => match tracing_subscriber::registry().try_init() {
                Ok(()) => Err(io::Error::other("expected init error").into()),
                Err(err) => Ok(err),
            },
            Err(err) => Ok(err),
        }
    }

    #[test]
    fn telemetry_error_display_and_source() -> Result<(), Box<dyn Error>> {
        let init_error = try_init_error()?;
        let parse_error = EnvFilter::try_new("nfesel=loud")
            .err()
            .ok_or_else(|| io::Error::other("expected parse error"))?;

        let install = TelemetryError::SubscriberInstall { source: init_error };
        assert_eq!(install.to_string(), "failed to install tracing subscriber");
        assert!(install.source().is_some());

        let filter = TelemetryError::InvalidFilter {
            directive: "nfesel=loud".into(),
            source: parse_error,
        };
        assert_eq!(filter.to_string(), "invalid log filter directive");
        assert!(filter.source().is_some());

        let format = TelemetryError::UnknownFormat {
            value: "xml".into(),
        };
        assert!(format.to_string().contains("json or pretty"));
        assert!(format.source().is_none());
        Ok(())
    }
}
