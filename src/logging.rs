//! Tracing subscriber setup. Log events go to stderr so stdout stays
//! reserved for command output.

use tracing_subscriber::EnvFilter;

use crate::domain::error::TickwiseError;

pub const DEFAULT_FILTER: &str = "info";

/// `RUST_LOG` wins over the configured filter, which wins over `info`.
pub fn resolve_filter(configured: Option<&str>) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|f| !f.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

pub fn init_tracing(filter: &str, format: &str) -> Result<(), TickwiseError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|err| TickwiseError::ConfigInvalid {
        section: "log".to_string(),
        key: "filter".to_string(),
        reason: format!("invalid log filter: {err}"),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (repeated runs in one process).
    let installed = if format.trim().eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_config_error() {
        let err = init_tracing("tickwise=notalevel", "text").unwrap_err();
        assert!(matches!(err, TickwiseError::ConfigInvalid { key, .. } if key == "filter"));
    }

    #[test]
    fn repeated_init_is_harmless() {
        assert!(init_tracing("warn", "text").is_ok());
        assert!(init_tracing("warn", "json").is_ok());
    }
}
