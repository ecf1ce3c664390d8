use anyhow::{anyhow, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log records go
pub enum LogTarget {
    /// Append to a file; used while the TUI owns the terminal
    File(PathBuf),
    Stderr,
}

/// Default filter for a `-v` count; `RUST_LOG` takes precedence over it
pub fn filter_for_verbosity(verbose: u8) -> String {
    match verbose {
        0 => "warn".to_string(),
        1 => "info".to_string(),
        // Targets are module paths, which start with the crate name
        2 => format!("info,{}=debug", env!("CARGO_CRATE_NAME")),
        _ => "trace".to_string(),
    }
}

pub fn default_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("chatbot-tui").join("chatbot.log"))
}

pub fn init(verbose: u8, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_for_verbosity(verbose)));

    let result = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
    };

    result.map_err(|e| anyhow!("failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(filter_for_verbosity(0), "warn");
        assert_eq!(filter_for_verbosity(1), "info");
        assert_eq!(filter_for_verbosity(9), "trace");
    }

    #[test]
    fn test_debug_directive_matches_own_targets() {
        let filter = filter_for_verbosity(2);
        let directive = filter
            .split(',')
            .find(|d| d.ends_with("=debug"))
            .expect("debug directive");
        let target_prefix = directive.trim_end_matches("=debug");

        // tracing uses module_path!() as the default event target
        let crate_segment = module_path!().split("::").next().unwrap();
        assert_eq!(target_prefix, crate_segment);
    }

    #[test]
    fn test_debug_directive_parses() {
        let filter = EnvFilter::try_new(filter_for_verbosity(2));
        assert!(filter.is_ok());
    }

    #[test]
    fn test_log_path_is_under_app_dir() {
        if let Ok(path) = default_log_path() {
            assert!(path.ends_with("chatbot-tui/chatbot.log"));
        }
    }
}
