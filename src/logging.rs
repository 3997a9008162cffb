use flexi_logger::{Logger, LoggerHandle};

/// Start stderr logging for the process and hand back the logger handle,
/// which must stay alive for the duration of the program.
///
/// The default filter keeps only warnings and errors so command output
/// stays clean; `verbose` widens it to debug. `RUST_LOG` overrides both.
/// A logger that fails to start is reported and the program runs without
/// one.
pub fn init(verbose: bool) -> Option<LoggerHandle> {
    let spec = if verbose { "debug" } else { "warn" };
    match Logger::try_with_env_or_str(spec).and_then(|logger| logger.start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: logging unavailable: {}", e);
            None
        }
    }
}
