use std::path::Path;
use std::process::{Command, ExitStatus};

use crate::model::profile::{LaunchConfig, LaunchMode, Profile};

/// Error type for launch operations
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("working directory does not exist: {0}")]
    MissingDirectory(String),
    #[error("could not start '{agent}': {source}")]
    Spawn {
        agent: String,
        source: std::io::Error,
    },
}

/// Environment variables exported to the agent process for a profile.
///
/// Standard mode exports only the proxy pair; custom mode exports the
/// alternate endpoint settings instead. Empty fields are omitted so the
/// agent falls back to its own configuration.
pub fn environment_for(config: &LaunchConfig) -> Vec<(String, String)> {
    let mut env = Vec::new();
    match config.mode {
        LaunchMode::Standard => {
            if !config.proxy.is_empty() {
                env.push(("HTTP_PROXY".to_string(), config.proxy.clone()));
                env.push(("HTTPS_PROXY".to_string(), config.proxy.clone()));
            }
        }
        LaunchMode::Custom => {
            if !config.model.is_empty() {
                env.push(("ANTHROPIC_MODEL".to_string(), config.model.clone()));
            }
            if !config.base_url.is_empty() {
                env.push(("ANTHROPIC_BASE_URL".to_string(), config.base_url.clone()));
            }
            if !config.token.is_empty() {
                env.push(("ANTHROPIC_AUTH_TOKEN".to_string(), config.token.clone()));
            }
        }
    }
    env
}

/// Run the agent in the profile's working directory and wait for it to
/// exit. Stdio is inherited, so the session takes over the terminal.
pub fn launch(profile: &Profile, agent: &str) -> Result<ExitStatus, LaunchError> {
    let dir = Path::new(&profile.working_directory);
    if !dir.is_dir() {
        return Err(LaunchError::MissingDirectory(
            profile.working_directory.clone(),
        ));
    }

    let mut cmd = Command::new(agent);
    cmd.current_dir(dir);
    for (key, value) in environment_for(&profile.config) {
        cmd.env(key, value);
    }
    if profile.config.skip_permissions {
        cmd.arg("--dangerously-skip-permissions");
    }

    cmd.status().map_err(|e| LaunchError::Spawn {
        agent: agent.to_string(),
        source: e,
    })
}
