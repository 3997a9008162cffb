use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dk", about = concat!("[>] dock v", env!("CARGO_PKG_VERSION"), " - your projects, pinned and in order"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different library file
    #[arg(long, global = true)]
    pub library: Option<String>,

    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List profiles in display order (default)
    List,
    /// Show profile details
    Show(ShowArgs),
    /// Add a profile
    Add(AddArgs),
    /// Edit profile fields
    Edit(EditArgs),
    /// Pin a profile above the normal group
    Pin(PinArgs),
    /// Move a pinned profile back into the normal group
    Unpin(UnpinArgs),
    /// Move a profile onto another one in its group
    Mv(MvArgs),
    /// Remove a profile
    Rm(RmArgs),
    /// Launch the agent in a profile's working directory
    Launch(LaunchArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// Profile ID (unique prefix accepted) or name
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Display name
    pub name: String,
    /// Working directory the agent starts in
    pub directory: String,
    /// Use a custom endpoint (exports model, base URL, and token)
    #[arg(long)]
    pub custom: bool,
    /// Model to export
    #[arg(long)]
    pub model: Option<String>,
    /// API base URL to export
    #[arg(long)]
    pub base_url: Option<String>,
    /// Auth token to export
    #[arg(long)]
    pub token: Option<String>,
    /// HTTP(S) proxy to export
    #[arg(long)]
    pub proxy: Option<String>,
    /// Skip the agent's permission prompts
    #[arg(long, conflicts_with = "safe")]
    pub dangerous: bool,
    /// Keep the agent's permission prompts
    #[arg(long)]
    pub safe: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Profile ID (unique prefix accepted) or name
    pub id: String,
    /// New display name
    #[arg(long)]
    pub name: Option<String>,
    /// New working directory
    #[arg(long)]
    pub directory: Option<String>,
    /// Switch to the standard agent install
    #[arg(long, conflicts_with = "custom")]
    pub standard: bool,
    /// Switch to a custom endpoint
    #[arg(long)]
    pub custom: bool,
    /// Model to export
    #[arg(long)]
    pub model: Option<String>,
    /// API base URL to export
    #[arg(long)]
    pub base_url: Option<String>,
    /// Auth token to export
    #[arg(long)]
    pub token: Option<String>,
    /// HTTP(S) proxy to export
    #[arg(long)]
    pub proxy: Option<String>,
    /// Skip the agent's permission prompts
    #[arg(long, conflicts_with = "safe")]
    pub dangerous: bool,
    /// Keep the agent's permission prompts
    #[arg(long)]
    pub safe: bool,
}

#[derive(Args)]
pub struct PinArgs {
    /// Profile ID (unique prefix accepted) or name
    pub id: String,
}

#[derive(Args)]
pub struct UnpinArgs {
    /// Profile ID (unique prefix accepted) or name
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Profile to move
    pub id: String,
    /// Profile whose position it takes
    pub target: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Profile ID (unique prefix accepted) or name
    pub id: String,
}

#[derive(Args)]
pub struct LaunchArgs {
    /// Profile ID (unique prefix accepted) or name
    pub id: String,
    /// Agent executable (overrides config.toml)
    #[arg(long)]
    pub agent: Option<String>,
}
