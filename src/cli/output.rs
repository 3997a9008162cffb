use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::profile::{LaunchMode, Placement, Profile};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

/// One profile as emitted by `--json`. The auth token is never included.
#[derive(Serialize)]
pub struct ProfileJson {
    pub id: String,
    pub name: String,
    pub working_directory: String,
    pub position: usize,
    pub group: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_at: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<u32>,
    pub mode: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proxy: String,
    pub skip_permissions: bool,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_launched_at: Option<u64>,
}

pub fn profile_to_json(profile: &Profile, position: usize) -> ProfileJson {
    let (pinned_at, sort_order) = match profile.placement {
        Placement::Default => (None, None),
        Placement::Pinned { pinned_at } => (Some(pinned_at), None),
        Placement::Normal { sort_order } => (None, Some(sort_order)),
    };
    ProfileJson {
        id: profile.id.clone(),
        name: profile.name.clone(),
        working_directory: profile.working_directory.clone(),
        position,
        group: profile.group().to_string(),
        pinned_at,
        sort_order,
        mode: mode_label(profile.config.mode).to_string(),
        model: profile.config.model.clone(),
        base_url: profile.config.base_url.clone(),
        proxy: profile.config.proxy.clone(),
        skip_permissions: profile.config.skip_permissions,
        created_at: profile.created_at,
        updated_at: profile.updated_at,
        last_launched_at: profile.last_launched_at,
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

pub fn mode_label(mode: LaunchMode) -> &'static str {
    match mode {
        LaunchMode::Standard => "standard",
        LaunchMode::Custom => "custom",
    }
}

/// Group marker shown in listings: `~` default, `*` pinned.
pub fn placement_marker(placement: &Placement) -> char {
    match placement {
        Placement::Default => '~',
        Placement::Pinned { .. } => '*',
        Placement::Normal { .. } => ' ',
    }
}

/// First eight characters of an id, enough to paste back as a prefix.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Format the profile listing with aligned columns.
pub fn format_profile_listing(profiles: &[Profile]) -> Vec<String> {
    let name_w = profiles
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0)
        .max(4);
    let dir_w = profiles
        .iter()
        .map(|p| abbreviate_path(&p.working_directory).len())
        .max()
        .unwrap_or(0)
        .max(3);

    let mut lines = Vec::new();
    for (position, profile) in profiles.iter().enumerate() {
        let launched = match profile.last_launched_at {
            Some(secs) => timestamp_to_relative(secs),
            None => "never".to_string(),
        };
        lines.push(format!(
            "{:>2} {} {:<name_w$}  {:<8}  {:<dir_w$}  {}",
            position,
            placement_marker(&profile.placement),
            profile.name,
            short_id(&profile.id),
            abbreviate_path(&profile.working_directory),
            launched,
        ));
    }
    lines
}

/// Multi-line detail block for a single profile.
pub fn format_profile_detail(profile: &Profile, position: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {} ({})",
        placement_marker(&profile.placement),
        profile.name,
        profile.id
    ));
    lines.push(format!(
        "  dir:       {}",
        abbreviate_path(&profile.working_directory)
    ));
    lines.push(format!("  position:  {}", position));
    match profile.placement {
        Placement::Default => lines.push("  group:     default".to_string()),
        Placement::Pinned { pinned_at } => {
            lines.push(format!("  group:     pinned (stamp {})", pinned_at));
        }
        Placement::Normal { sort_order } => {
            lines.push(format!("  group:     normal (index {})", sort_order));
        }
    }
    lines.push(format!("  mode:      {}", mode_label(profile.config.mode)));
    if !profile.config.proxy.is_empty() {
        lines.push(format!("  proxy:     {}", profile.config.proxy));
    }
    if profile.config.mode == LaunchMode::Custom {
        if !profile.config.model.is_empty() {
            lines.push(format!("  model:     {}", profile.config.model));
        }
        if !profile.config.base_url.is_empty() {
            lines.push(format!("  base url:  {}", profile.config.base_url));
        }
        let token = if profile.config.token.is_empty() {
            "unset"
        } else {
            "set"
        };
        lines.push(format!("  token:     {}", token));
    }
    let perms = if profile.config.skip_permissions {
        "skipped"
    } else {
        "prompted"
    };
    lines.push(format!("  perms:     {}", perms));
    lines.push(format!(
        "  created:   {}",
        timestamp_to_relative(profile.created_at)
    ));
    if let Some(launched) = profile.last_launched_at {
        lines.push(format!("  launched:  {}", timestamp_to_relative(launched)));
    }
    lines
}

/// Abbreviate a path by replacing $HOME with ~
pub fn abbreviate_path(path: &str) -> String {
    if let Ok(home) = std::env::var("HOME") {
        if let Some(rest) = path.strip_prefix(&home) {
            return format!("~{}", rest);
        }
    }
    path.to_string()
}

fn timestamp_to_relative(secs: u64) -> String {
    match DateTime::from_timestamp(secs as i64, 0) {
        Some(dt) => relative_time(&dt),
        None => "unknown".to_string(),
    }
}

/// Format a relative time string like "2 min ago", "yesterday", "3 days ago"
pub fn relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    let secs = duration.num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = duration.num_minutes();
    if mins < 60 {
        return format!("{} min ago", mins);
    }
    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{} hr ago", hours);
    }
    let days = duration.num_days();
    if days == 1 {
        return "yesterday".to_string();
    }
    if days < 7 {
        return format!("{} days ago", days);
    }
    let weeks = days / 7;
    if weeks < 5 {
        return format!("{} weeks ago", weeks);
    }
    format!("{} months ago", days / 30)
}
