use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Current time as whole epoch-seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Where a profile sits in the dock's display order.
///
/// Each variant carries only the rank field that is meaningful for it, so
/// a pinned profile has no `sort_order` to misread and a normal profile no
/// `pinned_at`. The default entry carries no rank at all; it is anchored
/// at position 0 and never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// The single non-removable entry anchored at the top.
    Default,
    /// Shown above normal profiles; a larger stamp sorts earlier.
    Pinned { pinned_at: u64 },
    /// Ordered by explicit index; a smaller index sorts earlier.
    Normal { sort_order: u32 },
}

impl Placement {
    pub fn group(&self) -> Group {
        match self {
            Placement::Default => Group::Default,
            Placement::Pinned { .. } => Group::Pinned,
            Placement::Normal { .. } => Group::Normal,
        }
    }
}

/// The three display groups, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Default,
    Pinned,
    Normal,
}

impl Group {
    /// The reorderable groups; the default entry is not one.
    pub fn order_group(&self) -> Option<OrderGroup> {
        match self {
            Group::Default => None,
            Group::Pinned => Some(OrderGroup::Pinned),
            Group::Normal => Some(OrderGroup::Normal),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Default => write!(f, "default"),
            Group::Pinned => write!(f, "pinned"),
            Group::Normal => write!(f, "normal"),
        }
    }
}

/// A group that can be the subject of a reorder: pinned or normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderGroup {
    Pinned,
    Normal,
}

impl fmt::Display for OrderGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderGroup::Pinned => write!(f, "pinned"),
            OrderGroup::Normal => write!(f, "normal"),
        }
    }
}

// ---------------------------------------------------------------------------
// Launch configuration
// ---------------------------------------------------------------------------

/// How the agent is invoked for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Stock agent install; only proxy settings are exported.
    #[default]
    Standard,
    /// Alternate endpoint: model, base URL, and token are exported too.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default)]
    pub mode: LaunchMode,
    #[serde(default)]
    pub proxy: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_true")]
    pub skip_permissions: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        LaunchConfig {
            mode: LaunchMode::Standard,
            proxy: String::new(),
            model: String::new(),
            base_url: String::new(),
            token: String::new(),
            skip_permissions: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// One launchable project profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub working_directory: String,
    #[serde(default)]
    pub config: LaunchConfig,
    pub placement: Placement,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_launched_at: Option<u64>,
}

impl Profile {
    /// A fresh profile with a random id and current timestamps.
    pub fn new(name: &str, working_directory: &str, config: LaunchConfig, placement: Placement) -> Self {
        let now = unix_now();
        Profile {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            working_directory: working_directory.to_string(),
            config,
            placement,
            created_at: now,
            updated_at: now,
            last_launched_at: None,
        }
    }

    /// The seeded top entry pointing at the user's home directory.
    pub fn default_entry() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
        Profile::new("Home", &home, LaunchConfig::default(), Placement::Default)
    }

    pub fn group(&self) -> Group {
        self.placement.group()
    }

    pub fn is_default(&self) -> bool {
        matches!(self.placement, Placement::Default)
    }

    /// Bump the informational modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = unix_now();
    }
}

// ---------------------------------------------------------------------------
// Order batches
// ---------------------------------------------------------------------------

/// One entry of a batched normal-group save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalOrderItem {
    pub id: String,
    pub sort_order: u32,
}

/// One entry of a batched pinned-group save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedOrderItem {
    pub id: String,
    pub pinned_at: u64,
}

/// A full-group rank rewrite, ready to persist. Every profile in the
/// group is present, not just the one the user moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBatch {
    Normal(Vec<NormalOrderItem>),
    Pinned(Vec<PinnedOrderItem>),
}

impl OrderBatch {
    pub fn group(&self) -> OrderGroup {
        match self {
            OrderBatch::Normal(_) => OrderGroup::Normal,
            OrderBatch::Pinned(_) => OrderGroup::Pinned,
        }
    }
}
