use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::io::gateway::{GatewayError, OrderGateway};
use crate::io::lock::FileLock;
use crate::model::profile::{
    LaunchConfig, LaunchMode, NormalOrderItem, PinnedOrderItem, Placement, Profile, unix_now,
};

const FORMAT_VERSION: u32 = 1;

/// Error type for library operations
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("profile not found: {0}")]
    NotFound(String),
    #[error("the default entry cannot be {0}")]
    DefaultProtected(&'static str),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// On-disk shape of library.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    profiles: Vec<Profile>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

impl LibraryFile {
    fn seeded() -> Self {
        LibraryFile {
            version: FORMAT_VERSION,
            profiles: vec![Profile::default_entry()],
        }
    }
}

/// Default library location: `$XDG_CONFIG_HOME/dock/library.json`,
/// falling back to `~/.config/dock/library.json`.
pub fn default_library_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("dock").join("library.json")
}

/// Field-by-field profile edit; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub working_directory: Option<String>,
    pub mode: Option<LaunchMode>,
    pub proxy: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub skip_permissions: Option<bool>,
}

/// File-backed profile library and persistence gateway.
///
/// All mutations are read-modify-write cycles on the whole file, taken
/// under an advisory lock and written atomically, so a half-applied
/// batch can never reach disk.
pub struct Library {
    path: PathBuf,
}

impl Library {
    /// Open a library, creating and seeding it with the default entry on
    /// first use.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let library = Library { path: path.into() };
        if !library.path.exists() {
            library.write(&LibraryFile::seeded())?;
        }
        Ok(library)
    }

    /// Open the library at the standard config-dir location.
    pub fn open_default() -> Result<Self, GatewayError> {
        Self::open(default_library_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All profiles, in file order (not display order).
    pub fn profiles(&self) -> Result<Vec<Profile>, GatewayError> {
        Ok(self.read()?.profiles)
    }

    pub fn get_profile(&self, id: &str) -> Result<Profile, LibraryError> {
        self.read()?
            .profiles
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    // ---- CRUD ----

    /// Create a normal profile at the end of the normal group.
    pub fn create_profile(
        &self,
        name: &str,
        working_directory: &str,
        config: LaunchConfig,
    ) -> Result<Profile, LibraryError> {
        self.with_lock(|file| {
            let next = next_normal_rank(file);
            let profile = Profile::new(
                name,
                working_directory,
                config,
                Placement::Normal { sort_order: next },
            );
            file.profiles.push(profile.clone());
            Ok(profile)
        })
    }

    pub fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<Profile, LibraryError> {
        self.with_lock(|file| {
            let profile = find_profile_mut(file, id)?;
            if let Some(name) = update.name {
                profile.name = name;
            }
            if let Some(dir) = update.working_directory {
                profile.working_directory = dir;
            }
            if let Some(mode) = update.mode {
                profile.config.mode = mode;
            }
            if let Some(proxy) = update.proxy {
                profile.config.proxy = proxy;
            }
            if let Some(model) = update.model {
                profile.config.model = model;
            }
            if let Some(base_url) = update.base_url {
                profile.config.base_url = base_url;
            }
            if let Some(token) = update.token {
                profile.config.token = token;
            }
            if let Some(skip) = update.skip_permissions {
                profile.config.skip_permissions = skip;
            }
            profile.touch();
            Ok(profile.clone())
        })
    }

    /// Pin or unpin a profile. Pinning stamps the current time so the
    /// profile surfaces at the top of the pinned group; unpinning appends
    /// it to the end of the normal group. Already being in the requested
    /// group keeps the existing rank.
    pub fn set_pinned(&self, id: &str, pinned: bool) -> Result<Profile, LibraryError> {
        self.with_lock(|file| {
            let next_normal = next_normal_rank(file);
            let profile = find_profile_mut(file, id)?;
            if profile.is_default() {
                let verb = if pinned { "pinned" } else { "unpinned" };
                return Err(LibraryError::DefaultProtected(verb));
            }
            profile.placement = match (pinned, profile.placement) {
                (true, Placement::Pinned { pinned_at }) => Placement::Pinned { pinned_at },
                (true, _) => Placement::Pinned {
                    pinned_at: unix_now(),
                },
                (false, Placement::Normal { sort_order }) => Placement::Normal { sort_order },
                (false, _) => Placement::Normal {
                    sort_order: next_normal,
                },
            };
            profile.touch();
            Ok(profile.clone())
        })
    }

    /// Delete a profile. Ranks of the remaining profiles are left as-is;
    /// the next reorder reindexes the group densely.
    pub fn remove_profile(&self, id: &str) -> Result<Profile, LibraryError> {
        self.with_lock(|file| {
            let idx = file
                .profiles
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
            if file.profiles[idx].is_default() {
                return Err(LibraryError::DefaultProtected("removed"));
            }
            Ok(file.profiles.remove(idx))
        })
    }

    pub fn touch_launched(&self, id: &str) -> Result<(), LibraryError> {
        self.with_lock(|file| {
            let profile = find_profile_mut(file, id)?;
            profile.last_launched_at = Some(unix_now());
            Ok(())
        })
    }

    // ---- file plumbing ----

    fn read(&self) -> Result<LibraryFile, GatewayError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(LibraryFile::seeded());
            }
            Err(e) => {
                return Err(GatewayError::ReadError {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        match serde_json::from_str(&text) {
            Ok(file) => Ok(file),
            Err(e) => {
                // Corrupted library: back it up and start over from the seed
                let backup = self.path.with_extension("json.bak");
                let _ = fs::copy(&self.path, &backup);
                warn!(
                    "profile library at {} is corrupted ({}); backed up to {}",
                    self.path.display(),
                    e,
                    backup.display()
                );
                Ok(LibraryFile::seeded())
            }
        }
    }

    fn write(&self, file: &LibraryFile) -> Result<(), GatewayError> {
        let dir = self.ensure_dir()?;
        let json = serde_json::to_string_pretty(file)?;
        atomic_write(&self.path, &dir, &json).map_err(|e| GatewayError::WriteError {
            path: self.path.clone(),
            source: e,
        })
    }

    fn ensure_dir(&self) -> Result<PathBuf, GatewayError> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&dir).map_err(|e| GatewayError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(dir)
    }

    /// Read-modify-write under the advisory lock. Nothing is written
    /// when `apply` fails.
    fn with_lock<T>(
        &self,
        apply: impl FnOnce(&mut LibraryFile) -> Result<T, LibraryError>,
    ) -> Result<T, LibraryError> {
        let dir = self.ensure_dir()?;
        let _lock = FileLock::acquire_default(&dir).map_err(GatewayError::from)?;
        let mut file = self.read()?;
        let result = apply(&mut file)?;
        self.write(&file)?;
        Ok(result)
    }
}

impl OrderGateway for Library {
    fn load_all(&mut self) -> Result<Vec<Profile>, GatewayError> {
        self.profiles()
    }

    fn save_normal_order(&mut self, items: &[NormalOrderItem]) -> Result<(), GatewayError> {
        let dir = self.ensure_dir()?;
        let _lock = FileLock::acquire_default(&dir)?;
        let mut file = self.read()?;
        for item in items {
            let profile = file
                .profiles
                .iter_mut()
                .find(|p| p.id == item.id)
                .ok_or_else(|| GatewayError::StaleOrder(item.id.clone()))?;
            match profile.placement {
                Placement::Normal { .. } => {
                    profile.placement = Placement::Normal {
                        sort_order: item.sort_order,
                    };
                }
                _ => return Err(GatewayError::StaleOrder(item.id.clone())),
            }
        }
        self.write(&file)
    }

    fn save_pinned_order(&mut self, items: &[PinnedOrderItem]) -> Result<(), GatewayError> {
        let dir = self.ensure_dir()?;
        let _lock = FileLock::acquire_default(&dir)?;
        let mut file = self.read()?;
        for item in items {
            let profile = file
                .profiles
                .iter_mut()
                .find(|p| p.id == item.id)
                .ok_or_else(|| GatewayError::StaleOrder(item.id.clone()))?;
            match profile.placement {
                Placement::Pinned { .. } => {
                    profile.placement = Placement::Pinned {
                        pinned_at: item.pinned_at,
                    };
                }
                _ => return Err(GatewayError::StaleOrder(item.id.clone())),
            }
        }
        self.write(&file)
    }
}

/// Rank one past the highest normal rank in use. Ranks may have gaps
/// after removals, so counting profiles is not enough.
fn next_normal_rank(file: &LibraryFile) -> u32 {
    file.profiles
        .iter()
        .filter_map(|p| match p.placement {
            Placement::Normal { sort_order } => Some(sort_order.saturating_add(1)),
            _ => None,
        })
        .max()
        .unwrap_or(0)
}

fn find_profile_mut<'a>(
    file: &'a mut LibraryFile,
    id: &str,
) -> Result<&'a mut Profile, LibraryError> {
    file.profiles
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| LibraryError::NotFound(id.to_string()))
}

/// Write content to `path` atomically: a temp file in the same directory
/// renamed over the target, so readers never observe a partial file.
fn atomic_write(path: &Path, dir: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
