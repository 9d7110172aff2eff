use anyhow::{Context, Result};
use itemdex_core::RegistryKey;
use itemdex_registry::{entries_from_file, PackPlugin};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

/// Default directory containing content packs.
pub const CONTENT_PACKS_DIR: &str = "content_packs";

/// Content pack manifest file name.
pub const CONTENT_PACK_MANIFEST_FILE: &str = "pack.json";

/// Entry list file name inside a pack.
pub const CONTENT_PACK_ENTRIES_FILE: &str = "entries.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentPackManifest {
    /// Human-friendly pack name (defaults to the directory name).
    pub name: Option<String>,
    /// If false, the pack is ignored.
    pub enabled: bool,
    /// Deterministic pack load ordering (lower loads earlier).
    pub priority: i32,
    /// Insert this pack's entries after the last entry with this id, of any
    /// kind or tag, instead of appending them.
    pub after: Option<String>,
}

impl Default for ContentPackManifest {
    fn default() -> Self {
        Self {
            name: None,
            enabled: true,
            priority: 0,
            after: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveredContentPack {
    pub id: String,
    pub dir: PathBuf,
    pub manifest: ContentPackManifest,
}

impl DiscoveredContentPack {
    /// Load the pack's entries and wrap them in a plugin.
    ///
    /// A pack without an entries file contributes nothing.
    pub fn to_plugin(&self) -> Result<PackPlugin> {
        let entries_path = self.dir.join(CONTENT_PACK_ENTRIES_FILE);
        let entries = if entries_path.exists() {
            entries_from_file(&entries_path)
                .with_context(|| format!("Failed to load {}", entries_path.display()))?
        } else {
            Vec::new()
        };

        let mut plugin = PackPlugin::new(self.id.clone(), entries).with_priority(self.manifest.priority);
        if let Some(after) = &self.manifest.after {
            let key = RegistryKey::parse(after)
                .with_context(|| format!("Invalid `after` anchor in pack {}", self.id))?;
            plugin = plugin.with_anchor(key);
        }
        Ok(plugin)
    }
}

fn load_manifest_strict(pack_dir: &Path, pack_id: &str) -> Result<ContentPackManifest> {
    let manifest_path = pack_dir.join(CONTENT_PACK_MANIFEST_FILE);
    let mut manifest = if !manifest_path.exists() {
        ContentPackManifest::default()
    } else {
        let contents = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?
    };

    if manifest.name.as_deref().unwrap_or("").is_empty() {
        manifest.name = Some(pack_id.to_string());
    }

    Ok(manifest)
}

/// Discover content pack directories under the given root.
///
/// Pack discovery is deterministic: directories are returned in sorted order.
pub fn discover_pack_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {}", root.display())),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry in {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Discover content packs under the given root, applying manifest ordering and enablement.
///
/// Packs with unreadable or invalid manifests are skipped with a warning.
pub fn discover_packs_lenient(root: &Path) -> Vec<DiscoveredContentPack> {
    let pack_dirs = match discover_pack_dirs(root) {
        Ok(pack_dirs) => pack_dirs,
        Err(err) => {
            warn!(
                "Failed to scan content packs dir {}: {err:#}",
                root.display()
            );
            return Vec::new();
        }
    };

    let mut packs = Vec::with_capacity(pack_dirs.len());
    for pack_dir in pack_dirs {
        let id = pack_dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| pack_dir.display().to_string());
        let manifest = match load_manifest_strict(&pack_dir, &id) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(
                    "Skipping content pack {} due to invalid manifest: {err:#}",
                    pack_dir.display()
                );
                continue;
            }
        };
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredContentPack {
            id,
            dir: pack_dir,
            manifest,
        });
    }

    packs.sort_by(|a, b| {
        a.manifest
            .priority
            .cmp(&b.manifest.priority)
            .then_with(|| a.id.cmp(&b.id))
    });
    packs
}

/// Discover packs and turn each into a plugin, skipping packs whose entries
/// fail to load.
pub fn load_pack_plugins(root: &Path) -> Vec<PackPlugin> {
    discover_packs_lenient(root)
        .into_iter()
        .filter_map(|pack| match pack.to_plugin() {
            Ok(plugin) => Some(plugin),
            Err(err) => {
                warn!("Skipping content pack {}: {err:#}", pack.dir.display());
                None
            }
        })
        .collect()
}
