use pakdump_core::config::ImportConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const STALE_SUFFIXES: &[&str] = &["_old", "_bak"];

/// Exclusion rules applied to every scanned file.
#[derive(Debug, Clone)]
pub struct ScanRules {
    extension: String,
    excluded_prefixes: Vec<String>,
    stale_markers: Vec<String>,
}

impl ScanRules {
    pub fn new(extension: impl Into<String>, config: &ImportConfig) -> Self {
        Self {
            extension: extension.into(),
            excluded_prefixes: config.excluded_prefixes.clone(),
            stale_markers: config
                .stale_markers
                .iter()
                .map(|marker| marker.to_lowercase())
                .collect(),
        }
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    fn is_stale_component(&self, component: &str) -> bool {
        let lowered = component.to_lowercase();
        self.stale_markers.iter().any(|marker| *marker == lowered)
            || STALE_SUFFIXES.iter().any(|suffix| lowered.ends_with(suffix))
    }

    /// Meshes, placeholders and thumbnails by file prefix; anything under a
    /// stale directory (`Old/`, `Backup/`, `Foo_bak/`, ...) relative to `base`.
    pub fn is_excluded(&self, base: &Path, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            return true;
        };
        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
        {
            return true;
        }

        let relative = path.strip_prefix(base).unwrap_or(path);
        let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or(file_name);
        relative
            .parent()
            .into_iter()
            .flat_map(|parent| parent.components())
            .filter_map(|component| component.as_os_str().to_str())
            .chain(std::iter::once(stem))
            .any(|component| self.is_stale_component(component))
    }

    fn accepts(&self, base: &Path, path: &Path) -> bool {
        path.is_file() && self.has_extension(path) && !self.is_excluded(base, path)
    }

    /// Files directly in `dir` whose name matches `pattern` (`IT_*`, `BP_Ammo_*.json`).
    pub fn scan_dir(&self, dir: &Path, pattern: &str) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| matches_pattern(name, pattern))
                .unwrap_or(false);
            if matches && self.accepts(dir, &path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Files in `dir`, and below it when `recursive`, in sorted path order.
    pub fn scan_tree(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];
        while let Some(current) = pending.pop() {
            for entry in fs::read_dir(&current)? {
                let path = entry?.path();
                if path.is_dir() {
                    if recursive {
                        pending.push(path);
                    }
                } else if self.accepts(dir, &path) {
                    files.push(path);
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Single-`*` glob. A pattern without an extension matches any extension.
pub fn matches_pattern(file_name: &str, pattern: &str) -> bool {
    let pattern = pattern.trim_end_matches(".*");
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            file_name.len() >= prefix.len() + suffix.len()
                && file_name.starts_with(prefix)
                && file_name.ends_with(suffix)
        }
        None => {
            file_name == pattern
                || Path::new(file_name).file_stem().and_then(|stem| stem.to_str()) == Some(pattern)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "[]").unwrap();
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("IT_Bullet.json", "IT_*"));
        assert!(matches_pattern("IT_Bullet.json", "IT_*.json"));
        assert!(!matches_pattern("BT_9mm.json", "IT_*"));
        assert!(!matches_pattern("IT_Bullet.txt", "IT_*.json"));
        assert!(matches_pattern("BP_Ammo_9mm.json", "BP_Ammo_9mm"));
    }

    #[test]
    fn test_exclusion_rules() {
        let rules = ScanRules::new("json", &ImportConfig::default());
        let base = Path::new("/dump/Items");
        assert!(rules.is_excluded(base, Path::new("/dump/Items/Ammo/SM_Ammo_Box.json")));
        assert!(rules.is_excluded(base, Path::new("/dump/Items/Ammo/Thumbnail_9mm.json")));
        assert!(rules.is_excluded(base, Path::new("/dump/Items/Ammo/Old/BP_Ammo_Stale.json")));
        assert!(rules.is_excluded(base, Path::new("/dump/Items/Weapons_bak/BP_Firearm_A.json")));
        assert!(rules.is_excluded(base, Path::new("/dump/Items/Ammo/BP_Ammo_9mm_old.json")));
        assert!(!rules.is_excluded(base, Path::new("/dump/Items/Ammo/BP_Ammo_9mm.json")));
        // Stale markers above the scan base do not count.
        assert!(!rules.is_excluded(Path::new("/old/Items"), Path::new("/old/Items/BP_Rock.json")));
    }

    #[test]
    fn test_scan_tree_recursion_and_order() {
        let dir = tempdir().unwrap();
        let items = dir.path().join("Items");
        touch(&items.join("BP_Root.json"));
        touch(&items.join("Weapons/Melee/BP_Melee_Knife.json"));
        touch(&items.join("Ammo/BP_Ammo_9mm.json"));
        touch(&items.join("Ammo/SM_Ammo_Box.json"));
        touch(&items.join("Ammo/Backup/BP_Ammo_9mm.json"));
        touch(&items.join("Ammo/readme.txt"));

        let rules = ScanRules::new("json", &ImportConfig::default());
        let flat = rules.scan_tree(&items, false).unwrap();
        assert_eq!(flat, vec![items.join("BP_Root.json")]);

        let deep = rules.scan_tree(&items, true).unwrap();
        assert_eq!(
            deep,
            vec![
                items.join("Ammo/BP_Ammo_9mm.json"),
                items.join("BP_Root.json"),
                items.join("Weapons/Melee/BP_Melee_Knife.json"),
            ]
        );
    }

    #[test]
    fn test_scan_dir_applies_pattern() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("IT_Bullet.json"));
        touch(&dir.path().join("IT_Firearm.json"));
        touch(&dir.path().join("BT_9mm.json"));

        let rules = ScanRules::new("json", &ImportConfig::default());
        let files = rules.scan_dir(dir.path(), "IT_*").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("IT_Bullet.json"));
        assert!(rules.scan_dir(&dir.path().join("missing"), "IT_*").is_err());
    }
}
