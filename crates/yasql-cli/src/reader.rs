use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

/// Extensions picked up when scanning a directory for YASQL documents.
const YASQL_EXTENSIONS: &[&str] = &["yml", "yaml", "yasql"];

/// A file with its path and content.
pub struct YasqlFile {
    pub path: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Build configuration (config/databases.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// One `databases` entry: a path (or glob), optionally with post SQL files.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DatabaseEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        post: Option<OneOrMany>,
    },
}

impl DatabaseEntry {
    pub fn path(&self) -> &str {
        match self {
            DatabaseEntry::Path(p) => p,
            DatabaseEntry::Detailed { path, .. } => path,
        }
    }

    pub fn post(&self) -> Vec<String> {
        match self {
            DatabaseEntry::Detailed {
                post: Some(post), ..
            } => post.clone().into_vec(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BuildConfig {
    /// Any scalar; only integers are honored.
    #[serde(default)]
    pub indentation: Option<Value>,
    #[serde(default)]
    pub databases: Option<Vec<DatabaseEntry>>,
    /// Vendor name → config path(s). Kept as a mapping to preserve order.
    #[serde(default)]
    pub vendors: Option<serde_yaml::Mapping>,
}

/// A vendor package and the config files to build inside it.
/// `None` stands for the vendor's default config.
pub struct VendorEntry {
    pub name: String,
    pub configs: Vec<Option<String>>,
}

impl BuildConfig {
    pub fn indent(&self) -> Option<i64> {
        self.indentation.as_ref().and_then(Value::as_i64)
    }

    pub fn vendor_entries(&self) -> Result<Vec<VendorEntry>, String> {
        let Some(ref vendors) = self.vendors else {
            return Ok(Vec::new());
        };

        vendors
            .iter()
            .map(|(key, value)| {
                let name = key
                    .as_str()
                    .ok_or_else(|| format!("Invalid vendor name: {key:?}"))?
                    .to_string();
                let configs: Option<OneOrMany> = serde_yaml::from_value(value.clone())
                    .map_err(|e| format!("Invalid configs for vendor '{name}': {e}"))?;
                let configs = match configs {
                    None => vec![None],
                    Some(c) => c.into_vec().into_iter().map(Some).collect(),
                };
                Ok(VendorEntry { name, configs })
            })
            .collect()
    }
}

/// Read and decode a build configuration file.
pub fn read_build_config(config_path: &Path) -> Result<BuildConfig, String> {
    let yaml_content = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config {}: {}", config_path.display(), e))?;

    let config: Option<BuildConfig> = serde_yaml::from_str(&yaml_content)
        .map_err(|e| format!("Invalid YAML config {}: {}", config_path.display(), e))?;

    Ok(config.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// YASQL documents
// ---------------------------------------------------------------------------

pub fn read_yasql_file(path: &Path) -> Result<YasqlFile, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    Ok(YasqlFile {
        path: path.to_string_lossy().to_string(),
        content,
    })
}

/// Read YASQL files from a path (file or directory).
pub fn read_yasql_files(input_path: &Path) -> Result<Vec<YasqlFile>, String> {
    if !input_path.exists() {
        return Err(format!("Path does not exist: {}", input_path.display()));
    }

    if input_path.is_file() {
        return Ok(vec![read_yasql_file(input_path)?]);
    }

    if input_path.is_dir() {
        return scan_directory(input_path)?
            .iter()
            .map(|p| read_yasql_file(p))
            .collect();
    }

    Err(format!(
        "Path is neither a file nor a directory: {}",
        input_path.display()
    ))
}

fn scan_directory(dir_path: &Path) -> Result<Vec<PathBuf>, String> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for ext in YASQL_EXTENSIONS {
        let pattern = dir_path.join(format!("**/*.{ext}"));
        paths.extend(expand_glob(&pattern.to_string_lossy())?);
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Expand a glob pattern into the matching paths, sorted.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, String> {
    let pattern = pattern.replace('\\', "/");
    let entries =
        glob::glob(&pattern).map_err(|e| format!("Invalid glob pattern '{pattern}': {e}"))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => return Err(format!("Glob error: {}", e)),
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn is_glob_pattern(path: &str) -> bool {
    path.contains(['*', '?', '['])
}
