use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use tracing::{debug, error, info, warn};

use crate::reader::{expand_glob, is_glob_pattern, read_build_config, DatabaseEntry};

/// Config used for vendors listed without an explicit config path.
pub const DEFAULT_CONFIG: &str = "config/databases.yml";

/// Generates every database listed in a build config into an output directory.
pub struct Builder {
    output: PathBuf,
    vendors: PathBuf,
    log: Vec<String>,
}

impl Builder {
    pub fn new(output: &Path, vendors: &Path) -> Result<Self, String> {
        fs::create_dir_all(output).map_err(|e| {
            format!(
                "Can not create output directory {}: {e}",
                output.display()
            )
        })?;
        let output = output
            .canonicalize()
            .map_err(|e| format!("Can not resolve {}: {e}", output.display()))?;
        let vendors = vendors
            .canonicalize()
            .unwrap_or_else(|_| vendors.to_path_buf());

        let log = vec![
            format!(
                "Build start: {}",
                Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
            ),
            format!("Output: {}", output.display()),
            String::new(),
        ];

        Ok(Self {
            output,
            vendors,
            log,
        })
    }

    /// Build the databases of `config` (relative to `root`), then recurse into
    /// its vendors.
    pub fn build(&mut self, config: &Path, root: &Path) -> Result<(), String> {
        let config_path = root.join(config);
        self.log
            .push(format!("Load config file {}", config_path.display()));
        info!(config = %config_path.display(), "loading build config");

        let config = read_build_config(&config_path)?;
        let indent = config.indent();

        let databases = config.databases.as_deref().unwrap_or_default();
        if !databases.is_empty() {
            let mut generated = Vec::new();
            for entry in databases {
                for file in self.resolve_database(entry, root)? {
                    generated.push(self.generate(&file, entry, root, indent)?);
                }
            }
            self.log.push("Files generated:".to_string());
            self.log
                .extend(generated.iter().map(|name| format!("- {name}")));
        }

        for vendor in config.vendor_entries()? {
            self.log.push(String::new());
            self.log.push(format!("Switch to vendor {}", vendor.name));
            self.log.push(String::new());

            let vendor_root = self.vendors.join(&vendor.name);
            for vendor_config in vendor.configs {
                let vendor_config = vendor_config.as_deref().unwrap_or(DEFAULT_CONFIG);
                self.build(Path::new(vendor_config), &vendor_root)?;
            }
        }

        Ok(())
    }

    pub fn log(&self) -> String {
        self.log.join("\n")
    }

    /// Files named by a `databases` entry. Missing files are logged, not fatal.
    fn resolve_database(&mut self, entry: &DatabaseEntry, root: &Path) -> Result<Vec<PathBuf>, String> {
        let path = root.join(entry.path());

        let files = if is_glob_pattern(entry.path()) {
            expand_glob(&path.to_string_lossy())?
                .into_iter()
                .filter(|p| p.is_file())
                .collect()
        } else if path.is_file() {
            vec![path.clone()]
        } else {
            Vec::new()
        };

        if files.is_empty() {
            error!(database = %path.display(), "database not found");
            self.log
                .push(format!("E: Database \"{}\" not found", path.display()));
        }

        Ok(files)
    }

    /// Generate one database (plus its post files) and return the output file name.
    fn generate(
        &mut self,
        file: &Path,
        entry: &DatabaseEntry,
        root: &Path,
        indent: Option<i64>,
    ) -> Result<String, String> {
        let content = fs::read_to_string(file)
            .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
        let mut sql = yasql_core::build(&content, indent)
            .map_err(|e| format!("{}: {e}", file.display()))?;

        for post in entry.post() {
            let post_path = root.join(&post);
            match fs::read_to_string(&post_path) {
                Ok(post_sql) => {
                    let name = post_path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or(post);
                    sql.push_str(&format!("\n--\n-- Post '{name}'\n--\n\n{post_sql}"));
                }
                Err(_) => {
                    warn!(post = %post_path.display(), "post file not found");
                    self.log
                        .push(format!("W: Post file \"{}\" not found", post_path.display()));
                }
            }
        }

        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| format!("Invalid database file name: {}", file.display()))?;
        let outfile = format!("{stem}.sql");
        let out_path = self.output.join(&outfile);
        fs::write(&out_path, sql)
            .map_err(|e| format!("Failed to write {}: {e}", out_path.display()))?;
        debug!(database = %file.display(), output = %out_path.display(), "generated");

        Ok(outfile)
    }
}

pub fn run_build(config: &Path, output: &Path, vendors: &Path) -> Result<String, String> {
    let mut builder = Builder::new(output, vendors)?;
    builder.build(config, Path::new("."))?;
    Ok(builder.log())
}
