use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{ConfigError, EngineConfig};

const CONFIG_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";

/// Handles persistence and backups for [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `<base>/config/config.json` and `<base>/config/backups`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join("config.json"), backups_dir))
    }

    /// Uses the platform configuration directory.
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_base_dir(base.join("salesboard"))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Loads and validates the stored configuration, or returns the defaults when none exists.
    pub fn load(&self) -> Result<EngineConfig, ConfigError> {
        let config = if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?
        } else {
            EngineConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = to_json(config)?;
        let tmp = tmp_path(&self.config_path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }

    /// Writes a timestamped copy of `config` and returns the backup file name.
    pub fn backup(&self, config: &EngineConfig, note: Option<&str>) -> Result<String, ConfigError> {
        let mut name = format!(
            "config_{}",
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        if let Some(label) = slugify_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push('.');
        name.push_str(CONFIG_EXTENSION);
        write_file(&self.backups_dir.join(&name), &to_json(config)?)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<EngineConfig, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("configuration backup `{}` not found", backup_name),
            )));
        }
        let data = fs::read_to_string(&path)?;
        let config: EngineConfig =
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Lists backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CONFIG_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by_key(|name| Reverse(backup_timestamp(name)));
        Ok(entries)
    }
}

fn to_json(config: &EngineConfig) -> Result<String, ConfigError> {
    serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn slugify_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut slug = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_prefix("config_")?;
    let raw = stem.get(..13)?;
    NaiveDateTime::parse_from_str(raw, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_slug_collapses_separators() {
        assert_eq!(slugify_note(Some("  Before VAT change! ")), Some("before-vat-change".into()));
        assert_eq!(slugify_note(Some("***")), None);
        assert_eq!(slugify_note(None), None);
    }

    #[test]
    fn backup_names_parse_timestamps() {
        assert!(backup_timestamp("config_20250101_0930_note.json").is_some());
        assert!(backup_timestamp("other.json").is_none());
    }
}
