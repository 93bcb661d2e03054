//! Persisted default flags.
//!
//! Defaults live in a flag-token file: one flag per line, `#` comments and
//! blank lines ignored. A global file in the platform config directory is
//! merged with a local `.linewiserc` override, and command-line flags win
//! over both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub ignore_case: bool,
    pub max_line_len: Option<usize>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: booleans accumulate, options prefer
    /// `other` when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            ignore_case: self.ignore_case || other.ignore_case,
            max_line_len: other.max_line_len.or(self.max_line_len),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("linewise").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("linewise")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("linewise").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("linewise")
                .join("config");
        }
    }

    PathBuf::from(".linewiserc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".linewiserc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# linewise defaults (saved with --save-defaults)".to_string());
    if flags.ignore_case {
        lines.push("--ignore-case".to_string());
    }
    if let Some(cap) = flags.max_line_len {
        lines.push(format!("--max-line-len {cap}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--ignore-case" || token == "-i" {
            flags.ignore_case = true;
        } else if token == "--max-line-len" {
            if let Some(next) = tokens.get(i + 1) {
                flags.max_line_len = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--max-line-len=") {
            flags.max_line_len = value.parse().ok();
        }
        i += 1;
    }
    flags
}
