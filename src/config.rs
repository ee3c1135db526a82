//! Runtime configuration (ambient, §6): strict-mode toggle, PRNG seed, and
//! the save-file path. Built from an optional `zilrun.toml` file, then
//! overridden by whatever flags the driver parsed from argv.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Default)]
struct FileConfig {
    strict: Option<bool>,
    seed: Option<u64>,
    save_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub strict: bool,
    pub seed: Option<u64>,
    pub save_path: PathBuf,
    pub json_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strict: false,
            seed: None,
            save_path: PathBuf::from("zilrun.save.json"),
            json_mode: false,
        }
    }
}

impl Config {
    /// Reads `zilrun.toml` from the current directory if present; a missing
    /// file is not an error, a malformed one is.
    pub fn load() -> Result<Config, String> {
        let mut cfg = Config::default();
        let path = PathBuf::from("zilrun.toml");
        if !path.exists() {
            return Ok(cfg);
        }
        let text = std::fs::read_to_string(&path).map_err(|e| format!("config-read-error: {e}"))?;
        let file: FileConfig = toml::from_str(&text).map_err(|e| format!("config-parse-error: {e}"))?;
        if let Some(s) = file.strict {
            cfg.strict = s;
        }
        if let Some(seed) = file.seed {
            cfg.seed = Some(seed);
        }
        if let Some(path) = file.save_path {
            cfg.save_path = PathBuf::from(path);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_strict_with_no_seed() {
        let cfg = Config::default();
        assert!(!cfg.strict);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn file_config_parses_expected_fields() {
        let file: FileConfig = toml::from_str("strict = true\nseed = 7\n").unwrap();
        assert_eq!(file.strict, Some(true));
        assert_eq!(file.seed, Some(7));
    }
}
