use log::{LevelFilter, warn};
use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "COURTSIDE_DATA_DIR";
pub const LOG_LEVEL_VAR: &str = "COURTSIDE_LOG_LEVEL";
pub const BEST_OF_VAR: &str = "COURTSIDE_BEST_OF";

const DEFAULT_BEST_OF: u32 = 3;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub data_dir: PathBuf,
    /// Format for newly started matches: 3 or 5.
    pub best_of: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            data_dir: PathBuf::from("courtside-data"),
            best_of: DEFAULT_BEST_OF,
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Settings from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_level = get(LOG_LEVEL_VAR).and_then(|raw| match raw.trim().parse::<LevelFilter>() {
            Ok(level) => Some(level),
            Err(_) => {
                warn!("ignoring {LOG_LEVEL_VAR}={raw}: not a log level");
                None
            }
        });

        let best_of = match get(BEST_OF_VAR).map(|raw| raw.trim().to_string()).as_deref() {
            None => DEFAULT_BEST_OF,
            Some("3") => 3,
            Some("5") => 5,
            Some(other) => {
                warn!("ignoring {BEST_OF_VAR}={other}: only 3 or 5 are supported");
                DEFAULT_BEST_OF
            }
        };

        let data_dir = if let Some(dir) = get(DATA_DIR_VAR) {
            PathBuf::from(dir)
        } else if let Some(config_dir) = get("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir).join("courtside")
        } else if let Some(home) = get("HOME") {
            PathBuf::from(home).join(".config").join("courtside")
        } else {
            PathBuf::from("courtside-data")
        };

        Self { full_screen: false, log_level, data_dir, best_of }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.data_dir, PathBuf::from("courtside-data"));
        assert_eq!(s.log_level, None);
        assert_eq!(s.best_of, 3);
        assert!(!s.full_screen);
    }

    #[test]
    fn test_data_dir_precedence() {
        let s = settings(&[("HOME", "/home/ump"), ("XDG_CONFIG_HOME", "/xdg")]);
        assert_eq!(s.data_dir, PathBuf::from("/xdg/courtside"));

        let s = settings(&[("HOME", "/home/ump"), ("XDG_CONFIG_HOME", "  ")]);
        assert_eq!(s.data_dir, PathBuf::from("/home/ump/.config/courtside"));

        let s = settings(&[(DATA_DIR_VAR, "/srv/club"), ("XDG_CONFIG_HOME", "/xdg")]);
        assert_eq!(s.data_dir, PathBuf::from("/srv/club"));
    }

    #[test]
    fn test_log_level_and_best_of() {
        let s = settings(&[(LOG_LEVEL_VAR, "debug"), (BEST_OF_VAR, "5")]);
        assert_eq!(s.log_level, Some(LevelFilter::Debug));
        assert_eq!(s.best_of, 5);

        let s = settings(&[(LOG_LEVEL_VAR, "loud"), (BEST_OF_VAR, "4")]);
        assert_eq!(s.log_level, None);
        assert_eq!(s.best_of, 3);
    }
}
