use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use thiserror::Error;
use tracing::debug;

use crate::types::{OwnerSpec, Targets};

const APP_NAME: &str = "open-prs";
const LOCAL_CONFIG_FILE: &str = ".open-prs.toml";
const CONFIG_ENV_VAR: &str = "OPEN_PRS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("owner '{0}' sets both 'include' and 'exclude'; use one or the other")]
    IncludeAndExclude(String),
}

/// Credentials section of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
}

/// Value of one `[owners]` entry: `true`, `false` or an include/exclude table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum OwnerEntry {
    Enabled(bool),
    Filtered(OwnerFilter),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct OwnerFilter {
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

/// `[owners]` table in document order.
#[derive(Debug, Default)]
struct OwnerTable(Vec<(String, OwnerEntry)>);

impl<'de> Deserialize<'de> for OwnerTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OwnerTableVisitor;

        impl<'de> Visitor<'de> for OwnerTableVisitor {
            type Value = OwnerTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of owner names")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((owner, entry)) = map.next_entry::<String, OwnerEntry>()? {
                    entries.push((owner, entry));
                }
                Ok(OwnerTable(entries))
            }
        }

        deserializer.deserialize_map(OwnerTableVisitor)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    auth: AuthConfig,
    #[serde(default)]
    owners: OwnerTable,
}

/// Static configuration: credentials plus the owners reported when no
/// targets are given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub auth: AuthConfig,
    pub targets: Targets,
}

impl Config {
    /// Parses a TOML document. Owners keep the order they appear in.
    pub fn parse(contents: &str) -> Result<Config, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;

        let mut targets = Targets::new();
        for (owner, entry) in file.owners.0 {
            match entry {
                OwnerEntry::Enabled(true) => targets.insert(owner, OwnerSpec::all_public()),
                OwnerEntry::Enabled(false) => {
                    debug!(owner = %owner, "owner disabled in configuration");
                }
                OwnerEntry::Filtered(OwnerFilter {
                    include: Some(_),
                    exclude: Some(_),
                }) => return Err(ConfigError::IncludeAndExclude(owner)),
                OwnerEntry::Filtered(OwnerFilter {
                    include: Some(include),
                    exclude: None,
                }) => targets.insert(owner, OwnerSpec::explicit(include)),
                OwnerEntry::Filtered(OwnerFilter {
                    include: None,
                    exclude,
                }) => targets.insert(owner, OwnerSpec::excluding(exclude.unwrap_or_default())),
            }
        }

        Ok(Config {
            auth: file.auth,
            targets,
        })
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&contents)
    }

    /// Loads the configuration from the first location that applies:
    /// `explicit`, `$OPEN_PRS_CONFIG`, `./.open-prs.toml`, then the user
    /// config directory. Falls back to an empty configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading configuration");
            return Config::load_from(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            debug!(path = %path.display(), "loading configuration from {CONFIG_ENV_VAR}");
            return Config::load_from(&path);
        }

        for path in default_locations() {
            if path.is_file() {
                debug!(path = %path.display(), "loading configuration");
                return Config::load_from(&path);
            }
        }

        debug!("no configuration file found");
        Ok(Config::default())
    }
}

/// Implicit configuration locations, most specific first.
pub fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_NAME).join("config.toml"));
    }
    paths
}
