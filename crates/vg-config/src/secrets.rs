//! Values referenced by `!secret`
//!
//! `secrets.yaml` next to `voice.yaml` keeps the API key out of the main
//! file. Scalars are stored as text; nested values are rejected.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

pub const SECRETS_FILE: &str = "secrets.yaml";

#[derive(Clone, Default)]
pub struct Secrets {
    values: BTreeMap<String, String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

impl Secrets {
    /// Read `secrets.yaml` from `dir`; a missing file means no secrets
    pub fn from_dir(dir: &Path) -> ConfigResult<Self> {
        let path = dir.join(SECRETS_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(?path, "No secrets file");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        let secrets = Self::parse(&content).map_err(|err| match err {
            ConfigError::Yaml { source, .. } => ConfigError::Yaml {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        debug!(count = secrets.values.len(), "Secrets loaded");
        Ok(secrets)
    }

    /// Parse the YAML mapping of secret names to scalars
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let raw: Option<BTreeMap<String, Value>> =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
                path: SECRETS_FILE.into(),
                source,
            })?;

        let mut values = BTreeMap::new();
        for (name, value) in raw.unwrap_or_default() {
            let text = match value {
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::String(s) => s,
                _ => return Err(ConfigError::invalid(name, "secret must be a scalar")),
            };
            values.insert(name, text);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get), failing for unknown names
    pub fn require(&self, name: &str) -> ConfigResult<&str> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownSecret(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
