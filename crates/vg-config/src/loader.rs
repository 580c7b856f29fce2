//! YAML loading with `!include`, `!secret` and `!env_var`

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::value::TaggedValue;
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;

/// Reads YAML files below a config directory and resolves custom tags
///
/// Unknown tags are kept as they are, with their content resolved.
pub struct YamlLoader {
    config_dir: PathBuf,
    secrets: Secrets,
    /// Files currently being read, innermost last
    open_files: Vec<PathBuf>,
}

impl YamlLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::from_dir(&config_dir)?;
        Ok(Self::with_secrets(config_dir, secrets))
    }

    pub fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            open_files: Vec::new(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load a file; relative paths are taken from the config directory
    pub fn load_file(&mut self, file: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.config_dir.join(file.as_ref());
        if self.open_files.contains(&path) {
            return Err(ConfigError::IncludeCycle { path });
        }

        debug!(?path, "Reading YAML");
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        self.open_files.push(path.clone());
        let loaded = self.load_str(&content, &path);
        self.open_files.pop();
        loaded
    }

    /// Parse YAML text; `origin` anchors relative includes and error messages
    pub fn load_str(&mut self, content: &str, origin: &Path) -> ConfigResult<Value> {
        let raw: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: origin.to_path_buf(),
            source,
        })?;
        self.resolve(raw, origin)
    }

    fn resolve(&mut self, value: Value, origin: &Path) -> ConfigResult<Value> {
        Ok(match value {
            Value::Tagged(tagged) => self.resolve_tag(*tagged, origin)?,
            Value::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.resolve(item, origin))
                    .collect::<ConfigResult<_>>()?,
            ),
            Value::Mapping(map) => {
                let mut resolved = serde_yaml::Mapping::with_capacity(map.len());
                for (key, val) in map {
                    resolved.insert(self.resolve(key, origin)?, self.resolve(val, origin)?);
                }
                Value::Mapping(resolved)
            }
            scalar => scalar,
        })
    }

    fn resolve_tag(&mut self, tagged: TaggedValue, origin: &Path) -> ConfigResult<Value> {
        let TaggedValue { tag, value } = tagged;
        trace!(%tag, "Resolving tag");

        if tag == "include" {
            let file = tag_argument("!include", &value)?;
            let base = origin.parent().unwrap_or(&self.config_dir).to_path_buf();
            return self.load_file(base.join(file));
        }
        if tag == "secret" {
            let name = tag_argument("!secret", &value)?;
            return Ok(Value::String(self.secrets.require(name)?.to_string()));
        }
        if tag == "env_var" {
            let var = tag_argument("!env_var", &value)?;
            let text = std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.to_string()))?;
            return Ok(Value::String(text));
        }

        let value = self.resolve(value, origin)?;
        Ok(Value::Tagged(Box::new(TaggedValue { tag, value })))
    }
}

fn tag_argument<'a>(tag: &'static str, value: &'a Value) -> ConfigResult<&'a str> {
    value.as_str().ok_or(ConfigError::TagArgument { tag })
}

/// Load `file` from `config_dir` with `secrets.yaml` of that directory
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(config_dir)?.load_file(file)
}

/// Load YAML text as if it were a file named `origin` in `config_dir`
pub fn load_yaml_string(
    config_dir: impl Into<PathBuf>,
    content: &str,
    origin: &str,
) -> ConfigResult<Value> {
    let mut loader = YamlLoader::new(config_dir)?;
    let origin = loader.config_dir().join(origin);
    loader.load_str(content, &origin)
}
