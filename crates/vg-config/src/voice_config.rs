//! Voice greeting configuration
//!
//! Parses `voice.yaml` from a configuration directory.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "voice.yaml";

/// Remote text-generation settings (`openai:` section)
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiSection {
    /// Bearer credential; usually `!secret openai_key`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Host state holding the credential, used when `api_key` is unset
    #[serde(default)]
    pub api_key_state: Option<String>,

    /// Concrete model id or "auto"
    #[serde(default = "default_model")]
    pub model: String,

    /// Preferred models for "auto", in order
    #[serde(default)]
    pub prefer: Vec<String>,

    /// Endpoint host
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for the greeting request in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How long a fetched model list stays valid
    #[serde(default = "default_model_cache_hours")]
    pub model_cache_hours: u32,
}

impl std::fmt::Debug for OpenAiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_state", &self.api_key_state)
            .field("model", &self.model)
            .field("prefer", &self.prefer)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("model_cache_hours", &self.model_cache_hours)
            .finish()
    }
}

/// Tone settings for remote output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSection {
    /// 0 = factual, 1 = relaxed, 2 = funny
    #[serde(default = "default_humor_level")]
    pub humor_level: u8,

    /// Allow short figurative language
    #[serde(default)]
    pub vivid: bool,

    /// Allow one more sentence in the decision
    #[serde(default = "default_true")]
    pub slightly_longer: bool,
}

/// Greeting defaults (`greeting:` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingSection {
    #[serde(default = "default_room")]
    pub room: String,

    #[serde(default = "default_station")]
    pub station: String,

    #[serde(default)]
    pub extra_context: Option<String>,

    #[serde(default)]
    pub max_greeting_chars: Option<usize>,

    #[serde(default)]
    pub max_decision_chars: Option<usize>,

    #[serde(default)]
    pub style: StyleSection,

    /// Replaces the built-in local greetings
    #[serde(default)]
    pub greetings: Option<Vec<String>>,

    /// Replaces the built-in local jokes
    #[serde(default)]
    pub jokes: Option<Vec<String>>,
}

/// Full contents of `voice.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub openai: OpenAiSection,

    #[serde(default)]
    pub greeting: GreetingSection,
}

fn default_model() -> String {
    "auto".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_timeout_ms() -> u64 {
    9000
}

fn default_model_cache_hours() -> u32 {
    6
}

fn default_humor_level() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

fn default_room() -> String {
    "raum".to_string()
}

fn default_station() -> String {
    "Radio".to_string()
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_state: None,
            model: default_model(),
            prefer: Vec::new(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            model_cache_hours: default_model_cache_hours(),
        }
    }
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            humor_level: default_humor_level(),
            vivid: false,
            slightly_longer: true,
        }
    }
}

impl Default for GreetingSection {
    fn default() -> Self {
        Self {
            room: default_room(),
            station: default_station(),
            extra_context: None,
            max_greeting_chars: None,
            max_decision_chars: None,
            style: StyleSection::default(),
            greetings: None,
            jokes: None,
        }
    }
}

impl VoiceConfig {
    /// Load `voice.yaml` from a config directory
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = load_yaml(config_dir.as_ref(), CONFIG_FILE)?;
        Self::from_yaml(&yaml)
    }

    /// Load `voice.yaml` if present, otherwise use defaults
    pub fn load_or_default(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_dir = config_dir.as_ref();
        if config_dir.join(CONFIG_FILE).exists() {
            Self::load(config_dir)
        } else {
            tracing::info!("No {} in {:?}, using defaults", CONFIG_FILE, config_dir);
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a YAML value
    pub fn from_yaml(yaml: &Value) -> ConfigResult<Self> {
        if yaml.is_null() {
            return Ok(Self::default());
        }
        if !yaml.is_mapping() {
            return Err(ConfigError::Invalid {
                key: "root".to_string(),
                reason: "configuration must be a mapping".to_string(),
            });
        }

        let config: VoiceConfig =
            serde_yaml::from_value(yaml.clone()).map_err(|e| ConfigError::Invalid {
                key: "voice".to_string(),
                reason: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.greeting.style.humor_level > 2 {
            return Err(ConfigError::Invalid {
                key: "greeting.style.humor_level".to_string(),
                reason: format!("must be 0, 1 or 2, got {}", self.greeting.style.humor_level),
            });
        }
        if self.openai.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "openai.timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
