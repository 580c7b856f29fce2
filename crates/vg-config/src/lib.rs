//! YAML configuration for the voice greeting helpers
//!
//! `voice.yaml` in a configuration directory holds the remote endpoint
//! settings and the greeting defaults. The loader understands:
//!
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use vg_config::VoiceConfig;
//!
//! let config = VoiceConfig::load("/opt/voice")?;
//! println!("model: {}", config.openai.model);
//! ```

mod error;
mod loader;
mod secrets;
mod voice_config;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, load_yaml_string, YamlLoader};
pub use secrets::{Secrets, SECRETS_FILE};
pub use voice_config::{GreetingSection, OpenAiSection, StyleSection, VoiceConfig, CONFIG_FILE};

pub use serde_yaml::Value;
