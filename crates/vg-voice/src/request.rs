//! Inputs and outputs of greeting generation

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vg_config::VoiceConfig;
use vg_core::DayPart;

/// Default location when none is given
pub const DEFAULT_ROOM: &str = "raum";

/// Default content source when none is given
pub const DEFAULT_STATION: &str = "Radio";

/// How playful remote output may be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HumorLevel {
    Factual,
    #[default]
    Relaxed,
    Witty,
}

impl HumorLevel {
    /// Map 0/1/2; anything else falls back to the default
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => HumorLevel::Factual,
            2 => HumorLevel::Witty,
            _ => HumorLevel::Relaxed,
        }
    }

    /// Tone phrase used in the prompt
    pub fn tone(&self) -> &'static str {
        match self {
            HumorLevel::Factual => "freundlich und sachlich",
            HumorLevel::Relaxed => "locker, sympathisch",
            HumorLevel::Witty => "locker, witzig, aber nicht albern",
        }
    }
}

/// Style of remote output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub humor_level: HumorLevel,
    pub vivid: bool,
    pub slightly_longer: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            humor_level: HumorLevel::Relaxed,
            vivid: false,
            slightly_longer: true,
        }
    }
}

/// A spoken greeting plus the announcement of what happens next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingDecision {
    pub greeting: String,
    pub decision: String,
}

/// Parameters of one generation
///
/// Every field is optional in spirit: unset values fall back to the
/// defaults the service documents.
#[derive(Clone, Default)]
pub struct GreetingRequest {
    pub room: Option<String>,
    /// Clock reading to talk about; defaults to now
    pub now: Option<DateTime<Local>>,
    pub station: Option<String>,
    pub is_dark: bool,
    pub extra_context: Option<String>,
    pub max_greeting_chars: Option<usize>,
    pub max_decision_chars: Option<usize>,
    pub style: Style,
    /// Explicit credential; wins over `api_key_state`
    pub api_key: Option<String>,
    /// Host state holding the credential
    pub api_key_state: Option<String>,
    /// Concrete model id or "auto"
    pub model_desired: Option<String>,
    pub model_prefer: Vec<String>,
    pub timeout: Option<Duration>,
    /// Replaces the built-in local greetings
    pub greetings: Option<Vec<String>>,
    /// Replaces the built-in local jokes
    pub jokes: Option<Vec<String>>,
}

impl GreetingRequest {
    pub fn new(room: impl Into<String>, station: impl Into<String>) -> Self {
        Self {
            room: Some(room.into()),
            station: Some(station.into()),
            ..Self::default()
        }
    }

    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn dark(mut self, is_dark: bool) -> Self {
        self.is_dark = is_dark;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_key_state(mut self, state_id: impl Into<String>) -> Self {
        self.api_key_state = Some(state_id.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_desired = Some(model.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_caps(mut self, max_greeting_chars: usize, max_decision_chars: usize) -> Self {
        self.max_greeting_chars = Some(max_greeting_chars);
        self.max_decision_chars = Some(max_decision_chars);
        self
    }

    /// Build a request from the configured defaults
    pub fn from_config(config: &VoiceConfig) -> Self {
        let greeting = &config.greeting;
        let openai = &config.openai;
        Self {
            room: Some(greeting.room.clone()),
            now: None,
            station: Some(greeting.station.clone()),
            is_dark: false,
            extra_context: greeting.extra_context.clone(),
            max_greeting_chars: greeting.max_greeting_chars,
            max_decision_chars: greeting.max_decision_chars,
            style: Style {
                humor_level: HumorLevel::from_level(greeting.style.humor_level),
                vivid: greeting.style.vivid,
                slightly_longer: greeting.style.slightly_longer,
            },
            api_key: openai.api_key.clone(),
            api_key_state: openai.api_key_state.clone(),
            model_desired: Some(openai.model.clone()),
            model_prefer: openai.prefer.clone(),
            timeout: Some(Duration::from_millis(openai.timeout_ms)),
            greetings: greeting.greetings.clone(),
            jokes: greeting.jokes.clone(),
        }
    }

    pub(crate) fn room(&self) -> &str {
        non_empty(self.room.as_deref()).unwrap_or(DEFAULT_ROOM)
    }

    pub(crate) fn station(&self) -> &str {
        non_empty(self.station.as_deref()).unwrap_or(DEFAULT_STATION)
    }

    pub(crate) fn now(&self) -> DateTime<Local> {
        self.now.unwrap_or_else(Local::now)
    }

    /// Greeting and decision caps; unset or 0 falls back to the defaults
    pub(crate) fn caps(&self, greeting: usize, decision: usize) -> (usize, usize) {
        (
            self.max_greeting_chars.filter(|&c| c > 0).unwrap_or(greeting),
            self.max_decision_chars.filter(|&c| c > 0).unwrap_or(decision),
        )
    }

    /// Key of the voice memo: location, source and day part
    pub(crate) fn memo_key(&self, now: &DateTime<Local>) -> String {
        format!("{}|{}|{}", self.room(), self.station(), DayPart::of(now))
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
