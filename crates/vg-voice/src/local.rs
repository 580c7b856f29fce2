//! Local greeting generation without any remote dependency

use vg_core::{clip, hhmm, DayPart};
use vg_selector::NonRepeatingSelector;

use crate::request::{GreetingDecision, GreetingRequest};

/// Greeting cap when the request sets none
pub const DEFAULT_MAX_GREETING_CHARS: usize = 120;

/// Decision cap when the request sets none
pub const DEFAULT_MAX_DECISION_CHARS: usize = 420;

/// Probability of appending a joke to the decision
pub const JOKE_PROBABILITY: f64 = 0.55;

pub const DEFAULT_GREETINGS: &[&str] = &[
    "Hallo du da… ich mach ein bisschen Radio an.",
    "Hey, was geht ab? Ich starte Musik.",
    "Oh, damit habe ich jetzt nicht gerechnet!",
    "Gääähn… jetzt hast du mich geweckt.",
    "So. Wir beide… und ein bisschen Musik.",
    "Ich bin bereit. Lass uns was hören.",
];

pub const DEFAULT_JOKES: &[&str] = &[
    "Kurzer Service-Hinweis: Der Kaffee ist leider noch nicht im WLAN.",
    "Ich wollte ja Sport machen… aber dann hat mich die Couch bedroht.",
    "Ich bin nicht faul. Ich bin im Energiesparmodus.",
    "Wenn ich ein Körper hätte, würde ich jetzt mitwippen.",
];

/// Composes greeting and decision from candidate lists
///
/// Greetings and jokes rotate through the selector, keyed per room, so a
/// room hears every line once before any comes back.
pub struct LocalGenerator<'a> {
    selector: &'a NonRepeatingSelector,
}

impl<'a> LocalGenerator<'a> {
    pub fn new(selector: &'a NonRepeatingSelector) -> Self {
        Self { selector }
    }

    pub fn generate(&self, request: &GreetingRequest) -> GreetingDecision {
        let room = request.room();
        let station = request.station();
        let now = request.now();
        let time = hhmm(&now);

        let greeting = self
            .pick(&format!("greet:{}", room), request.greetings.as_deref())
            .unwrap_or_else(|| DEFAULT_GREETINGS[0].to_string());

        let opener = match DayPart::of(&now) {
            DayPart::Dawn => format!("Guten Morgen! Es ist {}.", time),
            DayPart::Day => format!("Guten Tag! Es ist {}.", time),
            DayPart::Evening => format!("Guten Abend! Es ist {}.", time),
            DayPart::Night => format!("Pssst… es ist {}.", time),
        };

        let mut decision = format!("{} Ich starte jetzt {}.", opener, station);
        if request.is_dark {
            decision.push_str(" Weil es dunkel ist, mache ich Licht an.");
        }
        if self.selector.chance(JOKE_PROBABILITY) {
            if let Some(joke) = self.pick(&format!("joke:{}", room), request.jokes.as_deref()) {
                decision.push(' ');
                decision.push_str(&joke);
            }
        }

        let (max_greeting, max_decision) =
            request.caps(DEFAULT_MAX_GREETING_CHARS, DEFAULT_MAX_DECISION_CHARS);
        GreetingDecision {
            greeting: clip(&greeting, max_greeting),
            decision: clip(&decision, max_decision),
        }
    }

    /// Select from the caller's list, or the built-in one when it is
    /// missing or empty
    fn pick(&self, key: &str, custom: Option<&[String]>) -> Option<String> {
        match custom.filter(|c| !c.is_empty()) {
            Some(list) => self.selector.select(Some(key), list),
            None => {
                let builtin = if key.starts_with("joke:") {
                    DEFAULT_JOKES
                } else {
                    DEFAULT_GREETINGS
                };
                self.selector.select(Some(key), builtin).map(str::to_string)
            }
        }
    }
}
