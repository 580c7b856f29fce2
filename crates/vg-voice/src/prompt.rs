//! German prompt text for the remote model

use chrono::{DateTime, Local};
use vg_core::{hhmm, DayPart};

use crate::request::GreetingRequest;

/// Instructions plus input of one remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub instructions: String,
    pub input: String,
}

impl Prompt {
    pub fn new(
        request: &GreetingRequest,
        now: &DateTime<Local>,
        max_greeting_chars: usize,
        max_decision_chars: usize,
    ) -> Self {
        Self {
            instructions: build_instructions(),
            input: build_input(request, now, max_greeting_chars, max_decision_chars),
        }
    }
}

pub fn build_instructions() -> String {
    [
        "Du gibst NUR ein JSON-Objekt zurück. Kein Text außerhalb JSON.",
        "Deutsch, Alexa-TTS geeignet, kein SSML.",
        "Sicher: keine Beleidigungen gegen Personen/Gruppen, keine politischen Inhalte, keine Sexualinhalte.",
    ]
    .join(" ")
}

/// Context block followed by the output rules
pub fn build_input(
    request: &GreetingRequest,
    now: &DateTime<Local>,
    max_greeting_chars: usize,
    max_decision_chars: usize,
) -> String {
    let light = if request.is_dark {
        "Es ist dunkel; Licht wird eingeschaltet/bleibt an."
    } else {
        "Licht bleibt unverändert."
    };

    let mut lines = vec![
        "Kontext:".to_string(),
        format!("- Raum: {}", request.room()),
        format!("- Tageszeit: {}", DayPart::of(now)),
        format!("- Uhrzeit: {}", hhmm(now)),
        format!("- Sender: {}", request.station()),
        format!("- Licht: {}", light),
    ];
    if let Some(extra) = request
        .extra_context
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
    {
        lines.push(format!("- Extra: {}", extra));
    }

    let style = &request.style;
    let sentences = if style.slightly_longer {
        "2–3 Sätze"
    } else {
        "max 2 Sätze"
    };

    lines.push(String::new());
    lines.push(r#"Erzeuge JSON: {"greeting":"...","decision":"..."}"#.to_string());
    lines.push("Regeln:".to_string());
    lines.push(format!(
        "- greeting: 1–2 Sätze, natürlich, {}, max {} Zeichen.",
        style.humor_level.tone(),
        max_greeting_chars
    ));
    lines.push(format!(
        "- decision: {}, max {} Zeichen.",
        sentences, max_decision_chars
    ));
    lines.push(r#"- decision MUSS enthalten: Uhrzeit UND "Ich starte <Sender>"."#.to_string());
    lines.push("- Optional: 1 kurzer, neuer Witz (keine Wiederholung von Standard-Floskeln).".to_string());
    lines.push(
        r#"- Optional: 0–1 mildes Wort (z.B. "Mist", "verdammt", "so ein Käse") – nie gegen Personen."#
            .to_string(),
    );
    if style.vivid {
        lines.push("- Sprachbilder erlaubt, aber kurz und verständlich.".to_string());
    }

    let mut input = lines.join("\n");
    input.push('\n');
    input
}
