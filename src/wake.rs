//! Wake phrase handling
//!
//! Commands may be prefixed by a trigger built from one configured base word
//! ("hey asistente", "oye asistente", ...). The trigger is stripped before the
//! command is routed.

/// Fixed trigger templates, in match priority order
const TRIGGER_PREFIXES: [&str; 4] = ["hey", "oye", "hola", "ok"];

/// Punctuation that may follow a trigger ("hey asistente, ...")
const TRAILING_PUNCTUATION: [char; 6] = [',', '.', ':', ';', '!', '?'];

/// Triggers derived from a base wake word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakePhrase {
    word: String,
    triggers: Vec<String>,
}

impl WakePhrase {
    /// Build triggers for `word`
    #[must_use]
    pub fn new(word: &str) -> Self {
        let word = word.trim().to_lowercase();
        let mut triggers: Vec<String> = TRIGGER_PREFIXES
            .iter()
            .map(|prefix| format!("{prefix} {word}"))
            .collect();
        // Bare word last so prefixed forms win
        triggers.push(word.clone());

        tracing::debug!(?triggers, "wake phrase configured");

        Self { word, triggers }
    }

    /// The normalized base word
    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Triggers in priority order
    #[must_use]
    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Remove the first matching trigger and one following punctuation mark
    ///
    /// Text without a trigger is returned trimmed but otherwise unchanged.
    #[must_use]
    pub fn strip<'a>(&self, text: &'a str) -> &'a str {
        let text = text.trim();
        if self.word.is_empty() {
            return text;
        }

        let Some(rest) = self
            .triggers
            .iter()
            .find_map(|t| strip_prefix_ignore_case(text, t))
        else {
            return text;
        };

        let rest = rest.trim_start();
        rest.strip_prefix(TRAILING_PUNCTUATION)
            .unwrap_or(rest)
            .trim()
    }
}

/// Case-insensitive `str::strip_prefix` for a lower-cased `prefix`
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(text);
    }

    let mut folded = String::with_capacity(prefix.len());
    for (idx, ch) in text.char_indices() {
        folded.extend(ch.to_lowercase());
        if !prefix.starts_with(folded.as_str()) {
            return None;
        }
        if folded.len() == prefix.len() {
            return Some(&text[idx + ch.len_utf8()..]);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_triggers_in_priority_order() {
        let wake = WakePhrase::new("  Asistente ");
        assert_eq!(wake.word(), "asistente");
        assert_eq!(
            wake.triggers(),
            &[
                "hey asistente",
                "oye asistente",
                "hola asistente",
                "ok asistente",
                "asistente"
            ]
        );
    }

    #[test]
    fn strips_every_trigger_and_punctuation() {
        let wake = WakePhrase::new("asistente");
        for trigger in wake.triggers().to_vec() {
            for sep in [", ", ": ", ". ", "! ", " "] {
                let input = format!("{trigger}{sep}do X");
                assert_eq!(wake.strip(&input), "do X", "input: {input:?}");
            }
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let wake = WakePhrase::new("asistente");
        assert_eq!(wake.strip("HEY Asistente, abre chrome"), "abre chrome");
        assert_eq!(wake.strip("Oye ASISTENTE pon música"), "pon música");
    }

    #[test]
    fn only_one_punctuation_mark_is_removed() {
        let wake = WakePhrase::new("asistente");
        assert_eq!(wake.strip("asistente,, hola"), ", hola");
    }

    #[test]
    fn text_without_trigger_is_kept() {
        let wake = WakePhrase::new("asistente");
        assert_eq!(wake.strip("  abre whatsapp "), "abre whatsapp");
    }

    #[test]
    fn trigger_alone_strips_to_empty() {
        let wake = WakePhrase::new("asistente");
        assert_eq!(wake.strip("Hey asistente!"), "");
        assert_eq!(wake.strip("asistente"), "");
    }

    #[test]
    fn non_ascii_wake_word_is_sliced_safely() {
        let wake = WakePhrase::new("Jarvís");
        assert_eq!(wake.strip("OYE JARVÍS, qué hora es"), "qué hora es");
        assert_eq!(wake.strip("Ñandú, hola"), "Ñandú, hola");
    }
}
