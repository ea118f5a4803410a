//! Command interpreter: free text in, reply and optional home mutation out.
//!
//! Two ordered tables drive it:
//!
//! - [`COMMAND_RULES`] recognises the few phrases that change the home.
//!   The first matching rule fires exactly one store operation, and its
//!   confirmation becomes the reply, so the reply always describes the
//!   change that was made.
//! - When no command fires, the knowledge base is searched category by
//!   category (by priority) and [`INTENT_RULES`] pick a response within
//!   the matching category. Confirmation responses are never picked this
//!   way, so nothing claims a change that did not happen.

use tracing::debug;

use crate::knowledge::{Category, KnowledgeBase};
use crate::model::HomeState;
use crate::store::HomeStore;

/// Reply when nothing in the input is recognised.
pub const FALLBACK_REPLY: &str = "Entiendo tu solicitud. ¿Podrías ser más específico sobre qué quieres controlar en tu hogar? Puedo ayudarte con luces, clima, seguridad, dispositivos y más. 🏠";

/// Reply while no knowledge base is available.
pub const LOADING_REPLY: &str = "Disculpa, estoy cargando mi base de conocimientos...";

/// A home mutation the assistant can perform from chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LightsOn,
    LightsOff,
    SetTemperature(i32),
    ArmSecurity,
    ToggleNightMode,
}

impl Command {
    fn apply(self, store: &mut HomeStore) {
        match self {
            Command::LightsOn => store.set_all_lights(true),
            Command::LightsOff => store.set_all_lights(false),
            Command::SetTemperature(value) => store.set_target_temperature(value),
            Command::ArmSecurity => store.arm_security(),
            Command::ToggleNightMode => store.toggle_night_mode(),
        }
    }

    /// Confirmation text, read from the knowledge base when it has one.
    fn confirmation(self, knowledge: &KnowledgeBase, state: &HomeState) -> String {
        let (category, key, default) = match self {
            Command::LightsOn => (
                "luces",
                "encender",
                "He encendido todas las luces del hogar. ✨",
            ),
            Command::LightsOff => ("luces", "apagar", "Todas las luces han sido apagadas. 🌙"),
            Command::SetTemperature(value) => {
                return knowledge
                    .response("clima", &format!("ajustar_{value}"))
                    .map_or_else(
                        || format!("He ajustado la temperatura a {value}°C. ❄️"),
                        str::to_string,
                    );
            }
            Command::ArmSecurity => (
                "seguridad",
                "activar",
                "He activado el sistema de seguridad completo. 🛡️",
            ),
            Command::ToggleNightMode if state.modes.night_mode => (
                "modos",
                "activar_noche",
                "Modo noche activado: luces tenues, seguridad elevada. 🌙",
            ),
            Command::ToggleNightMode => (
                "modos",
                "desactivar_noche",
                "Modo noche desactivado. Buenos días. ☀️",
            ),
        };
        knowledge
            .response(category, key)
            .unwrap_or(default)
            .to_string()
    }
}

/// Whether `key` in `category` holds a command confirmation.
fn is_confirmation(category: &str, key: &str) -> bool {
    match category {
        "luces" => matches!(key, "encender" | "apagar"),
        "clima" => key.starts_with("ajustar_"),
        "seguridad" => key == "activar",
        "modos" => matches!(key, "activar_noche" | "desactivar_noche"),
        _ => false,
    }
}

/// Keyword conditions over the lower-cased input.
///
/// Every group must match; a group matches when a word of the input
/// starts with any of its keywords.
type Conditions = &'static [&'static [&'static str]];

fn conditions_hold(input: &str, conditions: Conditions) -> bool {
    conditions
        .iter()
        .all(|group| group.iter().any(|kw| contains_word_start(input, kw)))
}

/// `keyword` occurs in `input` at the start of a word.
fn contains_word_start(input: &str, keyword: &str) -> bool {
    input.match_indices(keyword).any(|(at, _)| {
        input[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

pub struct CommandRule {
    pub conditions: Conditions,
    /// The rule never fires when the input contains any of these.
    pub unless: &'static [&'static str],
    pub command: Command,
}

/// Commands in priority order. At most the first match fires.
pub const COMMAND_RULES: &[CommandRule] = &[
    CommandRule {
        conditions: &[&["enciende", "prende"], &["todas", "luces"]],
        unless: &[],
        command: Command::LightsOn,
    },
    CommandRule {
        conditions: &[&["apaga"], &["todas", "luces"]],
        unless: &[],
        command: Command::LightsOff,
    },
    CommandRule {
        conditions: &[&["temperatura"], &["21"]],
        unless: &[],
        command: Command::SetTemperature(21),
    },
    CommandRule {
        conditions: &[&["seguridad", "alarma"], &["activa"]],
        // Questions about the alarm are not requests to arm it.
        unless: &["¿", "?"],
        command: Command::ArmSecurity,
    },
    CommandRule {
        conditions: &[&["modo noche"]],
        unless: &[],
        command: Command::ToggleNightMode,
    },
];

pub struct IntentRule {
    pub category: &'static str,
    pub conditions: Conditions,
    /// Response keys to try, in order.
    pub intents: &'static [&'static str],
}

/// Per-category response selection, checked in order within a category.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        category: "luces",
        conditions: &[&["encien", "prend"]],
        intents: &["como_encender"],
    },
    IntentRule {
        category: "luces",
        conditions: &[&["apag"]],
        intents: &["como_apagar"],
    },
    IntentRule {
        category: "clima",
        conditions: &[&["temperatura"]],
        intents: &["temperatura_actual"],
    },
    IntentRule {
        category: "clima",
        conditions: &[&["aire"]],
        intents: &["aire_acondicionado"],
    },
    IntentRule {
        category: "seguridad",
        conditions: &[&["desactiva", "desarma"]],
        intents: &["desactivar"],
    },
    IntentRule {
        category: "seguridad",
        conditions: &[&["activa", "arma"]],
        intents: &["como_activar"],
    },
    IntentRule {
        category: "seguridad",
        conditions: &[&["alarma"]],
        intents: &["alarma_activada"],
    },
    IntentRule {
        category: "modos",
        conditions: &[&["noche"]],
        intents: &["noche"],
    },
    IntentRule {
        category: "general",
        conditions: &[&["hola", "buenas"]],
        intents: &["saludo"],
    },
    IntentRule {
        category: "general",
        conditions: &[&["qué puedes", "ayuda"]],
        intents: &["capacidades"],
    },
    IntentRule {
        category: "general",
        conditions: &[&["gracias"]],
        intents: &["gracias"],
    },
];

/// What the interpreter made of one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    /// Text to show the user. Never empty.
    pub reply: String,
    /// The command applied to the store, if any.
    pub command: Option<Command>,
}

impl Interpretation {
    /// Whether the input was a command rather than small talk.
    pub fn is_specific(&self) -> bool {
        self.command.is_some()
    }
}

/// Maps chat input to replies and home mutations.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    knowledge: Option<KnowledgeBase>,
}

impl Interpreter {
    pub fn new(knowledge: KnowledgeBase) -> Self {
        Self {
            knowledge: Some(knowledge),
        }
    }

    /// An interpreter still waiting for its knowledge base.
    ///
    /// It applies commands but answers everything with [`LOADING_REPLY`].
    pub fn loading() -> Self {
        Self::default()
    }

    /// Interprets `text`, applying at most one command to `store`.
    pub fn interpret(&self, text: &str, store: &mut HomeStore) -> Interpretation {
        let input = text.trim().to_lowercase();

        let command = COMMAND_RULES
            .iter()
            .find(|rule| {
                conditions_hold(&input, rule.conditions)
                    && !rule.unless.iter().any(|kw| input.contains(kw))
            })
            .map(|rule| rule.command);
        if let Some(command) = command {
            debug!(?command, "applying chat command");
            command.apply(store);
        }

        let reply = match (&self.knowledge, command) {
            (None, _) => LOADING_REPLY.to_string(),
            (Some(kb), Some(command)) => command.confirmation(kb, store.state()),
            (Some(kb), None) => best_response(kb, &input)
                .map_or_else(|| FALLBACK_REPLY.to_string(), str::to_string),
        };

        Interpretation { reply, command }
    }
}

/// Finds the knowledge base response for already lower-cased input.
fn best_response<'a>(kb: &'a KnowledgeBase, input: &str) -> Option<&'a str> {
    if input.is_empty() {
        return None;
    }
    let words: Vec<&str> = input
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .collect();

    kb.categories()
        .iter()
        .filter(|category| !category.responses.is_empty())
        .find(|category| {
            category
                .triggers
                .iter()
                .any(|phrase| phrase_matches(input, &words, phrase))
        })
        .and_then(|category| {
            debug!(category = %category.name, "knowledge base match");
            select_response(category, input)
        })
}

fn phrase_matches(input: &str, words: &[&str], phrase: &str) -> bool {
    input.contains(phrase) || phrase.contains(input) || words.iter().any(|w| phrase.contains(w))
}

/// Picks an informational response: an intent match, else the first
/// response in document order.
fn select_response<'a>(category: &'a Category, input: &str) -> Option<&'a str> {
    let informational = |key: &str| !is_confirmation(&category.name, key);

    INTENT_RULES
        .iter()
        .filter(|rule| rule.category == category.name)
        .filter(|rule| conditions_hold(input, rule.conditions))
        .find_map(|rule| {
            rule.intents
                .iter()
                .filter(|key| informational(key))
                .find_map(|key| category.response(key))
        })
        .or_else(|| {
            category
                .responses
                .iter()
                .find(|(key, _)| informational(key))
                .map(|(_, text)| text.as_str())
        })
}
