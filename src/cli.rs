//! CLI interface for Nexus Home.
//!
//! Each dashboard page becomes a group of subcommands:
//!
//! - `nexus status`: the home overview.
//! - `nexus lights|climate|security|night-mode|device|all`: the control page.
//! - `nexus chat`: talk to NexusIA, one message or an interactive session.
//! - `nexus settings`: user preferences.
//! - `nexus faq`: help content.
//!
//! Every command reads and mutates the same [`HomeStore`], which persists
//! after each change.

mod faq;
mod format;

use std::path::Path;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use jiff::Zoned;
use jiff::tz::TimeZone;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use crate::chat::Assistant;
use crate::config::Config;
use crate::interpret::Interpreter;
use crate::knowledge::KnowledgeBase;
use crate::model::Temperature;
use crate::store::HomeStore;

use format::{format_controls, format_message, format_status};

/// Nexus Home: your smart home from the terminal.
#[derive(Debug, Parser)]
#[command(name = "nexus", after_long_help = EXAMPLES_HELP)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

const EXAMPLES_HELP: &str = r#"Examples:
  nexus status
  nexus lights toggle kitchen
  nexus climate set 22
  nexus chat "Enciende todas las luces"
  nexus chat            (interactive session, exit with Ctrl-D)"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the home overview.
    Status {
        /// Print the full home document as JSON.
        #[arg(long)]
        json: bool,

        /// Also list every room light and device.
        #[arg(long)]
        detail: bool,
    },

    /// Control the lights.
    Lights {
        #[command(subcommand)]
        command: LightsCommand,
    },

    /// Control the climate.
    Climate {
        #[command(subcommand)]
        command: ClimateCommand,
    },

    /// Arm or disarm security. Arming closes the door.
    Security,

    /// Toggle night mode. Entering it leaves only the bedroom lit.
    NightMode,

    /// Toggle a device: tv, speakers or smart_plugs.
    Device {
        name: String,
    },

    /// Switch lights, TV, speakers and air conditioning on or off together.
    All {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Chat with NexusIA.
    ///
    /// With a message, sends it and prints the reply.
    /// Without one, starts an interactive session.
    Chat {
        message: Option<String>,
    },

    /// Show the chat transcript.
    History {
        /// Delete the transcript instead.
        #[arg(long)]
        clear: bool,
    },

    /// Change preferences.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Frequently asked questions.
    Faq,
}

#[derive(Debug, Subcommand)]
pub enum LightsCommand {
    /// Toggle one room (living, kitchen, bedroom, bathroom) or `all`.
    Toggle { target: String },
    /// Turn every light on.
    On,
    /// Turn every light off.
    Off,
}

#[derive(Debug, Subcommand)]
pub enum ClimateCommand {
    /// Set the target temperature in °C, clamped to 16–30.
    Set {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Toggle the air conditioning.
    Ac,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Set the name used in greetings.
    Name { name: String },
    /// Toggle dark mode.
    DarkMode,
    /// Toggle notifications.
    Notifications,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

/// Run a parsed command, returning an error message on failure.
pub async fn run(cli: Cli, config: &Config, store: &mut HomeStore) -> Result<(), String> {
    match cli.command {
        Command::Status { json, detail } => cmd_status(store, json, detail),
        Command::Lights { command } => cmd_lights(store, &command),
        Command::Climate { command } => {
            match command {
                ClimateCommand::Set { value } => cmd_set_temperature(store, value),
                ClimateCommand::Ac => store.toggle_air_conditioning(),
            }
            print_controls(store);
            Ok(())
        }
        Command::Security => {
            store.toggle_security();
            print_controls(store);
            Ok(())
        }
        Command::NightMode => {
            store.toggle_night_mode();
            print_controls(store);
            Ok(())
        }
        Command::Device { name } => {
            store.toggle_device(&name).map_err(|e| e.to_string())?;
            print_controls(store);
            Ok(())
        }
        Command::All { state } => {
            match state {
                Switch::On => store.turn_on_all_devices(),
                Switch::Off => store.turn_off_all_devices(),
            }
            print_controls(store);
            Ok(())
        }
        Command::Chat { message } => {
            let assistant = load_assistant(config).await;
            match message {
                Some(message) => cmd_chat_once(&assistant, store, &message).await,
                None => cmd_chat_session(&assistant, store).await,
            }
        }
        Command::History { clear } => cmd_history(store, clear),
        Command::Settings { command } => cmd_settings(store, command),
        Command::Faq => {
            println!("{}", faq::format_faqs());
            Ok(())
        }
    }
}

fn cmd_status(store: &HomeStore, json: bool, detail: bool) -> Result<(), String> {
    let state = store.state();
    if json {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| format!("failed to serialize home state: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", format_status(state, Zoned::now().hour()));
    if detail {
        println!("\n{}", format_controls(state).trim_end());
    }
    if !store.is_persistent() {
        eprintln!("Warning: changes are not being saved this session.");
    }
    Ok(())
}

fn cmd_lights(store: &mut HomeStore, command: &LightsCommand) -> Result<(), String> {
    match command {
        LightsCommand::Toggle { target } if target == "all" => store.toggle_all_lights(),
        LightsCommand::Toggle { target } => {
            store.toggle_light(target).map_err(|e| e.to_string())?;
        }
        LightsCommand::On => store.set_all_lights(true),
        LightsCommand::Off => store.set_all_lights(false),
    }
    print_controls(store);
    Ok(())
}

/// The store takes any value; the slider range is enforced here.
fn cmd_set_temperature(store: &mut HomeStore, value: i32) {
    let target = clamp_target(value);
    if target != value {
        eprintln!(
            "Target {value}°C is out of range; using {target}°C ({}–{}°C).",
            Temperature::MIN_TARGET,
            Temperature::MAX_TARGET
        );
    }
    store.set_target_temperature(target);
}

fn clamp_target(value: i32) -> i32 {
    value.clamp(Temperature::MIN_TARGET, Temperature::MAX_TARGET)
}

fn print_controls(store: &HomeStore) {
    let state = store.state();
    print!("{}", format_controls(state));
    println!(
        "clima          {}°C, aire {}",
        state.temperature.target,
        if state.temperature.air_conditioning_on { "encendido" } else { "apagado" }
    );
    println!(
        "seguridad      {}",
        if state.security.armed { "activada" } else { "desactivada" }
    );
    println!(
        "modo noche     {}",
        if state.modes.night_mode { "activado" } else { "desactivado" }
    );
}

/// Builds the assistant, loading the configured knowledge base.
///
/// A knowledge base that fails to load is logged and leaves the assistant
/// answering with its loading message.
async fn load_assistant(config: &Config) -> Assistant {
    let knowledge = match &config.knowledge_base {
        Some(path) => load_knowledge(path).await,
        None => KnowledgeBase::embedded()
            .inspect_err(|e| warn!("built-in knowledge base failed to load: {e}"))
            .ok(),
    };
    let interpreter = knowledge.map_or_else(Interpreter::loading, Interpreter::new);
    Assistant::new(interpreter, config.typing_delay())
}

async fn load_knowledge(path: &Path) -> Option<KnowledgeBase> {
    KnowledgeBase::load(path)
        .await
        .inspect_err(|e| warn!(path = %path.display(), "knowledge base failed to load: {e}"))
        .ok()
}

async fn cmd_chat_once(
    assistant: &Assistant,
    store: &mut HomeStore,
    message: &str,
) -> Result<(), String> {
    match assistant.send(store, message).await {
        Some(result) => {
            println!("{}", result.reply);
            Ok(())
        }
        None => Err("message is empty".to_string()),
    }
}

async fn cmd_chat_session(assistant: &Assistant, store: &mut HomeStore) -> Result<(), String> {
    let mut editor = DefaultEditor::new().map_err(|e| format!("failed to start chat: {e}"))?;

    println!("¡Hola! Soy NexusIA. Pregúntame sobre luces, clima, seguridad, dispositivos y más.");
    println!("(Ctrl-D para salir)\n");

    // Notifications are shown while the session runs, if enabled.
    let mut last = store.state().last_notification.clone();
    let banner = store.subscribe(move |state| {
        if state.notifications && state.last_notification != last {
            eprintln!("[aviso] {}", state.last_notification);
        }
        last.clone_from(&state.last_notification);
    });

    let result = chat_loop(&mut editor, assistant, store).await;
    store.unsubscribe(banner);
    result
}

async fn chat_loop(
    editor: &mut DefaultEditor,
    assistant: &Assistant,
    store: &mut HomeStore,
) -> Result<(), String> {
    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(format!("failed to read input: {e}")),
        };
        if line.trim().is_empty() {
            continue;
        }
        // Editor recall only; the transcript lives in the store.
        if let Err(e) = editor.add_history_entry(line.as_str()) {
            debug!("failed to add line to editor history: {e}");
        }

        eprintln!("NexusIA está escribiendo...");
        if let Some(result) = assistant.send(store, &line).await {
            println!("{}\n", result.reply);
        }
    }
    Ok(())
}

fn cmd_history(store: &mut HomeStore, clear: bool) -> Result<(), String> {
    if clear {
        store.clear_chat_history();
        eprintln!("Chat history cleared");
        return Ok(());
    }

    let history = &store.state().chat_history;
    if history.is_empty() {
        println!("No messages");
        return Ok(());
    }
    let tz = TimeZone::system();
    for msg in history {
        println!("{}", format_message(msg, &tz));
    }
    Ok(())
}

fn cmd_settings(store: &mut HomeStore, command: SettingsCommand) -> Result<(), String> {
    match command {
        SettingsCommand::Name { name } => {
            let name = name.trim();
            if name.is_empty() {
                return Err("name cannot be empty".to_string());
            }
            store.set_user_name(name);
            eprintln!("Name set to {name}");
        }
        SettingsCommand::DarkMode => {
            store.toggle_dark_mode();
            let on = store.state().is_dark_mode;
            eprintln!("Dark mode {}", if on { "on" } else { "off" });
        }
        SettingsCommand::Notifications => {
            store.toggle_notifications();
            let on = store.state().notifications;
            eprintln!("Notifications {}", if on { "on" } else { "off" });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::interpret::LOADING_REPLY;

    #[test]
    fn clamp_target_to_slider_range() {
        assert_eq!(clamp_target(10), 16);
        assert_eq!(clamp_target(22), 22);
        assert_eq!(clamp_target(45), 30);
    }

    #[test]
    fn parse_lights_toggle() {
        let cli = Cli::try_parse_from(["nexus", "-vv", "lights", "toggle", "kitchen"]).unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Lights {
                command: LightsCommand::Toggle { ref target }
            } if target == "kitchen"
        ));
    }

    #[test]
    fn parse_negative_temperature() {
        let cli = Cli::try_parse_from(["nexus", "climate", "set", "-5"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Climate {
                command: ClimateCommand::Set { value: -5 }
            }
        ));
    }

    #[test]
    fn lights_toggle_all_and_rooms() {
        let mut store = HomeStore::in_memory(0);

        cmd_lights(&mut store, &LightsCommand::Toggle { target: "all".into() }).unwrap();
        assert!(store.state().lights.all);

        cmd_lights(&mut store, &LightsCommand::Toggle { target: "bedroom".into() }).unwrap();
        assert!(!store.state().lights.bedroom);

        let err = cmd_lights(&mut store, &LightsCommand::Toggle { target: "attic".into() })
            .unwrap_err();
        assert_eq!(err, "unknown room: attic");
    }

    #[test]
    fn empty_name_rejected() {
        let mut store = HomeStore::in_memory(0);
        let err =
            cmd_settings(&mut store, SettingsCommand::Name { name: "  ".into() }).unwrap_err();

        assert_eq!(err, "name cannot be empty");
        assert_eq!(store.state().user_name, "Usuario");
    }

    #[tokio::test]
    async fn missing_knowledge_base_leaves_assistant_loading() {
        let config = Config {
            knowledge_base: Some("/nonexistent/nexus/kb.json".into()),
            typing_delay_ms: 0,
            ..Config::default()
        };
        let mut store = HomeStore::in_memory(0);

        let assistant = load_assistant(&config).await;
        let result = assistant.send(&mut store, "hola").await.unwrap();

        assert_eq!(result.reply, LOADING_REPLY);
    }
}
