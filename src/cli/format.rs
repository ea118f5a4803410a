//! Output formatting for CLI display.

use jiff::tz::TimeZone;

use crate::model::{ChatMessage, Device, HomeState, Room, Sender};

/// Greeting for the given hour of the day (0–23).
pub(super) fn greeting(hour: i8) -> &'static str {
    match hour {
        ..12 => "Buenos días",
        12..18 => "Buenas tardes",
        _ => "Buenas noches",
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "encendido" } else { "apagado" }
}

fn enabled(on: bool) -> &'static str {
    if on { "Activado" } else { "Desactivado" }
}

/// The home overview: one line per dashboard card, then the notification.
pub(super) fn format_status(state: &HomeState, hour: i8) -> String {
    let lights = &state.lights;
    let mut out = format!("{}, {}\n\n", greeting(hour), state.user_name);

    let security = if state.security.armed { "Activada" } else { "Desactivada" };
    let door = if state.security.door_open { "abierta" } else { "cerrada" };
    out.push_str(&format!("Seguridad     {security} (puerta {door})\n"));
    out.push_str(&format!(
        "Luces         {}/{} encendidas\n",
        lights.rooms_on(),
        Room::ALL.len()
    ));
    out.push_str(&format!(
        "Temperatura   {}°C (objetivo {}°C, aire {})\n",
        state.temperature.current,
        state.temperature.target,
        on_off(state.temperature.air_conditioning_on)
    ));
    out.push_str(&format!(
        "Energía       {} kWh ({})\n",
        state.energy.consumed, state.energy.efficiency
    ));
    out.push_str(&format!(
        "Dispositivos  {} conectados\n",
        state.devices.connected
    ));
    out.push_str(&format!(
        "Modo noche    {}\n",
        enabled(state.modes.night_mode)
    ));
    out.push_str(&format!("\n{}", state.last_notification));
    out
}

/// Per-room and per-device detail, as shown on the control page.
pub(super) fn format_controls(state: &HomeState) -> String {
    let mut out = String::new();
    for room in Room::ALL {
        out.push_str(&format!(
            "luz {:<10} {}\n",
            room.as_str(),
            on_off(state.lights.get(room))
        ));
    }
    out.push_str(&format!("luz {:<10} {}\n", "all", on_off(state.lights.all)));
    for device in Device::ALL {
        out.push_str(&format!(
            "{:<14} {}\n",
            device.as_str(),
            on_off(state.devices.get(device))
        ));
    }
    out
}

/// One transcript line: `[HH:MM] Sender: message`.
pub(super) fn format_message(msg: &ChatMessage, tz: &TimeZone) -> String {
    let who = match msg.sender {
        Sender::User => "Tú",
        Sender::Assistant => "NexusIA",
    };
    let time = msg.sent_at.to_zoned(tz.clone()).strftime("%H:%M");
    format!("[{time}] {who}: {}", msg.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    #[test]
    fn greeting_by_hour() {
        assert_eq!(greeting(0), "Buenos días");
        assert_eq!(greeting(11), "Buenos días");
        assert_eq!(greeting(12), "Buenas tardes");
        assert_eq!(greeting(17), "Buenas tardes");
        assert_eq!(greeting(18), "Buenas noches");
        assert_eq!(greeting(23), "Buenas noches");
    }

    #[test]
    fn status_counts_rooms_not_all_flag() {
        let mut state = HomeState::default();
        state.lights.all = true;

        let status = format_status(&state, 9);

        assert!(status.starts_with("Buenos días, Usuario"));
        assert!(status.contains("1/4 encendidas"));
        assert!(status.contains("puerta abierta"));
        assert!(status.ends_with("Sistema funcionando correctamente"));
    }

    #[test]
    fn controls_list_every_room_and_device() {
        let controls = format_controls(&HomeState::default());

        assert!(controls.contains("luz living     encendido"));
        assert!(controls.contains("luz kitchen    apagado"));
        assert!(controls.contains("smart_plugs    encendido"));
    }

    #[test]
    fn message_line_uses_local_time() {
        let msg = ChatMessage {
            sender: Sender::Assistant,
            message: "¡Hola!".into(),
            sent_at: Timestamp::new(1_700_000_000, 0).unwrap(),
        };

        assert_eq!(format_message(&msg, &TimeZone::UTC), "[22:13] NexusIA: ¡Hola!");
    }
}
