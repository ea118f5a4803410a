//! Home state: preferences plus the simulated devices and environment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// The single persisted document describing the home.
///
/// Field names follow the persisted JSON layout, so documents written by
/// earlier sessions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeState {
    pub user_name: String,
    pub is_dark_mode: bool,
    pub notifications: bool,
    pub lights: Lights,
    pub temperature: Temperature,
    pub security: Security,
    pub energy: Energy,
    pub devices: Devices,
    pub modes: Modes,
    pub chat_history: Vec<ChatMessage>,
    pub last_notification: String,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            user_name: "Usuario".into(),
            is_dark_mode: false,
            notifications: true,
            lights: Lights {
                living: true,
                kitchen: false,
                bedroom: false,
                bathroom: false,
                all: false,
            },
            temperature: Temperature {
                current: 23,
                target: 21,
                air_conditioning_on: true,
            },
            security: Security {
                armed: false,
                door_open: true,
                motion_detected: false,
            },
            energy: Energy {
                consumed: 12.4,
                efficiency: "Eficiente".into(),
            },
            devices: Devices {
                connected: 8,
                tv: true,
                speakers: false,
                smart_plugs: true,
            },
            modes: Modes::default(),
            chat_history: Vec::new(),
            last_notification: "Sistema funcionando correctamente".into(),
        }
    }
}

/// Light flags per room.
///
/// `all` is a stored convenience flag. Toggling it drives the four rooms;
/// toggling a single room leaves it alone, so it can disagree with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lights {
    pub living: bool,
    pub kitchen: bool,
    pub bedroom: bool,
    pub bathroom: bool,
    pub all: bool,
}

impl Lights {
    /// Every flag, including `all`, set to `on`.
    pub fn uniform(on: bool) -> Self {
        Self {
            living: on,
            kitchen: on,
            bedroom: on,
            bathroom: on,
            all: on,
        }
    }

    /// The night mode preset: only the bedroom stays lit.
    pub fn night_preset() -> Self {
        Self {
            bedroom: true,
            ..Self::uniform(false)
        }
    }

    pub fn get(&self, room: Room) -> bool {
        match room {
            Room::Living => self.living,
            Room::Kitchen => self.kitchen,
            Room::Bedroom => self.bedroom,
            Room::Bathroom => self.bathroom,
        }
    }

    fn slot(&mut self, room: Room) -> &mut bool {
        match room {
            Room::Living => &mut self.living,
            Room::Kitchen => &mut self.kitchen,
            Room::Bedroom => &mut self.bedroom,
            Room::Bathroom => &mut self.bathroom,
        }
    }

    /// Flips one room. `all` is not recomputed.
    pub fn toggle(&mut self, room: Room) {
        let slot = self.slot(room);
        *slot = !*slot;
    }

    /// Number of rooms currently lit, derived from the room flags only.
    pub fn rooms_on(&self) -> usize {
        Room::ALL.iter().filter(|r| self.get(**r)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    /// Simulated sensor reading, never written after initialization.
    pub current: i32,
    pub target: i32,
    pub air_conditioning_on: bool,
}

impl Temperature {
    pub const MIN_TARGET: i32 = 16;
    pub const MAX_TARGET: i32 = 30;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub armed: bool,
    pub door_open: bool,
    pub motion_detected: bool,
}

/// Display-only energy figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    /// Kilowatt-hours consumed today.
    pub consumed: f64,
    pub efficiency: String,
}

/// Connected devices. `connected` is a static figure, not a count of the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Devices {
    pub connected: u32,
    pub tv: bool,
    pub speakers: bool,
    pub smart_plugs: bool,
}

impl Devices {
    pub fn get(&self, device: Device) -> bool {
        match device {
            Device::Tv => self.tv,
            Device::Speakers => self.speakers,
            Device::SmartPlugs => self.smart_plugs,
        }
    }

    pub fn toggle(&mut self, device: Device) {
        let slot = match device {
            Device::Tv => &mut self.tv,
            Device::Speakers => &mut self.speakers,
            Device::SmartPlugs => &mut self.smart_plugs,
        };
        *slot = !*slot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modes {
    pub night_mode: bool,
    pub away_mode: bool,
}

/// A room with its own light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Living,
    Kitchen,
    Bedroom,
    Bathroom,
}

impl Room {
    pub const ALL: [Room; 4] = [Room::Living, Room::Kitchen, Room::Bedroom, Room::Bathroom];

    pub fn as_str(self) -> &'static str {
        match self {
            Room::Living => "living",
            Room::Kitchen => "kitchen",
            Room::Bedroom => "bedroom",
            Room::Bathroom => "bathroom",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A room name that matches no known room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown room: {0}")]
pub struct UnknownRoom(pub String);

impl FromStr for Room {
    type Err = UnknownRoom;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Room::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRoom(s.to_string()))
    }
}

/// A switchable device other than lights and climate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Tv,
    Speakers,
    SmartPlugs,
}

impl Device {
    pub const ALL: [Device; 3] = [Device::Tv, Device::Speakers, Device::SmartPlugs];

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Tv => "tv",
            Device::Speakers => "speakers",
            Device::SmartPlugs => "smart_plugs",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device name that matches no known device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device: {0}")]
pub struct UnknownDevice(pub String);

impl FromStr for Device {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Device::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDevice(s.to_string()))
    }
}
