//! The home store: single source of truth for the session.
//!
//! Every mutation runs to completion, then the whole document is persisted
//! and every observer is called with the new state. Observers are called
//! synchronously, in subscription order, with no field-level filtering.
//!
//! If the backing storage fails, the store logs one warning and keeps
//! going in memory for the rest of the session.

use jiff::Timestamp;
use tracing::{debug, info, warn};

use crate::model::{
    ChatMessage, Device, HomeState, Lights, Room, Sender, UnknownDevice, UnknownRoom,
};
use crate::storage::{Storage, StorageError};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    UnknownDevice(#[from] UnknownDevice),

    #[error(transparent)]
    UnknownRoom(#[from] UnknownRoom),

    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Handle returned by [`HomeStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&HomeState)>;

/// Owns the [`HomeState`] and its persistence.
pub struct HomeStore {
    state: HomeState,
    storage: Option<Storage>,
    /// Maximum transcript length; `0` keeps everything.
    history_limit: usize,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl HomeStore {
    /// Opens the store, rehydrating from `storage` when a document exists.
    ///
    /// A document that cannot be read leaves the store in memory-only mode
    /// with the default state, so the unreadable file is never overwritten.
    pub fn open(storage: Storage, history_limit: usize) -> Self {
        let (state, storage) = match storage.load_home() {
            Ok(Some(state)) => {
                info!(path = %storage.document_path().display(), "loaded home document");
                (state, Some(storage))
            }
            Ok(None) => {
                info!("no saved home document, starting from defaults");
                (HomeState::default(), Some(storage))
            }
            Err(e) => {
                warn!(
                    path = %storage.document_path().display(),
                    "{}; continuing in memory",
                    StoreError::from(e)
                );
                (HomeState::default(), None)
            }
        };
        Self::with_state(state, storage, history_limit)
    }

    /// A store that never touches disk.
    pub fn in_memory(history_limit: usize) -> Self {
        Self::with_state(HomeState::default(), None, history_limit)
    }

    fn with_state(state: HomeState, storage: Option<Storage>, history_limit: usize) -> Self {
        Self {
            state,
            storage,
            history_limit,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &HomeState {
        &self.state
    }

    /// Whether mutations are still being written to disk.
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    // ── Observers ──

    /// Registers an observer called with the full state after every mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(&HomeState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    // ── Preferences ──

    pub fn set_user_name(&mut self, name: &str) {
        self.mutate("set_user_name", |s| s.user_name = name.to_string());
    }

    pub fn toggle_dark_mode(&mut self) {
        self.mutate("toggle_dark_mode", |s| s.is_dark_mode = !s.is_dark_mode);
    }

    pub fn toggle_notifications(&mut self) {
        self.mutate("toggle_notifications", |s| {
            s.notifications = !s.notifications;
        });
    }

    // ── Lights ──

    /// Flips one room's light. The `all` flag is not recomputed.
    pub fn toggle_light(&mut self, room: &str) -> Result<()> {
        let room: Room = room.parse()?;
        self.mutate("toggle_light", |s| s.lights.toggle(room));
        Ok(())
    }

    /// Flips `all` and forces every room to match it.
    pub fn toggle_all_lights(&mut self) {
        self.mutate("toggle_all_lights", |s| {
            s.lights = Lights::uniform(!s.lights.all);
        });
    }

    /// Sets `all` and every room to `on`, whatever they were before.
    pub fn set_all_lights(&mut self, on: bool) {
        self.mutate("set_all_lights", |s| s.lights = Lights::uniform(on));
    }

    // ── Climate ──

    /// Overwrites the target temperature. Range checks belong to the caller.
    pub fn set_target_temperature(&mut self, value: i32) {
        self.mutate("set_target_temperature", |s| s.temperature.target = value);
    }

    pub fn toggle_air_conditioning(&mut self) {
        self.mutate("toggle_air_conditioning", |s| {
            s.temperature.air_conditioning_on = !s.temperature.air_conditioning_on;
        });
    }

    // ── Security and modes ──

    /// Flips `armed`. Arming closes the door, disarming opens it.
    pub fn toggle_security(&mut self) {
        self.mutate("toggle_security", |s| {
            s.security.armed = !s.security.armed;
            s.security.door_open = !s.security.armed;
        });
    }

    /// Arms security and closes the door, whatever the prior state.
    pub fn arm_security(&mut self) {
        self.mutate("arm_security", |s| {
            s.security.armed = true;
            s.security.door_open = false;
        });
    }

    /// Flips night mode. Entering it applies the night light preset;
    /// leaving it keeps the lights as they are.
    pub fn toggle_night_mode(&mut self) {
        self.mutate("toggle_night_mode", |s| {
            s.modes.night_mode = !s.modes.night_mode;
            if s.modes.night_mode {
                s.lights = Lights::night_preset();
            }
        });
    }

    // ── Devices ──

    pub fn toggle_device(&mut self, name: &str) -> Result<()> {
        let device: Device = name.parse()?;
        self.mutate("toggle_device", |s| s.devices.toggle(device));
        Ok(())
    }

    /// Switches off lights, TV, speakers and air conditioning.
    ///
    /// Security, smart plugs, the connected count and the target
    /// temperature are left alone.
    pub fn turn_off_all_devices(&mut self) {
        self.mutate("turn_off_all_devices", |s| set_everything(s, false));
    }

    /// Switches on lights, TV, speakers and air conditioning.
    pub fn turn_on_all_devices(&mut self) {
        self.mutate("turn_on_all_devices", |s| set_everything(s, true));
    }

    // ── Chat ──

    /// Appends a message stamped with the current time.
    ///
    /// When a history limit is set, the oldest messages are dropped to stay
    /// within it.
    pub fn append_chat_message(&mut self, sender: Sender, text: &str) {
        let limit = self.history_limit;
        self.mutate("append_chat_message", |s| {
            s.chat_history.push(ChatMessage {
                sender,
                message: text.to_string(),
                sent_at: Timestamp::now(),
            });
            if limit > 0 && s.chat_history.len() > limit {
                let excess = s.chat_history.len() - limit;
                s.chat_history.drain(..excess);
            }
        });
    }

    pub fn clear_chat_history(&mut self) {
        self.mutate("clear_chat_history", |s| s.chat_history.clear());
    }

    pub fn set_last_notification(&mut self, text: &str) {
        self.mutate("set_last_notification", |s| {
            s.last_notification = text.to_string();
        });
    }

    fn mutate(&mut self, op: &'static str, f: impl FnOnce(&mut HomeState)) {
        f(&mut self.state);
        debug!(op, "home state mutated");
        self.persist();
        for (_, observer) in &mut self.observers {
            observer(&self.state);
        }
    }

    fn persist(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.save_home(&self.state) {
            warn!("{}; continuing in memory", StoreError::from(e));
            self.storage = None;
        }
    }
}

fn set_everything(s: &mut HomeState, on: bool) {
    s.lights = Lights::uniform(on);
    s.devices.tv = on;
    s.devices.speakers = on;
    s.temperature.air_conditioning_on = on;
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    use tempfile::TempDir;

    fn store() -> HomeStore {
        HomeStore::in_memory(0)
    }

    fn disk_store() -> (TempDir, HomeStore) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("nexus")).unwrap();
        (dir, HomeStore::open(storage, 0))
    }

    #[test]
    fn toggle_all_lights_forces_every_room() {
        let mut store = store();
        store.toggle_all_lights();

        assert_eq!(store.state().lights, Lights::uniform(true));

        store.toggle_all_lights();
        assert_eq!(store.state().lights, Lights::uniform(false));
    }

    #[test]
    fn toggle_all_lights_twice_restores_uniform_state() {
        let mut store = store();
        store.set_all_lights(true);
        let before = store.state().lights;

        store.toggle_all_lights();
        store.toggle_all_lights();

        assert_eq!(store.state().lights, before);
    }

    #[test]
    fn toggle_light_does_not_recompute_all() {
        let mut store = store();
        store.toggle_light("kitchen").unwrap();
        store.toggle_light("bedroom").unwrap();
        store.toggle_light("bathroom").unwrap();

        let lights = store.state().lights;
        assert_eq!(lights.rooms_on(), 4);
        assert!(!lights.all);
    }

    #[test]
    fn unknown_room_is_rejected_without_mutation() {
        let mut store = store();
        let before = store.state().clone();

        let err = store.toggle_light("garage").unwrap_err();

        assert!(matches!(err, StoreError::UnknownRoom(_)));
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn simple_flags_flip() {
        let mut store = store();
        store.toggle_air_conditioning();
        store.toggle_notifications();

        assert!(!store.state().temperature.air_conditioning_on);
        assert!(!store.state().notifications);
    }

    #[test]
    fn arming_closes_door_and_disarming_opens_it() {
        let mut store = store();
        assert!(!store.state().security.armed);

        store.toggle_security();
        assert!(store.state().security.armed);
        assert!(!store.state().security.door_open);

        store.toggle_security();
        assert!(!store.state().security.armed);
        assert!(store.state().security.door_open);
    }

    #[test]
    fn arm_security_is_idempotent() {
        let mut store = store();
        store.arm_security();
        store.arm_security();

        assert!(store.state().security.armed);
        assert!(!store.state().security.door_open);
    }

    #[test]
    fn entering_night_mode_applies_preset() {
        let mut store = store();
        store.turn_on_all_devices();

        store.toggle_night_mode();

        assert!(store.state().modes.night_mode);
        assert_eq!(store.state().lights, Lights::night_preset());
    }

    #[test]
    fn leaving_night_mode_keeps_lights() {
        let mut store = store();
        store.toggle_night_mode();
        store.toggle_light("kitchen").unwrap();
        let lights = store.state().lights;

        store.toggle_night_mode();

        assert!(!store.state().modes.night_mode);
        assert_eq!(store.state().lights, lights);
    }

    #[test]
    fn toggle_device_flips_named_device() {
        let mut store = store();
        assert!(!store.state().devices.speakers);

        store.toggle_device("speakers").unwrap();
        assert!(store.state().devices.speakers);
    }

    #[test]
    fn unknown_device_is_rejected() {
        let mut store = store();
        let err = store.toggle_device("fridge").unwrap_err();
        assert!(matches!(err, StoreError::UnknownDevice(_)));
    }

    #[test]
    fn turn_off_all_leaves_security_and_target_alone() {
        let mut store = store();
        store.toggle_security();
        store.set_target_temperature(27);

        store.turn_off_all_devices();

        let s = store.state();
        assert_eq!(s.lights, Lights::uniform(false));
        assert!(!s.devices.tv && !s.devices.speakers);
        assert!(!s.temperature.air_conditioning_on);
        assert!(s.security.armed);
        assert_eq!(s.temperature.target, 27);
        assert_eq!(s.devices.connected, 8);
        assert!(s.devices.smart_plugs);
    }

    #[test]
    fn turn_on_after_off_resets_to_all_on() {
        let mut store = store();
        store.toggle_device("tv").unwrap();
        store.toggle_light("kitchen").unwrap();

        store.turn_off_all_devices();
        store.turn_on_all_devices();

        let s = store.state();
        assert_eq!(s.lights, Lights::uniform(true));
        assert!(s.devices.tv && s.devices.speakers);
        assert!(s.temperature.air_conditioning_on);
    }

    #[test]
    fn chat_messages_keep_call_order() {
        let mut store = store();
        for i in 0..5 {
            store.append_chat_message(Sender::User, &format!("mensaje {i}"));
        }

        let history = &store.state().chat_history;
        assert_eq!(history.len(), 5);
        for (i, msg) in history.iter().enumerate() {
            assert_eq!(msg.message, format!("mensaje {i}"));
        }
        assert!(history.windows(2).all(|w| w[0].sent_at <= w[1].sent_at));
    }

    #[test]
    fn history_limit_drops_oldest() {
        let mut store = HomeStore::in_memory(3);
        for i in 0..5 {
            store.append_chat_message(Sender::User, &i.to_string());
        }

        let messages: Vec<_> = store
            .state()
            .chat_history
            .iter()
            .map(|m| m.message.as_str())
            .collect();
        assert_eq!(messages, ["2", "3", "4"]);
    }

    #[test]
    fn observers_run_once_per_mutation() {
        let mut store = store();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let id = store.subscribe(move |_| seen.set(seen.get() + 1));

        store.toggle_dark_mode();
        store.set_last_notification("hola");
        assert_eq!(calls.get(), 2);

        assert!(store.unsubscribe(id));
        store.toggle_dark_mode();
        assert_eq!(calls.get(), 2);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn observers_see_post_mutation_state() {
        let mut store = store();
        let armed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&armed);
        store.subscribe(move |s| seen.set(s.security.armed));

        store.toggle_security();
        assert!(armed.get());
    }

    #[test]
    fn mutations_are_persisted_and_rehydrated() {
        let (dir, mut store) = disk_store();
        store.set_user_name("Marta");
        store.append_chat_message(Sender::User, "hola");

        let reopened = HomeStore::open(Storage::new(dir.path().join("nexus")).unwrap(), 0);

        assert!(reopened.is_persistent());
        assert_eq!(reopened.state(), store.state());
    }

    #[test]
    fn unreadable_document_degrades_to_memory() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        fs::write(storage.document_path(), "garbage").unwrap();

        let mut store = HomeStore::open(storage, 0);
        assert!(!store.is_persistent());
        assert_eq!(store.state(), &HomeState::default());

        store.toggle_dark_mode();
        assert!(store.state().is_dark_mode);
        let on_disk = fs::read_to_string(dir.path().join("home.json")).unwrap();
        assert_eq!(on_disk, "garbage");
    }

    #[test]
    fn failed_write_degrades_to_memory() {
        let (dir, mut store) = disk_store();
        fs::remove_dir_all(dir.path().join("nexus")).unwrap();

        store.toggle_dark_mode();

        assert!(!store.is_persistent());
        assert!(store.state().is_dark_mode);
    }
}
