//! Core data model for Nexus Home.
//!
//! The home document and its parts, plus the chat transcript it carries.

mod chat;
mod home;

pub use chat::{ChatMessage, Sender};
pub use home::{Device, HomeState, Lights, Room, Temperature, UnknownDevice, UnknownRoom};
