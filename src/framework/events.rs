use std::any::Any;
use std::fmt;

use super::frame::ComponentId;

/// Payload passed to an event handler.
pub trait EventArgs: Any + Send + Sync + fmt::Debug {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmptyEventArgs;

impl EventArgs for EmptyEventArgs {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseEventArgs {
    pub detail: i64,
    pub client_x: f64,
    pub client_y: f64,
    pub button: i64,
    pub buttons: i64,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

impl EventArgs for MouseEventArgs {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEventArgs {
    pub value: String,
}

impl ChangeEventArgs {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl EventArgs for ChangeEventArgs {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardEventArgs {
    pub key: String,
    pub code: String,
    pub repeat: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

impl KeyboardEventArgs {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }
}

impl EventArgs for KeyboardEventArgs {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusEventArgs {
    pub event_type: String,
}

impl EventArgs for FocusEventArgs {}

/// Keeps a component's last rendered `value` attribute in step with a value
/// the user typed, so the next diff compares against what the element shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFieldInfo {
    pub component_id: ComponentId,
    pub field_value: String,
}
