// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Key triggers.
//!
//! A [`Trigger`] decides whether a command fires on the current frame. It
//! queries a [`TriggerSource`] in two distinct ways: the primary key must be
//! *just pressed* (a single-frame edge), while combo keys must be *held*.
//!
//! A trigger without a combo refuses to fire while any reserved modifier is
//! held. This lets the same primary key be bound once on its own and again
//! with a combo, without one physical press firing both commands.

use std::{collections::HashSet, fmt};

use crossterm::event::{KeyCode, ModifierKeyCode};

/// The host's view of key state for the current frame.
pub trait TriggerSource {
    /// `true` only on the frame the key went down.
    fn is_just_active(&self, key: KeyCode) -> bool;

    /// `true` for every frame the key is down.
    fn is_held(&self, key: KeyCode) -> bool;
}

/// Modifier key identifiers.
pub mod modifiers {
    use crossterm::event::{KeyCode, ModifierKeyCode};

    pub const LEFT_SHIFT: KeyCode = KeyCode::Modifier(ModifierKeyCode::LeftShift);
    pub const LEFT_CONTROL: KeyCode = KeyCode::Modifier(ModifierKeyCode::LeftControl);
    pub const LEFT_ALT: KeyCode = KeyCode::Modifier(ModifierKeyCode::LeftAlt);
    pub const RIGHT_SHIFT: KeyCode = KeyCode::Modifier(ModifierKeyCode::RightShift);
    pub const RIGHT_CONTROL: KeyCode = KeyCode::Modifier(ModifierKeyCode::RightControl);
    pub const RIGHT_ALT: KeyCode = KeyCode::Modifier(ModifierKeyCode::RightAlt);

    /// Reserved modifiers that veto triggers configured without a combo.
    pub const ALL: [KeyCode; 6] = [
        LEFT_SHIFT,
        LEFT_ALT,
        LEFT_CONTROL,
        RIGHT_SHIFT,
        RIGHT_ALT,
        RIGHT_CONTROL,
    ];
}

/// An ordered group of keys that must be held together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    keys: Vec<KeyCode>,
}

impl KeyCombo {
    pub fn new(keys: impl Into<Vec<KeyCode>>) -> Self {
        Self { keys: keys.into() }
    }

    pub fn shift_ctrl_left() -> Self {
        Self::new([modifiers::LEFT_SHIFT, modifiers::LEFT_CONTROL])
    }

    pub fn shift_alt_left() -> Self {
        Self::new([modifiers::LEFT_SHIFT, modifiers::LEFT_ALT])
    }

    pub fn ctrl_alt_left() -> Self {
        Self::new([modifiers::LEFT_CONTROL, modifiers::LEFT_ALT])
    }

    pub fn shift_ctrl_alt_left() -> Self {
        Self::new([
            modifiers::LEFT_SHIFT,
            modifiers::LEFT_ALT,
            modifiers::LEFT_CONTROL,
        ])
    }

    /// Every reserved modifier, left and right.
    pub fn all_modifiers() -> Self {
        Self::new(modifiers::ALL)
    }

    pub fn keys(&self) -> &[KeyCode] {
        &self.keys
    }

    /// `true` when every key of the combo is held.
    pub fn is_held(&self, source: &dyn TriggerSource) -> bool {
        self.keys.iter().all(|key| source.is_held(*key))
    }

    /// `true` when at least one key of the combo is held.
    pub fn is_any_held(&self, source: &dyn TriggerSource) -> bool {
        self.keys.iter().any(|key| source.is_held(*key))
    }
}

/// The condition under which a command fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    key: KeyCode,
    combo: Option<KeyCombo>,
}

impl Trigger {
    pub fn new(key: KeyCode) -> Self {
        Self { key, combo: None }
    }

    pub fn with_combo(key: KeyCode, combo: KeyCombo) -> Self {
        Self {
            key,
            combo: Some(combo),
        }
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn combo(&self) -> Option<&KeyCombo> {
        self.combo.as_ref()
    }

    /// Whether the trigger fires on the current frame.
    pub fn allow(&self, source: &dyn TriggerSource) -> bool {
        if self.key == KeyCode::Null || !source.is_just_active(self.key) {
            return false;
        }

        match &self.combo {
            Some(combo) => combo.is_held(source),
            None => !modifiers::ALL.iter().any(|key| source.is_held(*key)),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(combo) = &self.combo {
            for key in combo.keys() {
                write!(f, "{}+", key_name(*key))?;
            }
        }
        f.write_str(&key_name(self.key))
    }
}

/// Short display name for a key, as shown in key maps and diagnostics.
pub fn key_name(key: KeyCode) -> String {
    match key {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_uppercase().collect(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift => "LShift",
            ModifierKeyCode::LeftControl => "LCtrl",
            ModifierKeyCode::LeftAlt => "LAlt",
            ModifierKeyCode::RightShift => "RShift",
            ModifierKeyCode::RightControl => "RCtrl",
            ModifierKeyCode::RightAlt => "RAlt",
            other => return format!("{other:?}"),
        }
        .to_string(),
        other => format!("{other:?}"),
    }
}

/// Frame-based key state, usable as a [`TriggerSource`].
///
/// Keys reported with [`press`](Self::press) are just active until the next
/// [`end_frame`](Self::end_frame) and count as held for that frame. Keys
/// reported with [`hold`](Self::hold) stay held until released, which suits
/// backends that report key releases.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    pressed: HashSet<KeyCode>,
    latched: HashSet<KeyCode>,
    held: HashSet<KeyCode>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
        self.latched.insert(key);
    }

    /// Marks a key as held for the current frame only.
    pub fn latch(&mut self, key: KeyCode) {
        self.latched.insert(key);
    }

    pub fn hold(&mut self, key: KeyCode) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.latched.clear();
    }
}

impl TriggerSource for KeyState {
    fn is_just_active(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key) || self.latched.contains(&key)
    }
}
