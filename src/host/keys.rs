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

//! Terminal key state.
//!
//! Most terminals never report modifier keys on their own, only as flags on
//! the key they modify. Those flags are latched as the left-hand modifier for
//! the frame the key arrives in. Terminals with the keyboard enhancement
//! protocol also report modifier presses and releases, which are tracked as
//! held keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keymaster::{
    KeyState,
    modifiers::{LEFT_ALT, LEFT_CONTROL, LEFT_SHIFT},
};

#[derive(Debug, Default)]
pub(crate) struct TerminalKeys {
    state: KeyState,
}

impl TerminalKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &KeyState {
        &self.state
    }

    pub fn handle(&mut self, key: KeyEvent) {
        match (key.kind, key.code) {
            (KeyEventKind::Press, KeyCode::Modifier(_)) => self.state.hold(key.code),
            (KeyEventKind::Release, KeyCode::Modifier(_)) => self.state.release(key.code),
            (KeyEventKind::Press, code) => {
                for (flag, modifier) in [
                    (KeyModifiers::SHIFT, LEFT_SHIFT),
                    (KeyModifiers::CONTROL, LEFT_CONTROL),
                    (KeyModifiers::ALT, LEFT_ALT),
                ] {
                    if key.modifiers.contains(flag) {
                        self.state.latch(modifier);
                    }
                }
                self.state.press(normalize(code));
            }
            _ => {}
        }
    }

    pub fn end_frame(&mut self) {
        self.state.end_frame();
    }
}

// Shifted letters arrive upper-cased; bindings use the unshifted key.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use keymaster::{KeyCombo, Trigger, TriggerSource};

    use super::*;

    #[test]
    fn shifted_letters_latch_the_modifier() {
        let mut keys = TerminalKeys::new();
        keys.handle(KeyEvent::new(
            KeyCode::Char('E'),
            KeyModifiers::SHIFT | KeyModifiers::ALT,
        ));

        let combo = Trigger::with_combo(KeyCode::Char('e'), KeyCombo::shift_alt_left());
        let plain = Trigger::new(KeyCode::Char('e'));
        assert!(combo.allow(keys.state()));
        assert!(!plain.allow(keys.state()));

        keys.end_frame();
        assert!(!keys.state().is_held(LEFT_SHIFT));
    }

    #[test]
    fn enhanced_modifier_events_are_held_until_released() {
        let mut keys = TerminalKeys::new();
        keys.handle(KeyEvent::new(LEFT_SHIFT, KeyModifiers::NONE));
        keys.end_frame();
        assert!(keys.state().is_held(LEFT_SHIFT));

        keys.handle(KeyEvent::new_with_kind(
            LEFT_SHIFT,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert!(!keys.state().is_held(LEFT_SHIFT));
    }
}
