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

//! Registration records.
//!
//! Calling code describes its commands with [`KeyBinding`]s, either one at a
//! time or as a set supplied by a [`KeyHolder`]. The engine turns each binding
//! into a [`KeyToken`] when it is registered.

use std::any::type_name;

use crossterm::event::KeyCode;

use crate::{
    page::Page,
    token::{Action, KeyToken},
    trigger::{KeyCombo, Trigger},
    util::format::{friendly_format, short_type_name},
};

/// A command waiting to be registered.
pub struct KeyBinding {
    id: String,
    page: Page,
    trigger: Trigger,
    label: Option<String>,
    action: Action,
}

impl KeyBinding {
    /// Creates a binding fired by `key` with no modifiers held.
    ///
    /// The display label is derived from `id` with
    /// [`friendly_format`] unless overridden with [`label`](Self::label).
    pub fn new(
        page: Page,
        id: impl Into<String>,
        key: KeyCode,
        action: impl FnMut() -> anyhow::Result<()> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            page,
            trigger: Trigger::new(key),
            label: None,
            action: Box::new(action),
        }
    }

    /// Requires every key in `keys` to be held when the primary key is
    /// pressed.
    pub fn combo(mut self, keys: impl Into<Vec<KeyCode>>) -> Self {
        self.trigger = Trigger::with_combo(self.trigger.key(), KeyCombo::new(keys));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| friendly_format(&self.id))
    }

    pub(crate) fn into_token(self, source_type: &str) -> KeyToken {
        let label = self.display_label();
        KeyToken::new(self.page, label, self.trigger, self.action).with_source_type(source_type)
    }
}

/// A type that supplies a set of commands.
///
/// Holders are registered with
/// [`KeyMaster::register_keyholder`](crate::KeyMaster::register_keyholder).
/// Actions usually capture shared handles (`Rc<Cell<_>>`, [`Pages`](crate::Pages)
/// and so on) to the state they change.
pub trait KeyHolder {
    fn key_bindings(&self) -> Vec<KeyBinding>;

    /// The name shown next to this holder's commands in key maps.
    fn source_type(&self) -> &'static str {
        short_type_name(type_name::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use crate::trigger::modifiers::{LEFT_ALT, LEFT_SHIFT};

    use super::*;

    struct AudioTriggers;

    impl KeyHolder for AudioTriggers {
        fn key_bindings(&self) -> Vec<KeyBinding> {
            vec![KeyBinding::new(Page::Audio, "PlayBgMusic", KeyCode::Char('b'), || Ok(()))]
        }
    }

    #[test]
    fn derives_the_label_from_the_id() {
        let binding = KeyBinding::new(Page::Dev, "ToggleConsoleOutput", KeyCode::Char('b'), || Ok(()));
        assert_eq!(binding.display_label(), "Toggle Console Output");

        let binding = binding.label("Console");
        assert_eq!(binding.display_label(), "Console");
    }

    #[test]
    fn combo_keeps_the_primary_key() {
        let binding = KeyBinding::new(Page::Dev, "KeyComboExample", KeyCode::Char('e'), || Ok(()))
            .combo([LEFT_ALT, LEFT_SHIFT]);

        assert_eq!(binding.trigger().key(), KeyCode::Char('e'));
        assert_eq!(
            binding.trigger().combo().map(KeyCombo::keys),
            Some(&[LEFT_ALT, LEFT_SHIFT][..])
        );
    }

    #[test]
    fn holder_source_type_is_the_short_type_name() {
        let holder = AudioTriggers;
        assert_eq!(holder.source_type(), "AudioTriggers");

        let token = holder
            .key_bindings()
            .remove(0)
            .into_token(holder.source_type());
        assert_eq!(token.label(), "Play Bg Music");
        assert_eq!(token.source_type(), "AudioTriggers");
    }
}
