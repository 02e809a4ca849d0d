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

use crossterm::event::KeyCode;

use crate::{
    binding::{KeyBinding, KeyHolder},
    page::{Page, Pages},
};

/// The built-in page selection commands.
///
/// The number keys `0` to `4` activate a page from anywhere, `0` switching
/// every page off.
#[derive(Debug, Clone)]
pub struct PageSelector {
    pages: Pages,
}

impl PageSelector {
    pub fn new(pages: Pages) -> Self {
        Self { pages }
    }

    fn select(&self, id: &str, key: char, page: Page) -> KeyBinding {
        let pages = self.pages.clone();
        KeyBinding::new(Page::PageSelection, id, KeyCode::Char(key), move || {
            pages.set_active(page);
            Ok(())
        })
    }
}

impl KeyHolder for PageSelector {
    fn key_bindings(&self) -> Vec<KeyBinding> {
        vec![
            self.select("DeactivateAllKeyControls", '0', Page::None),
            self.select("SetDevActive", '1', Page::Dev),
            self.select("SetSceneActive", '2', Page::Scene),
            self.select("SetUIActive", '3', Page::Ui).label("Set UI Active"),
            self.select("SetAudioActive", '4', Page::Audio),
        ]
    }
}
