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

//! Control pages and page activation.
//!
//! Commands are grouped into mutually exclusive [`Page`]s. The [`Pages`]
//! handle holds the currently active page and notifies listeners whenever it
//! changes.

use std::{cell::RefCell, fmt, rc::Rc};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::UnknownPage;

/// A group of commands, only one of which is active at a time.
///
/// The integer values are part of the remote wire protocol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum Page {
    /// No domain page is active, only page selection commands are live.
    #[default]
    None,
    /// Always evaluated, regardless of the active page.
    PageSelection,
    Dev,
    Scene,
    Ui,
    Audio,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::None,
        Page::PageSelection,
        Page::Dev,
        Page::Scene,
        Page::Ui,
        Page::Audio,
    ];

    pub const fn value(self) -> i64 {
        match self {
            Page::None => 0,
            Page::PageSelection => 1,
            Page::Dev => 2,
            Page::Scene => 3,
            Page::Ui => 4,
            Page::Audio => 5,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Page::None => "None",
            Page::PageSelection => "Page Selection",
            Page::Dev => "Dev",
            Page::Scene => "Scene",
            Page::Ui => "UI",
            Page::Audio => "Audio",
        }
    }
}

impl TryFrom<i64> for Page {
    type Error = UnknownPage;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Page::ALL
            .into_iter()
            .find(|page| page.value() == value)
            .ok_or(UnknownPage(value))
    }
}

impl From<Page> for i64 {
    fn from(page: Page) -> Self {
        page.value()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback invoked with the new page on every page activation.
///
/// Listeners are compared by identity, so keep a clone of the `Rc` to remove
/// one later.
pub type PageListener = Rc<dyn Fn(Page)>;

#[derive(Default)]
struct PageState {
    current: Page,
    previous: Page,
    listeners: Vec<PageListener>,
}

/// Shared handle to the page activation state.
///
/// Clones refer to the same state, which lets actions (for example the page
/// selection commands) switch pages without borrowing the engine.
#[derive(Clone, Default)]
pub struct Pages {
    state: Rc<RefCell<PageState>>,
}

impl Pages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.state.borrow().current
    }

    pub fn previous(&self) -> Page {
        self.state.borrow().previous
    }

    /// Makes `page` the active page.
    ///
    /// Does nothing when `page` is already active. Otherwise every listener is
    /// notified once, in registration order, after the state has been
    /// updated. Listeners may activate another page themselves.
    ///
    /// Returns `true` if the active page changed.
    pub fn set_active(&self, page: Page) -> bool {
        let listeners = {
            let mut state = self.state.borrow_mut();
            if state.current == page {
                return false;
            }
            state.previous = state.current;
            state.current = page;
            state.listeners.clone()
        };

        info!(%page, "control page activated");

        for listener in &listeners {
            listener(page);
        }
        true
    }

    /// Adds a listener, returning `false` if it was already registered.
    pub fn add_listener(&self, listener: PageListener) -> bool {
        let mut state = self.state.borrow_mut();
        if state.listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return false;
        }
        state.listeners.push(listener);
        true
    }

    /// Removes a listener, returning `false` if it was not registered.
    pub fn remove_listener(&self, listener: &PageListener) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        state.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }
}

impl fmt::Debug for Pages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Pages")
            .field("current", &state.current)
            .field("previous", &state.previous)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<(u8, Page)>>>, tag: u8) -> PageListener {
        let log = Rc::clone(log);
        Rc::new(move |page| log.borrow_mut().push((tag, page)))
    }

    #[test]
    fn starts_on_none() {
        let pages = Pages::new();
        assert_eq!(pages.current(), Page::None);
        assert_eq!(pages.previous(), Page::None);
    }

    #[test]
    fn activating_the_current_page_is_a_no_op() {
        let pages = Pages::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        pages.add_listener(recorder(&log, 0));

        pages.set_active(Page::Dev);
        log.borrow_mut().clear();

        assert!(!pages.set_active(Page::Dev));
        assert!(log.borrow().is_empty());
        assert_eq!(pages.current(), Page::Dev);
        assert_eq!(pages.previous(), Page::None);
    }

    #[test]
    fn notifies_listeners_once_in_registration_order() {
        let pages = Pages::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        pages.add_listener(recorder(&log, 1));
        pages.add_listener(recorder(&log, 2));
        pages.add_listener(recorder(&log, 3));

        assert!(pages.set_active(Page::Audio));

        assert_eq!(
            *log.borrow(),
            vec![(1, Page::Audio), (2, Page::Audio), (3, Page::Audio)]
        );
        assert_eq!(pages.previous(), Page::None);
    }

    #[test]
    fn listener_registration_is_idempotent() {
        let pages = Pages::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let listener: PageListener = Rc::new(move |_| counter.set(counter.get() + 1));

        assert!(pages.add_listener(Rc::clone(&listener)));
        assert!(!pages.add_listener(Rc::clone(&listener)));
        assert_eq!(pages.listener_count(), 1);

        pages.set_active(Page::Scene);
        assert_eq!(calls.get(), 1);

        assert!(pages.remove_listener(&listener));
        assert!(!pages.remove_listener(&listener));

        pages.set_active(Page::Ui);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listeners_can_switch_pages_reentrantly() {
        let pages = Pages::new();
        let handle = pages.clone();
        pages.add_listener(Rc::new(move |page| {
            if page == Page::Scene {
                handle.set_active(Page::Audio);
            }
        }));

        pages.set_active(Page::Scene);

        assert_eq!(pages.current(), Page::Audio);
        assert_eq!(pages.previous(), Page::Scene);
    }

    #[test]
    fn converts_wire_values() {
        assert_eq!(Page::try_from(2), Ok(Page::Dev));
        assert_eq!(Page::try_from(5), Ok(Page::Audio));
        assert_eq!(Page::try_from(6), Err(UnknownPage(6)));
        assert_eq!(i64::from(Page::Ui), 4);

        let page: Page = serde_json::from_str("3").expect("page");
        assert_eq!(page, Page::Scene);
        assert!(serde_json::from_str::<Page>("-1").is_err());
    }
}
