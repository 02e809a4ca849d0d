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

//! # KeyMaster.
//!
//! A paged key-command dispatch engine.
//!
//! Calling code registers zero-argument actions against a [`Page`] and a key
//! [`Trigger`]. Only one page is active at a time; the commands of the active
//! page, plus the always-on [`Page::PageSelection`] commands, are evaluated
//! once per host frame by [`KeyMaster::tick`].
//!
//! ## Architecture
//!
//! * The **Dispatch Loop** runs on the host's thread. Every registered action
//!   is invoked there, so actions do not need to be `Send`.
//! * The **Remote Channel** is a single background thread receiving UDP
//!   datagrams. It never touches the registry or page state: decoded commands
//!   are handed to the dispatch loop through [`PendingActions`], a mutex
//!   guarded queue drained once per tick.
//!
//! ## Example
//!
//! ```no_run
//! use crossterm::event::KeyCode;
//! use keymaster::{KeyBinding, KeyMaster, KeyState, Page};
//!
//! let mut keymaster = KeyMaster::new();
//! keymaster
//!     .register(KeyBinding::new(Page::Dev, "ToggleConsoleOutput", KeyCode::Char('b'), || {
//!         println!("toggled");
//!         Ok(())
//!     }))
//!     .expect("label is unique");
//!
//! let mut keys = KeyState::default();
//! keys.press(KeyCode::Char('1')); // page selection: activate the Dev page
//! keymaster.tick(&keys);
//! keys.end_frame();
//! ```

mod binding;
pub mod config;
mod error;
mod keymaster;
mod page;
mod queue;
mod registry;
pub mod remote;
mod token;
mod trigger;
pub mod util;

pub use binding::{KeyBinding, KeyHolder};
pub use error::{ConfigError, DecodeError, DispatchError, RegistryError, RemoteError, UnknownPage};
pub use keymaster::{KeyMaster, PageSelector};
pub use page::{Page, PageListener, Pages};
pub use queue::{PendingAction, PendingActions};
pub use registry::{Registry, TokenId};
pub use token::{Action, KeyToken};
pub use trigger::{KeyCombo, KeyState, Trigger, TriggerSource, key_name, modifiers};
