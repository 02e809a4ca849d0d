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

//! Example command holders, one per control page.
//!
//! The commands change a small piece of shared state that the interface
//! renders, standing in for the dev tools, scene, UI and audio of a real
//! application.

use std::{
    cell::{Ref, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use chrono::Local;
use crossterm::event::KeyCode;
use keymaster::{KeyBinding, KeyCombo, KeyHolder, KeyMaster, Page, modifiers::LEFT_SHIFT};
use tracing::info;

const ACTIVITY_LEN: usize = 200;

#[derive(Debug)]
pub(crate) struct ExampleState {
    pub dev_mode: bool,
    pub console_output: bool,
    pub spotlight: bool,
    pub light_rotation: u16,
    pub ui_visible: bool,
    pub clock: Option<String>,
    pub activity: VecDeque<String>,
}

impl Default for ExampleState {
    fn default() -> Self {
        Self {
            dev_mode: false,
            console_output: true,
            spotlight: true,
            light_rotation: 0,
            ui_visible: true,
            clock: None,
            activity: VecDeque::new(),
        }
    }
}

/// Shared handle to the example state, captured by command actions.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Rc<RefCell<ExampleState>>);

impl SharedState {
    pub fn get(&self) -> Ref<'_, ExampleState> {
        self.0.borrow()
    }

    fn update<T>(&self, f: impl FnOnce(&mut ExampleState) -> T) -> T {
        f(&mut self.0.borrow_mut())
    }

    /// Adds a line to the activity panel, unless console output is off.
    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");

        let mut state = self.0.borrow_mut();
        if !state.console_output {
            return;
        }
        if state.activity.len() == ACTIVITY_LEN {
            state.activity.pop_front();
        }
        state
            .activity
            .push_back(format!("{} {message}", Local::now().format("%H:%M:%S")));
    }
}

pub(crate) fn register_examples(keymaster: &mut KeyMaster, state: &SharedState) {
    keymaster.register_keyholder(&DevTriggers::new(state));
    keymaster.register_keyholder(&SceneTriggers::new(state));
    keymaster.register_keyholder(&UiTriggers::new(state));
    keymaster.register_keyholder(&AudioTriggers::new(state));
}

/// Binds a command that only records a message.
fn announce(state: &SharedState, page: Page, id: &str, key: char, message: &'static str) -> KeyBinding {
    let state = state.clone();
    KeyBinding::new(page, id, KeyCode::Char(key), move || {
        state.record(message);
        Ok(())
    })
}

pub(crate) struct DevTriggers {
    state: SharedState,
}

impl DevTriggers {
    pub fn new(state: &SharedState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl KeyHolder for DevTriggers {
    fn key_bindings(&self) -> Vec<KeyBinding> {
        let dev = self.state.clone();
        let console = self.state.clone();

        vec![
            KeyBinding::new(Page::Dev, "DevModeTrigger", KeyCode::Char('d'), move || {
                let enabled = dev.update(|s| {
                    s.dev_mode = !s.dev_mode;
                    s.dev_mode
                });
                dev.record(format!("Developer mode set to: {enabled}"));
                Ok(())
            }),
            KeyBinding::new(Page::Dev, "ToggleConsoleOutput", KeyCode::Char('b'), move || {
                let enabled = !console.get().console_output;
                if !enabled {
                    console.record("Console logging will be disabled");
                }
                console.update(|s| s.console_output = enabled);
                if enabled {
                    console.record("Console logging has been re-enabled");
                }
                Ok(())
            }),
            announce(&self.state, Page::Dev, "KeyComboExample", 'e', "Dev key combo success")
                .combo(KeyCombo::shift_alt_left().keys()),
        ]
    }
}

pub(crate) struct SceneTriggers {
    state: SharedState,
}

impl SceneTriggers {
    pub fn new(state: &SharedState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl KeyHolder for SceneTriggers {
    fn key_bindings(&self) -> Vec<KeyBinding> {
        let spotlight = self.state.clone();
        let light = self.state.clone();

        vec![
            announce(&self.state, Page::Scene, "GenericSceneTrigger", 'g', "Generic scene trigger"),
            KeyBinding::new(Page::Scene, "ToggleSpotlight", KeyCode::Char('t'), move || {
                let on = spotlight.update(|s| {
                    s.spotlight = !s.spotlight;
                    s.spotlight
                });
                spotlight.record(format!("Spotlight {}", if on { "on" } else { "off" }));
                Ok(())
            }),
            KeyBinding::new(Page::Scene, "RandomRotateLight", KeyCode::Char('r'), move || {
                let degrees = rand::random_range(0..360);
                light.update(|s| s.light_rotation = degrees);
                light.record(format!("Light rotated to {degrees} degrees"));
                Ok(())
            })
            .combo(KeyCombo::shift_alt_left().keys()),
        ]
    }
}

pub(crate) struct UiTriggers {
    state: SharedState,
}

impl UiTriggers {
    pub fn new(state: &SharedState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl KeyHolder for UiTriggers {
    fn key_bindings(&self) -> Vec<KeyBinding> {
        let toggle = self.state.clone();
        let clock = self.state.clone();

        vec![
            KeyBinding::new(Page::Ui, "ToggleUi", KeyCode::Char('t'), move || {
                toggle.update(|s| s.ui_visible = !s.ui_visible);
                Ok(())
            }),
            KeyBinding::new(Page::Ui, "DisplayTime", KeyCode::Char('r'), move || {
                let now = Local::now().format("%y:%d:%M:%S").to_string();
                clock.update(|s| {
                    s.ui_visible = true;
                    s.clock = Some(now);
                });
                Ok(())
            }),
        ]
    }
}

pub(crate) struct AudioTriggers {
    state: SharedState,
}

impl AudioTriggers {
    pub fn new(state: &SharedState) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl KeyHolder for AudioTriggers {
    fn key_bindings(&self) -> Vec<KeyBinding> {
        let state = &self.state;

        vec![
            announce(state, Page::Audio, "GenericAudioTrigger", 'g', "Generic audio trigger"),
            announce(
                state,
                Page::Audio,
                "MultiUseExampleNoCombo",
                'm',
                "Audio page multi-use example WITHOUT COMBO was triggered",
            ),
            announce(
                state,
                Page::Audio,
                "MultiUseExampleWithCombo",
                'm',
                "Audio page multi-use example WITH COMBO was triggered",
            )
            .combo([LEFT_SHIFT]),
            announce(state, Page::Audio, "PlayBGMusic", 'b', "Background music intensifies"),
            announce(state, Page::Audio, "KeyComboExample", 'e', "Audio key combo success")
                .combo(KeyCombo::shift_alt_left().keys()),
        ]
    }
}
