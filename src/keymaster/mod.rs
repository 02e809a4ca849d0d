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

//! The dispatch engine.
//!
//! [`KeyMaster`] owns the registry, the page state and the receiving end of
//! the pending action queue. The host calls [`KeyMaster::tick`] once per
//! frame; everything the engine invokes runs inside that call.

mod selector;

use std::{
    net::SocketAddr,
    panic::{self, AssertUnwindSafe},
};

use tracing::{debug, info, warn};

pub use selector::PageSelector;

use crate::{
    binding::{KeyBinding, KeyHolder},
    config::RemoteConfig,
    error::{DispatchError, RegistryError, RemoteError},
    page::{Page, PageListener, Pages},
    queue::PendingActions,
    registry::{Registry, TokenId},
    remote::{RemoteListener, protocol::RemoteCommand},
    token::{KeyToken, panic_message},
    trigger::TriggerSource,
};

#[derive(Debug)]
pub struct KeyMaster {
    registry: Registry,
    pages: Pages,
    pending: PendingActions,

    /// The page the active command list was last resolved for.
    seen_page: Page,
    active_list: Option<Page>,

    remote: Option<RemoteListener>,
    running: bool,
}

impl Default for KeyMaster {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMaster {
    /// Creates an engine with the built-in [`PageSelector`] commands
    /// registered.
    pub fn new() -> Self {
        let mut keymaster = Self::without_page_selector();
        let selector = PageSelector::new(keymaster.pages());
        keymaster.register_keyholder(&selector);
        keymaster
    }

    /// Creates an engine with an empty registry.
    pub fn without_page_selector() -> Self {
        info!("initializing keymaster");
        Self {
            registry: Registry::new(),
            pages: Pages::new(),
            pending: PendingActions::new(),
            seen_page: Page::None,
            active_list: None,
            remote: None,
            running: true,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A handle to the page state, for actions that switch pages.
    pub fn pages(&self) -> Pages {
        self.pages.clone()
    }

    pub fn active_page(&self) -> Page {
        self.pages.current()
    }

    pub fn set_active_page(&mut self, page: Page) -> bool {
        self.pages.set_active(page)
    }

    pub fn add_page_listener(&self, listener: PageListener) -> bool {
        self.pages.add_listener(listener)
    }

    pub fn remove_page_listener(&self, listener: &PageListener) -> bool {
        self.pages.remove_listener(listener)
    }

    /// A producer handle to the pending action queue. It can be sent to other
    /// threads.
    pub fn pending_actions(&self) -> PendingActions {
        self.pending.clone()
    }

    pub fn register(&mut self, binding: KeyBinding) -> Result<TokenId, RegistryError> {
        self.registry.register(binding.into_token(""))
    }

    /// Registers every binding supplied by `holder`.
    ///
    /// Colliding bindings are reported and skipped; the rest are still
    /// registered. Returns the number of bindings registered.
    pub fn register_keyholder<H: KeyHolder + ?Sized>(&mut self, holder: &H) -> usize {
        let source_type = holder.source_type();
        let bindings = holder.key_bindings();
        let offered = bindings.len();

        let registered = bindings
            .into_iter()
            .map(|binding| self.registry.register(binding.into_token(source_type)))
            .filter(Result::is_ok)
            .count();

        info!(source_type, registered, skipped = offered - registered, "registered key holder");
        registered
    }

    pub fn unregister(&mut self, id: TokenId) -> Option<KeyToken> {
        self.registry.unregister(id)
    }

    /// Starts the remote listener.
    ///
    /// Failing to start only affects remote commands; key dispatch carries on
    /// regardless.
    pub fn start_remote(&mut self, config: &RemoteConfig) -> Result<SocketAddr, RemoteError> {
        if let Some(remote) = self.remote.as_ref().filter(|r| r.is_running()) {
            return Err(RemoteError::AlreadyRunning(remote.local_addr()));
        }

        let listener = RemoteListener::start(config, self.pending.clone())?;
        let addr = listener.local_addr();
        self.remote = Some(listener);
        Ok(addr)
    }

    pub fn stop_remote(&mut self) {
        if let Some(mut remote) = self.remote.take() {
            remote.shutdown();
        }
    }

    /// The address the remote listener is bound to, if it is running.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote
            .as_ref()
            .filter(|r| r.is_running())
            .map(RemoteListener::local_addr)
    }

    /// Runs one frame of dispatch.
    ///
    /// In order:
    ///
    /// 1. Page selection commands whose trigger fires.
    /// 2. If the active page changed, the page's command list is resolved
    ///    again.
    /// 3. Active page commands whose trigger fires.
    /// 4. Every pending action queued so far.
    ///
    /// A failing or panicking command is reported and the frame continues.
    /// Returns `false`, doing nothing, once the engine has been shut down.
    pub fn tick(&mut self, source: &dyn TriggerSource) -> bool {
        if !self.running {
            return false;
        }

        for token in self.registry.tokens_for_page_mut(Page::PageSelection) {
            if token.allow_trigger(source) {
                fire(token);
            }
        }

        let current = self.pages.current();
        if current != self.seen_page {
            self.seen_page = current;
            self.active_list = match current {
                Page::None | Page::PageSelection => None,
                page => Some(page),
            };
            debug!(page = %current, "resolved active command list");
        }

        if let Some(page) = self.active_list {
            for token in self.registry.tokens_for_page_mut(page) {
                if token.allow_trigger(source) {
                    fire(token);
                }
            }
        }

        self.drain_pending();
        true
    }

    /// Runs every queued action once, in the order queued.
    ///
    /// Actions queued while draining wait for the next drain. Returns the
    /// number of actions run.
    pub fn drain_pending(&mut self) -> usize {
        let actions = self.pending.take_all();
        let count = actions.len();

        for action in actions {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| action(self))) {
                warn!(message = %panic_message(payload.as_ref()), "pending action panicked");
            }
        }

        count
    }

    /// Activates the command's page and runs the command registered there
    /// under its label.
    ///
    /// The page stays active even when no command matches.
    pub fn handle_remote_command(&mut self, command: &RemoteCommand) -> Result<(), DispatchError> {
        self.pages.set_active(command.page);

        match self.registry.lookup_mut(command.page, &command.label) {
            Some(token) => {
                debug!(page = %command.page, label = %command.label, "invoking remote command");
                token.invoke()
            }
            None => Err(DispatchError::LookupMiss {
                page: command.page,
                label: command.label.clone(),
            }),
        }
    }

    pub(crate) fn run_remote_command(&mut self, command: &RemoteCommand) {
        if let Err(e) = self.handle_remote_command(command) {
            warn!(error = %e, "remote command failed");
        }
    }

    /// Stops the remote listener and marks the engine stopped.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.stop_remote();
        info!("keymaster shut down");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

fn fire(token: &mut KeyToken) {
    debug!(page = %token.page(), label = token.label(), "invoking key command");
    if let Err(e) = token.invoke() {
        warn!(error = %e, "key command failed");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
    };

    use crossterm::event::KeyCode;

    use super::*;
    use crate::trigger::{KeyState, modifiers::LEFT_SHIFT};

    fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    fn counting(page: Page, id: &str, key: char, calls: &Rc<Cell<u32>>) -> KeyBinding {
        let calls = Rc::clone(calls);
        KeyBinding::new(page, id, KeyCode::Char(key), move || {
            calls.set(calls.get() + 1);
            Ok(())
        })
    }

    fn press(keymaster: &mut KeyMaster, key: char) -> bool {
        let mut keys = KeyState::new();
        keys.press(KeyCode::Char(key));
        keymaster.tick(&keys)
    }

    #[test]
    fn only_the_active_page_is_evaluated() {
        let mut keymaster = KeyMaster::new();
        let dev = counter();
        let scene = counter();
        keymaster.register(counting(Page::Dev, "DevModeTrigger", 'd', &dev)).expect("dev");
        keymaster.register(counting(Page::Scene, "SceneTrigger", 'd', &scene)).expect("scene");

        // Nothing is active yet.
        press(&mut keymaster, 'd');
        assert_eq!((dev.get(), scene.get()), (0, 0));

        press(&mut keymaster, '1');
        assert_eq!(keymaster.active_page(), Page::Dev);
        press(&mut keymaster, 'd');
        assert_eq!((dev.get(), scene.get()), (1, 0));

        press(&mut keymaster, '2');
        assert_eq!(keymaster.active_page(), Page::Scene);
        press(&mut keymaster, 'd');
        assert_eq!((dev.get(), scene.get()), (1, 1));

        press(&mut keymaster, '0');
        assert_eq!(keymaster.active_page(), Page::None);
        press(&mut keymaster, 'd');
        assert_eq!((dev.get(), scene.get()), (1, 1));
    }

    #[test]
    fn page_selection_notifies_listeners_once() {
        let mut keymaster = KeyMaster::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let listener: PageListener = Rc::new(move |page| log.borrow_mut().push(page));
        assert!(keymaster.add_page_listener(Rc::clone(&listener)));
        assert!(!keymaster.add_page_listener(Rc::clone(&listener)));

        press(&mut keymaster, '3');
        press(&mut keymaster, '3');
        press(&mut keymaster, '4');
        assert_eq!(*seen.borrow(), [Page::Ui, Page::Audio]);

        assert!(keymaster.remove_page_listener(&listener));
        press(&mut keymaster, '1');
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn held_modifier_selects_the_combo_binding() {
        let mut keymaster = KeyMaster::new();
        let plain = counter();
        let combo = counter();
        keymaster
            .register(counting(Page::Audio, "MultiUseExampleNoCombo", 'm', &plain))
            .expect("plain");
        keymaster
            .register(counting(Page::Audio, "MultiUseExampleWithCombo", 'm', &combo).combo([LEFT_SHIFT]))
            .expect("combo");
        keymaster.set_active_page(Page::Audio);

        press(&mut keymaster, 'm');
        assert_eq!((plain.get(), combo.get()), (1, 0));

        let mut keys = KeyState::new();
        keys.hold(LEFT_SHIFT);
        keys.press(KeyCode::Char('m'));
        keymaster.tick(&keys);
        assert_eq!((plain.get(), combo.get()), (1, 1));
    }

    #[test]
    fn failing_commands_do_not_stop_the_frame() {
        let mut keymaster = KeyMaster::without_page_selector();
        let after = counter();
        keymaster
            .register(KeyBinding::new(Page::Ui, "Broken", KeyCode::Char('t'), || {
                anyhow::bail!("canvas missing")
            }))
            .expect("broken");
        keymaster
            .register(KeyBinding::new(Page::Ui, "Explodes", KeyCode::Char('t'), || -> anyhow::Result<()> {
                panic!("text missing")
            }))
            .expect("explodes");
        keymaster.register(counting(Page::Ui, "ToggleUi", 't', &after)).expect("toggle");
        keymaster.set_active_page(Page::Ui);

        assert!(press(&mut keymaster, 't'));
        assert!(press(&mut keymaster, 't'));
        assert_eq!(after.get(), 2);
    }

    #[test]
    fn colliding_holder_bindings_are_skipped() {
        struct Duplicates;

        impl KeyHolder for Duplicates {
            fn key_bindings(&self) -> Vec<KeyBinding> {
                vec![
                    KeyBinding::new(Page::Dev, "KeyComboExample", KeyCode::Char('e'), || Ok(())),
                    KeyBinding::new(Page::Dev, "KeyComboExample", KeyCode::Char('f'), || Ok(())),
                    KeyBinding::new(Page::Audio, "KeyComboExample", KeyCode::Char('e'), || Ok(())),
                ]
            }
        }

        let mut keymaster = KeyMaster::without_page_selector();
        assert_eq!(keymaster.register_keyholder(&Duplicates), 2);

        let token = keymaster
            .registry()
            .lookup(Page::Dev, "Key Combo Example")
            .expect("first binding kept");
        assert_eq!(token.trigger().key(), KeyCode::Char('e'));
        assert_eq!(token.source_type(), "Duplicates");
    }

    #[test]
    fn registers_the_page_selector() {
        let keymaster = KeyMaster::new();
        let labels: Vec<&str> = keymaster
            .registry()
            .page_selection()
            .iter()
            .map(KeyToken::label)
            .collect();
        assert_eq!(
            labels,
            [
                "Deactivate All Key Controls",
                "Set Dev Active",
                "Set Scene Active",
                "Set UI Active",
                "Set Audio Active",
            ]
        );
    }

    #[test]
    fn remote_command_activates_the_page_and_invokes() {
        let mut keymaster = KeyMaster::new();
        let calls = counter();
        keymaster
            .register(counting(Page::Dev, "ToggleConsoleOutput", 'b', &calls))
            .expect("register");

        keymaster
            .handle_remote_command(&RemoteCommand::new(Page::Dev, "Toggle Console Output"))
            .expect("command runs");
        assert_eq!(keymaster.active_page(), Page::Dev);
        assert_eq!(calls.get(), 1);

        let err = keymaster
            .handle_remote_command(&RemoteCommand::new(Page::Scene, "Toggle Console Output"))
            .expect_err("no such command on the scene page");
        assert!(matches!(err, DispatchError::LookupMiss { page: Page::Scene, .. }));
        assert_eq!(keymaster.active_page(), Page::Scene);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn pending_actions_run_once_in_order() {
        let mut keymaster = KeyMaster::without_page_selector();
        let pending = keymaster.pending_actions();
        let order = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        for n in 0..5 {
            let order = std::sync::Arc::clone(&order);
            pending.enqueue(move |_| order.lock().expect("lock").push(n));
        }

        // Work queued while draining waits for the next tick.
        pending.enqueue(|keymaster| {
            keymaster.pending_actions().enqueue(|keymaster| {
                keymaster.set_active_page(Page::Audio);
            });
        });

        keymaster.tick(&KeyState::new());
        assert_eq!(*order.lock().expect("lock"), [0, 1, 2, 3, 4]);
        assert_eq!(keymaster.active_page(), Page::None);
        assert_eq!(pending.len(), 1);

        keymaster.tick(&KeyState::new());
        assert_eq!(keymaster.active_page(), Page::Audio);
        assert_eq!(keymaster.drain_pending(), 0);
    }

    #[test]
    fn a_panicking_pending_action_does_not_lose_the_rest() {
        let mut keymaster = KeyMaster::without_page_selector();
        let pending = keymaster.pending_actions();
        pending.enqueue(|_| panic!("bad remote action"));
        pending.enqueue(|keymaster| {
            keymaster.set_active_page(Page::Scene);
        });

        assert_eq!(keymaster.drain_pending(), 2);
        assert_eq!(keymaster.active_page(), Page::Scene);
    }

    #[test]
    fn disabled_remote_never_starts() {
        let mut keymaster = KeyMaster::new();
        let config = RemoteConfig {
            enabled: false,
            ..RemoteConfig::default()
        };

        assert!(matches!(keymaster.start_remote(&config), Err(RemoteError::Disabled)));
        assert_eq!(keymaster.remote_addr(), None);
    }

    #[test]
    fn shutdown_stops_dispatch() {
        let mut keymaster = KeyMaster::new();
        let calls = counter();
        keymaster.register(counting(Page::PageSelection, "Extra", 'x', &calls)).expect("register");

        assert!(press(&mut keymaster, 'x'));
        keymaster.shutdown();
        assert!(!keymaster.is_running());
        assert!(!press(&mut keymaster, 'x'));
        assert_eq!(calls.get(), 1);
    }
}
