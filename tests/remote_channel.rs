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

//! Remote commands over a real UDP socket on localhost.

use std::{
    cell::Cell,
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    rc::Rc,
    thread::{self, ThreadId},
    time::{Duration, Instant},
};

use crossterm::event::KeyCode;
use keymaster::{
    KeyBinding, KeyMaster, KeyState, Page, RemoteError,
    config::RemoteConfig,
    remote::{RECEIVE_TIMEOUT, RemoteCommand},
};

const WAIT: Duration = Duration::from_secs(5);

fn start(keymaster: &mut KeyMaster) -> SocketAddr {
    let addr = keymaster
        .start_remote(&RemoteConfig::new(0, "127.0.0.1"))
        .expect("listener starts");
    SocketAddr::from((Ipv4Addr::LOCALHOST, addr.port()))
}

fn send(to: SocketAddr, datagram: &[u8]) {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("client socket");
    socket.send_to(datagram, to).expect("send datagram");
}

/// Ticks until `done` holds, failing the test after [`WAIT`].
fn tick_until(keymaster: &mut KeyMaster, mut done: impl FnMut(&KeyMaster) -> bool) {
    let deadline = Instant::now() + WAIT;
    let keys = KeyState::new();
    while !done(keymaster) {
        assert!(Instant::now() < deadline, "timed out waiting for remote command");
        keymaster.tick(&keys);
        thread::sleep(Duration::from_millis(10));
    }
}

fn counting(page: Page, id: &str, calls: &Rc<Cell<u32>>, thread: &Rc<Cell<Option<ThreadId>>>) -> KeyBinding {
    let calls = Rc::clone(calls);
    let thread = Rc::clone(thread);
    KeyBinding::new(page, id, KeyCode::Char('b'), move || {
        calls.set(calls.get() + 1);
        thread.set(Some(thread::current().id()));
        Ok(())
    })
}

#[test]
fn remote_command_runs_once_on_the_dispatch_thread() {
    let mut keymaster = KeyMaster::new();
    let calls = Rc::new(Cell::new(0));
    let ran_on = Rc::new(Cell::new(None));
    keymaster
        .register(counting(Page::Dev, "ToggleConsoleOutput", &calls, &ran_on))
        .expect("register");

    let addr = start(&mut keymaster);
    send(
        addr,
        br#"{"topic":1,"payload":"{\"page\":2,\"label\":\"Toggle Console Output\"}"}"#,
    );

    tick_until(&mut keymaster, |_| calls.get() > 0);
    assert_eq!(keymaster.active_page(), Page::Dev);
    assert_eq!(ran_on.get(), Some(thread::current().id()));

    // Give a duplicate delivery the chance to show up.
    for _ in 0..5 {
        keymaster.tick(&KeyState::new());
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(calls.get(), 1);

    keymaster.shutdown();
}

#[test]
fn bad_messages_do_not_stop_the_listener() {
    let mut keymaster = KeyMaster::new();
    let calls = Rc::new(Cell::new(0));
    let ran_on = Rc::new(Cell::new(None));
    keymaster
        .register(counting(Page::Audio, "PlayBgMusic", &calls, &ran_on))
        .expect("register");

    let addr = start(&mut keymaster);
    send(addr, br#"{"topic":7,"payload":"{\"page\":5,\"label\":\"Play Bg Music\"}"}"#);
    send(addr, br#"{"topic":1,"payload":"{\"page\":5"}"#);
    send(addr, b"\xff\xfe not utf-8");
    send(addr, b"not json at all");
    send(addr, &RemoteCommand::new(Page::Audio, "No Such Command").to_datagram().expect("encode"));
    send(addr, &RemoteCommand::new(Page::Audio, "Play Bg Music").to_datagram().expect("encode"));

    tick_until(&mut keymaster, |_| calls.get() > 0);
    assert_eq!(calls.get(), 1);
    assert_eq!(keymaster.active_page(), Page::Audio);
    assert!(keymaster.remote_addr().is_some());
}

#[test]
fn remote_page_selection_matches_local_keys() {
    let mut keymaster = KeyMaster::new();
    let addr = start(&mut keymaster);

    send(addr, &RemoteCommand::new(Page::PageSelection, "Set Scene Active").to_datagram().expect("encode"));
    tick_until(&mut keymaster, |km| km.active_page() == Page::Scene);

    let mut keys = KeyState::new();
    keys.press(KeyCode::Char('0'));
    keymaster.tick(&keys);
    assert_eq!(keymaster.active_page(), Page::None);
}

#[test]
fn bind_failure_leaves_local_dispatch_working() {
    let taken = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).expect("occupy a port");
    let port = taken.local_addr().expect("local addr").port();

    let mut keymaster = KeyMaster::new();
    let err = keymaster
        .start_remote(&RemoteConfig::new(port, "127.0.0.1"))
        .expect_err("port is taken");
    assert!(matches!(err, RemoteError::Bind { port: p, .. } if p == port));
    assert_eq!(keymaster.remote_addr(), None);

    let calls = Rc::new(Cell::new(0));
    let ran_on = Rc::new(Cell::new(None));
    keymaster
        .register(counting(Page::Dev, "ToggleConsoleOutput", &calls, &ran_on))
        .expect("register");

    let mut keys = KeyState::new();
    keys.press(KeyCode::Char('1'));
    keymaster.tick(&keys);
    keys.end_frame();
    keys.press(KeyCode::Char('b'));
    keymaster.tick(&keys);
    assert_eq!(calls.get(), 1);
}

#[test]
fn shutdown_stops_the_listener_promptly() {
    let mut keymaster = KeyMaster::new();
    let addr = start(&mut keymaster);
    assert_eq!(keymaster.remote_addr().map(|a| a.port()), Some(addr.port()));

    let started = Instant::now();
    keymaster.shutdown();
    assert!(started.elapsed() < RECEIVE_TIMEOUT * 4);
    assert_eq!(keymaster.remote_addr(), None);

    // The port is free again.
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, addr.port())).expect("port released");
}

#[test]
fn second_listener_is_refused() {
    let mut keymaster = KeyMaster::new();
    let addr = start(&mut keymaster);

    let err = keymaster
        .start_remote(&RemoteConfig::new(0, "127.0.0.1"))
        .expect_err("already running");
    assert!(matches!(err, RemoteError::AlreadyRunning(a) if a.port() == addr.port()));
}
