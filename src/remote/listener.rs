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

//! UDP listener thread.
//!
//! The listener owns its socket and a [`PendingActions`] producer handle, and
//! nothing else. Decoded commands are queued for the dispatch loop; the
//! listener never runs a command itself.
//!
//! The socket uses a read timeout so the thread notices a shutdown request
//! within [`RECEIVE_TIMEOUT`].

use std::{
    io::ErrorKind,
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, error, info, warn};

use crate::{
    config::RemoteConfig, error::RemoteError, queue::PendingActions,
    remote::protocol::decode_datagram,
};

pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(500);

const THREAD_NAME: &str = "keymaster-remote";

// Largest possible UDP payload.
const MAX_DATAGRAM_LEN: usize = 65_507;

/// Handle to the running listener thread.
///
/// Dropping the handle shuts the listener down.
#[derive(Debug)]
pub struct RemoteListener {
    addr: SocketAddr,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RemoteListener {
    /// Binds the configured port and spawns the listener thread.
    ///
    /// Binding happens on the calling thread, so a port that cannot be bound
    /// is reported here rather than lost inside the thread.
    pub fn start(config: &RemoteConfig, pending: PendingActions) -> Result<Self, RemoteError> {
        if !config.enabled {
            return Err(RemoteError::Disabled);
        }

        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
        let socket = UdpSocket::bind(bind_addr).map_err(|source| RemoteError::Bind {
            port: config.port,
            source,
        })?;
        socket
            .set_read_timeout(Some(RECEIVE_TIMEOUT))
            .map_err(RemoteError::Transport)?;
        let addr = socket.local_addr().map_err(RemoteError::Transport)?;

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || listen(socket, &thread_running, &pending))
            .map_err(RemoteError::Spawn)?;

        info!(%addr, "now listening for remote commands");

        Ok(Self {
            addr,
            running,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// `false` once the listener has been shut down or has stopped after a
    /// transport failure.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Asks the thread to stop and waits for it, which takes at most one
    /// receive timeout.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(addr = %self.addr, "remote listener thread panicked");
            }
            info!(addr = %self.addr, "remote listener stopped");
        }
    }
}

impl Drop for RemoteListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listen(socket: UdpSocket, running: &AtomicBool, pending: &PendingActions) {
    let mut buffer = vec![0u8; MAX_DATAGRAM_LEN];

    while running.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buffer) {
            Ok((len, peer)) => handle_datagram(&buffer[..len], peer, pending),

            // Timeouts are how the loop gets to check the running flag.
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock
                        | ErrorKind::TimedOut
                        | ErrorKind::Interrupted
                        | ErrorKind::ConnectionReset
                ) => {}

            Err(e) => {
                error!(error = %e, "remote listener transport failure, listener stopping");
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    debug!("remote listener socket closed");
}

fn handle_datagram(bytes: &[u8], peer: SocketAddr, pending: &PendingActions) {
    match decode_datagram(bytes) {
        Ok(command) => {
            debug!(%peer, page = %command.page, label = %command.label, "queued remote command");
            pending.enqueue(move |keymaster| keymaster.run_remote_command(&command));
        }
        Err(e) => {
            warn!(%peer, error = %e, "dropping remote message");
        }
    }
}
