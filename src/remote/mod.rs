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

//! Remote command channel.
//!
//! Lets another process drive the command map over UDP.
//!
//! * [`protocol`]: The datagram envelope and command payload.
//! * [`listener`]: The background thread receiving datagrams.
//!
//! Delivery is best effort: there is no acknowledgement, retry or ordering
//! across datagrams, and no authentication. Only enable the channel on a
//! trusted network.

pub mod listener;
pub mod protocol;

pub use listener::{RECEIVE_TIMEOUT, RemoteListener};
pub use protocol::{NetworkMessage, RemoteCommand, Topic, decode_datagram};
