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

//! Registered commands.

use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use crate::{
    error::DispatchError,
    page::Page,
    trigger::{Trigger, TriggerSource},
};

/// A zero-argument command action.
///
/// Actions only ever run on the dispatch loop's thread.
pub type Action = Box<dyn FnMut() -> anyhow::Result<()>>;

/// A command bound to a page, a label and a trigger.
///
/// Tokens are immutable once registered.
pub struct KeyToken {
    page: Page,
    label: String,
    trigger: Trigger,
    source_type: String,
    action: Action,
}

impl KeyToken {
    pub fn new(page: Page, label: impl Into<String>, trigger: Trigger, action: Action) -> Self {
        Self {
            page,
            label: label.into(),
            trigger,
            source_type: String::new(),
            action,
        }
    }

    /// Names the type that supplied the action, for key maps and diagnostics.
    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    pub fn allow_trigger(&self, source: &dyn TriggerSource) -> bool {
        self.trigger.allow(source)
    }

    /// Runs the action, converting both errors and panics into a
    /// [`DispatchError`] so a failing command cannot take the dispatch loop
    /// down with it.
    pub(crate) fn invoke(&mut self) -> Result<(), DispatchError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.action)())) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DispatchError::Action {
                label: self.label.clone(),
                message: format!("{e:#}"),
            }),
            Err(payload) => Err(DispatchError::Panic {
                label: self.label.clone(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// One line description used in collision reports.
    pub(crate) fn describe(&self) -> String {
        if self.source_type.is_empty() {
            format!("'{}' [{}]", self.label, self.trigger)
        } else {
            format!("{}::'{}' [{}]", self.source_type, self.label, self.trigger)
        }
    }
}

impl fmt::Debug for KeyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyToken")
            .field("page", &self.page)
            .field("label", &self.label)
            .field("trigger", &self.trigger)
            .field("source_type", &self.source_type)
            .finish_non_exhaustive()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
