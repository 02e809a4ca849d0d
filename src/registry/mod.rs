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

//! Command registry.
//!
//! The registry keeps two views over the same set of [`KeyToken`]s:
//!
//! * **Page order**: each page's tokens in registration order, iterated by
//!   the dispatch loop.
//! * **Label index**: page and label to token, used for collision detection
//!   and remote lookups.
//!
//! Both views are updated together on every registration and removal.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::{error::RegistryError, page::Page, token::KeyToken};

/// Stable handle to a registered token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(u64);

#[derive(Debug, Default)]
struct PageTokens {
    ids: Vec<TokenId>,
    tokens: Vec<KeyToken>,
    labels: HashMap<String, usize>,
}

impl PageTokens {
    fn reindex(&mut self) {
        self.labels.clear();
        for (index, token) in self.tokens.iter().enumerate() {
            self.labels.insert(token.label().to_string(), index);
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    next_id: u64,
    pages: HashMap<Page, PageTokens>,
    locations: HashMap<TokenId, Page>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token, rejecting it if its page already has a token with the
    /// same label. The existing token is never replaced.
    pub fn register(&mut self, token: KeyToken) -> Result<TokenId, RegistryError> {
        let page = token.page();
        let entry = self.pages.entry(page).or_default();

        if let Some(&index) = entry.labels.get(token.label()) {
            let err = RegistryError::Collision {
                page,
                label: token.label().to_string(),
                existing: entry.tokens[index].describe(),
                attempted: token.describe(),
            };
            warn!(%page, label = token.label(), "COLLISION: {err}");
            return Err(err);
        }

        let id = TokenId(self.next_id);
        self.next_id += 1;

        debug!(%page, label = token.label(), trigger = %token.trigger(), "registered key command");

        entry.labels.insert(token.label().to_string(), entry.tokens.len());
        entry.ids.push(id);
        entry.tokens.push(token);
        self.locations.insert(id, page);

        Ok(id)
    }

    /// Removes a token from every index, returning it if it was registered.
    pub fn unregister(&mut self, id: TokenId) -> Option<KeyToken> {
        let page = self.locations.remove(&id)?;
        let entry = self.pages.get_mut(&page)?;
        let index = entry.ids.iter().position(|candidate| *candidate == id)?;

        entry.ids.remove(index);
        let token = entry.tokens.remove(index);
        entry.reindex();

        if entry.tokens.is_empty() {
            self.pages.remove(&page);
        }

        debug!(%page, label = token.label(), "unregistered key command");
        Some(token)
    }

    pub fn lookup(&self, page: Page, label: &str) -> Option<&KeyToken> {
        let entry = self.pages.get(&page)?;
        entry.labels.get(label).map(|&index| &entry.tokens[index])
    }

    pub(crate) fn lookup_mut(&mut self, page: Page, label: &str) -> Option<&mut KeyToken> {
        let entry = self.pages.get_mut(&page)?;
        let index = *entry.labels.get(label)?;
        entry.tokens.get_mut(index)
    }

    /// The tokens of `page`, in registration order.
    pub fn tokens_for_page(&self, page: Page) -> &[KeyToken] {
        self.pages
            .get(&page)
            .map(|entry| entry.tokens.as_slice())
            .unwrap_or_default()
    }

    pub(crate) fn tokens_for_page_mut(&mut self, page: Page) -> &mut [KeyToken] {
        self.pages
            .get_mut(&page)
            .map(|entry| entry.tokens.as_mut_slice())
            .unwrap_or_default()
    }

    /// The always-evaluated page selection tokens.
    pub fn page_selection(&self) -> &[KeyToken] {
        self.tokens_for_page(Page::PageSelection)
    }

    pub fn has_tokens(&self, page: Page) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn contains(&self, page: Page, label: &str) -> bool {
        self.lookup(page, label).is_some()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Pages with at least one token, in page order.
    pub fn pages(&self) -> Vec<Page> {
        let mut pages: Vec<Page> = self.pages.keys().copied().collect();
        pages.sort();
        pages
    }

    /// Snapshot of every page's labels in registration order.
    ///
    /// This is what remote clients need to build command payloads.
    pub fn command_map(&self) -> BTreeMap<Page, Vec<String>> {
        self.pages
            .iter()
            .map(|(page, entry)| {
                let labels = entry.tokens.iter().map(|t| t.label().to_string()).collect();
                (*page, labels)
            })
            .collect()
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let mut count = 0;
        for (page, entry) in &self.pages {
            assert_eq!(entry.ids.len(), entry.tokens.len(), "ids out of step on {page}");
            assert_eq!(entry.labels.len(), entry.tokens.len(), "label index out of step on {page}");
            for (index, token) in entry.tokens.iter().enumerate() {
                assert_eq!(token.page(), *page, "token filed under the wrong page");
                assert_eq!(entry.labels.get(token.label()), Some(&index), "label index is stale");
                assert_eq!(self.locations.get(&entry.ids[index]), Some(page), "id not tracked");
            }
            count += entry.tokens.len();
        }
        assert_eq!(count, self.locations.len(), "orphaned token ids");
    }
}
