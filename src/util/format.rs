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

/// Formats a registration identifier into a display label.
///
/// The first character is upper-cased, and a space is inserted before each
/// upper-case letter or digit that follows a lower-case letter.
///
/// Labels are the keys remote clients use to address commands, so the output
/// must stay stable for a given identifier.
///
/// # Examples
///
/// ```
/// use keymaster::util::format::friendly_format;
///
/// assert_eq!(friendly_format("ToggleConsoleOutput"), "Toggle Console Output");
/// assert_eq!(friendly_format("setDevActive"), "Set Dev Active");
/// assert_eq!(friendly_format("Alpha0"), "Alpha 0");
/// ```
pub fn friendly_format(identifier: &str) -> String {
    let mut chars = identifier.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut label = String::with_capacity(identifier.len() + 8);
    label.extend(first.to_uppercase());
    let mut last = label.chars().last().unwrap_or(first);

    for c in chars {
        if (c.is_uppercase() || c.is_numeric()) && last.is_lowercase() {
            label.push(' ');
        }
        label.push(c);
        last = c;
    }
    label
}

/// Strips the module path from a type name.
///
/// Used to show which key holder a command came from.
///
/// ```
/// use keymaster::util::format::short_type_name;
///
/// assert_eq!(short_type_name("host::triggers::DevTriggers"), "DevTriggers");
/// ```
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
