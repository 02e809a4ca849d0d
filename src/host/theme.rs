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

//! Colour palette for the host interface.

use ratatui::style::Color;

#[derive(Clone, Copy)]
pub(crate) struct Theme {
    pub(crate) background_colour: Color,
    pub(crate) accent_colour: Color,
    pub(crate) border_colour: Color,
    pub(crate) muted_colour: Color,

    pub(crate) key_fg: Color,
    pub(crate) label_fg: Color,
    pub(crate) source_fg: Color,

    pub(crate) on_fg: Color,
    pub(crate) off_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub(crate) const fn default_theme() -> Self {
        Self {
            background_colour: Color::Rgb(40, 20, 50),
            accent_colour: Color::Rgb(250, 189, 47),
            border_colour: Color::Rgb(102, 102, 102),
            muted_colour: Color::Rgb(162, 161, 166),

            key_fg: Color::Rgb(255, 215, 0),
            label_fg: Color::Rgb(255, 255, 255),
            source_fg: Color::Rgb(179, 157, 219),

            on_fg: Color::Rgb(152, 195, 121),
            off_fg: Color::Rgb(224, 108, 117),
        }
    }

    /// CSS-style hex string for an RGB colour, as used by the terminal
    /// background escape sequence. `None` for palette colours.
    pub(crate) fn to_hex(colour: Color) -> Option<String> {
        match colour {
            Color::Rgb(r, g, b) => Some(format!("#{r:02x}{g:02x}{b:02x}")),
            _ => None,
        }
    }
}
