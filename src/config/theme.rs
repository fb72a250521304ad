// Display theme - terminal foreground/background selection
//
// Chosen once at startup from the config file or a --theme-* flag and never
// changed during the session.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use serde::{Deserialize, Serialize};

/// Predefined color themes for different terminal preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Leave the terminal's own colors alone
    #[default]
    Default,
    /// Light text on a dark background
    Dark,
    /// Dark text on a light background
    Light,
}

impl Theme {
    /// Map a command-line flag to the theme it selects
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "--theme-dark" => Some(Self::Dark),
            "--theme-light" => Some(Self::Light),
            _ => None,
        }
    }

    /// (foreground, background), or `None` for the terminal default
    pub fn colors(&self) -> Option<(Color, Color)> {
        match self {
            Self::Default => None,
            Self::Dark => Some((Color::White, Color::Black)),
            Self::Light => Some((Color::DarkBlue, Color::White)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Switch the terminal to this theme.
    ///
    /// The screen is cleared afterwards so the background color covers the
    /// whole window rather than only the cells written from now on.
    pub fn apply<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some((fg, bg)) = self.colors() else {
            return Ok(());
        };
        queue!(
            out,
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        out.flush()
    }

    /// Restore the terminal colors changed by `apply`
    pub fn reset<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.colors().is_none() {
            return Ok(());
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}
