//! Platform-specific key configuration

use crossterm::event::KeyModifiers;

/// Modifier for form shortcuts. Terminals do not forward Cmd on macOS,
/// so Control is used everywhere.
pub const SUBMIT_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Submit shortcut display for help text
pub const SUBMIT_SHORTCUT: &str = "Ctrl+S";

/// Quit shortcut display
pub const QUIT_SHORTCUT: &str = "Ctrl+Q";
