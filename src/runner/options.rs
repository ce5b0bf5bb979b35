//! Launch options for the command runner.

use serde::{Deserialize, Serialize};

/// Window presentation requested for the child process.
///
/// Only meaningful on Windows; elsewhere it is accepted and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStyle {
    #[default]
    Normal,
    Hidden,
    Minimized,
    Maximized,
}

/// Options controlling how the child process is launched.
///
/// Every field defaults to "nothing special": no flags set, no stream
/// redirected, normal window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Do not create a console window for the child (Windows)
    pub create_no_window: bool,

    /// Hand the joined command line to the platform shell instead of
    /// launching the executable directly
    pub use_shell_execute: bool,

    pub redirect_standard_error: bool,

    /// Give the child a closed stdin instead of the parent's
    pub redirect_standard_input: bool,

    pub redirect_standard_output: bool,

    pub window_style: WindowStyle,
}

impl RunOptions {
    /// Options capturing both output streams, used when the caller wants
    /// the converter's output in the run outcome.
    pub fn captured() -> Self {
        Self {
            redirect_standard_error: true,
            redirect_standard_output: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_neutral() {
        let options = RunOptions::default();
        assert!(!options.create_no_window);
        assert!(!options.use_shell_execute);
        assert!(!options.redirect_standard_error);
        assert!(!options.redirect_standard_input);
        assert!(!options.redirect_standard_output);
        assert_eq!(options.window_style, WindowStyle::Normal);
    }

    #[test]
    fn test_captured() {
        let options = RunOptions::captured();
        assert!(options.redirect_standard_output);
        assert!(options.redirect_standard_error);
        assert!(!options.redirect_standard_input);
    }
}
