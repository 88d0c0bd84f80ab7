//! Presentation settings for a menu session
//!
//! There is no settings file; `main` uses [`Settings::default`] and tests
//! build variants directly.

use crate::format::DEFAULT_DECIMALS;
use crate::render::Theme;

/// Presentation constants shared by the menu and the views
#[derive(Debug, Clone)]
pub struct Settings {
    /// Rows visible at once in a list prompt
    pub page_size: usize,

    /// Decimals used when formatting byte counts
    pub byte_decimals: i32,

    /// Name used in the farewell line
    pub app_name: String,

    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 10,
            byte_decimals: DEFAULT_DECIMALS,
            app_name: "My Laptop Specs Viewer".to_string(),
            theme: Theme::default(),
        }
    }
}

impl Settings {
    pub fn farewell(&self) -> String {
        format!("\nThank you for using {}!", self.app_name)
    }
}
