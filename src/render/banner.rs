//! ASCII art banner shown above every menu.

use super::theme::{Theme, Tone};

// Standard figure font, fitted layout (glyphs touch). The widest block must
// fit an 80-column terminal. Each word gets its own block.
const WORDMARK_FULL: &[&[&str]] = &[
    &[
        " ____ __   __ ____  _____  _____  __  __",
        "/ ___|\\ \\ / // ___||_   _|| ____||  \\/  |",
        "\\___ \\ \\ V / \\___ \\  | |  |  _|  | |\\/| |",
        " ___) | | |   ___) | | |  | |___ | |  | |",
        "|____/  |_|  |____/  |_|  |_____||_|  |_|",
    ],
    &[
        " ___  _   _  _____  ___   ____   __  __     _   _____  ___  ___   _   _",
        "|_ _|| \\ | ||  ___|/ _ \\ |  _ \\ |  \\/  |   / \\ |_   _||_ _|/ _ \\ | \\ | |",
        " | | |  \\| || |_  | | | || |_) || |\\/| |  / _ \\  | |   | || | | ||  \\| |",
        " | | | |\\  ||  _| | |_| ||  _ < | |  | | / ___ \\ | |   | || |_| || |\\  |",
        "|___||_| \\_||_|    \\___/ |_| \\_\\|_|  |_|/_/   \\_\\|_|  |___|\\___/ |_| \\_|",
    ],
];

const WORDMARK_COMPACT: &str = "SYSTEM INFORMATION";

/// Blank lines printed under the banner.
const BOTTOM_MARGIN: usize = 2;

fn full_width() -> usize {
    WORDMARK_FULL
        .iter()
        .flat_map(|block| block.iter())
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
}

/// Render the banner for a terminal `width` columns wide. Unknown width gets
/// the full wordmark.
pub fn render_banner(theme: &Theme, width: Option<u16>) -> String {
    let use_full = width.map_or(true, |w| usize::from(w) >= full_width());

    let mut lines: Vec<String> = if use_full {
        WORDMARK_FULL
            .iter()
            .flat_map(|block| block.iter())
            .map(|line| theme.paint(Tone::Banner, line).to_string())
            .collect()
    } else {
        vec![theme.paint(Tone::Banner, WORDMARK_COMPACT).to_string()]
    };
    lines.extend(std::iter::repeat(String::new()).take(BOTTOM_MARGIN));
    lines.join("\n")
}
