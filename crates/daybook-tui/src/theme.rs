use ratatui::style::Color;

/// Colors used by the widgets
#[derive(Debug, Clone)]
pub struct Theme {
    // Background colors
    pub bg0: Color,
    pub bg2: Color,

    // Foreground colors
    pub fg0: Color,
    pub grey0: Color,
    pub grey2: Color,

    // Semantic colors
    pub title: Color,
    pub entry_day: Color,
    pub active: Color,
    pub playing: Color,
    pub paused: Color,
    pub scrolling: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Gruvbox Material dark
        Self {
            bg0: Color::Rgb(0x28, 0x28, 0x28),
            bg2: Color::Rgb(0x45, 0x40, 0x3d),
            fg0: Color::Rgb(0xd4, 0xbe, 0x98),
            grey0: Color::Rgb(0x7c, 0x6f, 0x64),
            grey2: Color::Rgb(0xa8, 0x99, 0x84),
            title: Color::Rgb(0xd8, 0xa6, 0x57),
            entry_day: Color::Rgb(0x89, 0xb4, 0x82),
            active: Color::Rgb(0xe7, 0x8a, 0x4e),
            playing: Color::Rgb(0xa9, 0xb6, 0x65),
            paused: Color::Rgb(0x92, 0x83, 0x74),
            scrolling: Color::Rgb(0x7d, 0xae, 0xa3),
        }
    }
}
