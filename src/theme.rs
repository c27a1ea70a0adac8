use ratatui::style::{Color, Modifier, Style};

/// Colors used by the terminal front end.
#[derive(Clone, Debug)]
pub struct Theme {
    pub background: Color,

    pub status_bar_fg: Color,
    pub status_bar_bg: Color,

    /// Current file name in the status bar
    pub filename_color: Color,

    /// Bullets, counters and checkboxes
    pub marker_color: Color,

    /// Text of checked task items
    pub checked_fg: Color,

    /// Bar drawn in front of quoted blocks
    pub quote_bar_color: Color,

    pub code_fg: Color,

    /// Text marked with `InlineStyle::Highlight`
    pub highlight_fg: Color,
    pub highlight_bg: Color,

    pub link_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            status_bar_fg: Color::White,
            status_bar_bg: Color::Blue,
            filename_color: Color::LightYellow,
            marker_color: Color::Cyan,
            checked_fg: Color::DarkGray,
            quote_bar_color: Color::Gray,
            code_fg: Color::LightGreen,
            highlight_fg: Color::Black,
            highlight_bg: Color::LightYellow,
            link_color: Color::Blue,
        }
    }
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .fg(self.status_bar_fg)
            .bg(self.status_bar_bg)
    }

    pub fn filename_style(&self) -> Style {
        Style::default().fg(self.filename_color)
    }

    pub fn marker_style(&self) -> Style {
        Style::default().fg(self.marker_color)
    }

    /// Checked task items are dimmed and struck through.
    pub fn checked_style(&self) -> Style {
        Style::default()
            .fg(self.checked_fg)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn quote_bar_style(&self) -> Style {
        Style::default().fg(self.quote_bar_color)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code_fg)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.highlight_fg).bg(self.highlight_bg)
    }

    pub fn link_style(&self) -> Style {
        Style::default()
            .fg(self.link_color)
            .add_modifier(Modifier::UNDERLINED)
    }
}
