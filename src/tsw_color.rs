use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Colour depth the terminal reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    TrueColor,
    Indexed256,
    Basic,
}

impl Depth {
    pub fn detect() -> Depth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Indexed256
        } else {
            Depth::Basic
        }
    }

    /// Pick the representation this depth can show:
    /// exact RGB, the nearest 256-colour index, or the plain ANSI fallback
    fn pick(self, rgb: (u8, u8, u8), index256: u8, basic: Color) -> Color {
        match self {
            Depth::TrueColor => Color::Rgb(rgb.0, rgb.1, rgb.2),
            Depth::Indexed256 => Color::Indexed(index256),
            Depth::Basic => basic,
        }
    }
}

/// Every colour the board renderer uses
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub board: Color,         // Frame and gaps around the cells
    pub covered: Color,       // Hidden cell
    pub marked: Color,        // Hidden cell flagged with the mark key
    pub revealed: Color,      // Open cell
    pub hover: Color,         // Hidden cell under the pointer
    pub mine: Color,
    pub number_low: Color,    // 1-3 adjacent mines
    pub number_high: Color,   // 4-8 adjacent mines
    pub text: Color,
    pub alert: Color,         // Win/loss line
}

impl Palette {
    pub fn new(depth: Depth) -> Palette {
        Palette {
            background: depth.pick((255, 255, 255), 231, Color::White),
            board: depth.pick((0, 128, 0), 28, Color::Green),
            covered: depth.pick((0, 0, 255), 21, Color::Blue),
            marked: depth.pick((255, 0, 0), 196, Color::Red),
            revealed: depth.pick((240, 240, 240), 255, Color::Gray),
            hover: depth.pick((59, 120, 255), 63, Color::LightBlue),
            mine: depth.pick((0, 0, 0), 16, Color::Black),
            number_low: depth.pick((0, 0, 255), 21, Color::Blue),
            number_high: depth.pick((255, 0, 0), 196, Color::Red),
            text: depth.pick((0, 0, 0), 16, Color::Black),
            alert: depth.pick((255, 0, 0), 196, Color::Red),
        }
    }

    pub fn detect() -> Palette {
        Palette::new(Depth::detect())
    }

    pub fn number(&self, adj: u8) -> Color {
        if adj <= 3 { self.number_low } else { self.number_high }
    }
}
