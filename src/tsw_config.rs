// Fixed game configuration
// Every value here is a build-time constant; nothing is read from disk or the command line

use std::time::Duration;

use crate::tsw_board::{Board, ConfigError};

/// Board and layout parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub board_w: usize, // Cells across
    pub board_h: usize, // Cells down
    pub mines: usize,   // Mines per round

    // Terminal geometry, in character cells
    pub cell_w: u16, // Width of one board cell
    pub cell_h: u16, // Height of one board cell
    pub gap_x: u16,  // Columns between neighbouring cells
    pub gap_y: u16,  // Rows between neighbouring cells
    pub frame: u16,  // Border drawn around the board, on every side

    // Text rows kept free above and below the board
    pub header_rows: u16,
    pub footer_rows: u16,

    pub fps: u32,           // Ticks per second
    pub pause: Duration,    // Hold after a win or loss before the next round
}

impl Default for Config {
    fn default() -> Self {
        Config {
            board_w: 10,
            board_h: 10,
            mines: 16,
            cell_w: 3,
            cell_h: 1,
            gap_x: 1,
            gap_y: 0,
            frame: 1,
            header_rows: 2,
            footer_rows: 2,
            fps: 30,
            pause: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Reject board parameters the engine cannot play
    pub fn validate(&self) -> Result<(), ConfigError> {
        Board::check_params(self.board_w, self.board_h, self.mines)
    }

    /// Interval between ticks
    pub fn tick(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    /// Columns covered by the grid itself (cells and the gaps between them)
    pub fn grid_width(&self) -> u16 {
        span(self.board_w, self.cell_w, self.gap_x)
    }

    /// Rows covered by the grid itself
    pub fn grid_height(&self) -> u16 {
        span(self.board_h, self.cell_h, self.gap_y)
    }

    /// Smallest terminal that fits the framed board and the text rows
    pub fn min_area(&self) -> (u16, u16) {
        (
            self.grid_width() + 2 * self.frame,
            self.grid_height() + 2 * self.frame + self.header_rows + self.footer_rows,
        )
    }
}

fn span(count: usize, size: u16, gap: u16) -> u16 {
    let count = count as u16;
    count * size + count.saturating_sub(1) * gap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_playable() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.grid_width(), 39);
        assert_eq!(cfg.grid_height(), 10);
        assert_eq!(cfg.min_area(), (41, 16));
        assert_eq!(cfg.tick(), Duration::from_secs(1) / 30);
    }

    #[test]
    fn too_many_mines_is_rejected() {
        let cfg = Config { mines: 100, ..Config::default() };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TooManyMines { mines: 100, cells: 100 })
        );
    }
}
