// Game session: owns the board, maps pointer positions to cells and drives rounds
// Terminal I/O stays behind the Renderer and InputSource traits

use std::io;
use std::time::Duration;

use log::{debug, info, trace};
use rand::Rng;

use crate::tsw_board::{Board, ConfigError, MarkOutcome, RevealOutcome, RoundState};
use crate::tsw_config::Config;

/// Placement of the grid inside the terminal, in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub origin: (u16, u16), // Top-left of cell (0, 0)
    pub cell: (u16, u16),   // Cell width, height
    pub gap: (u16, u16),    // Horizontal, vertical gap
    pub cells: (usize, usize),
}

impl Geometry {
    /// Centre the grid in an area of `area_w` x `area_h`
    /// Returns None when the area cannot hold the framed board and its text rows
    pub fn centered(area_w: u16, area_h: u16, cfg: &Config) -> Option<Geometry> {
        let (min_w, min_h) = cfg.min_area();
        if area_w < min_w || area_h < min_h {
            return None;
        }
        let grid_w = cfg.grid_width();
        let grid_h = cfg.grid_height();
        let body_h = area_h - cfg.header_rows - cfg.footer_rows;
        Some(Geometry {
            origin: ((area_w - grid_w) / 2, cfg.header_rows + (body_h - grid_h) / 2),
            cell: (cfg.cell_w, cfg.cell_h),
            gap: (cfg.gap_x, cfg.gap_y),
            cells: (cfg.board_w, cfg.board_h),
        })
    }

    /// Board cell under a terminal position; None for margins, gaps and
    /// anything past the last row or column
    pub fn cell_at(&self, px: u16, py: u16) -> Option<(usize, usize)> {
        let x = axis_cell(px, self.origin.0, self.cell.0, self.gap.0, self.cells.0)?;
        let y = axis_cell(py, self.origin.1, self.cell.1, self.gap.1, self.cells.1)?;
        Some((x, y))
    }

    /// Top-left terminal position of a cell
    pub fn cell_origin(&self, x: usize, y: usize) -> (u16, u16) {
        (
            self.origin.0 + x as u16 * (self.cell.0 + self.gap.0),
            self.origin.1 + y as u16 * (self.cell.1 + self.gap.1),
        )
    }

    /// Width and height covered by all cells and inner gaps
    pub fn extent(&self) -> (u16, u16) {
        let (cols, rows) = (self.cells.0 as u16, self.cells.1 as u16);
        (
            cols * self.cell.0 + cols.saturating_sub(1) * self.gap.0,
            rows * self.cell.1 + rows.saturating_sub(1) * self.gap.1,
        )
    }
}

fn axis_cell(p: u16, origin: u16, size: u16, gap: u16, count: usize) -> Option<usize> {
    let d = p.checked_sub(origin)?;
    let stride = size + gap;
    if stride == 0 || d % stride >= size {
        return None;
    }
    let i = (d / stride) as usize;
    (i < count).then_some(i)
}

/// Everything the input source reports for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFrame {
    pub pointer: Option<(u16, u16)>, // Last known pointer position
    pub clicked: bool,               // Pointer pressed during this tick
    pub mark_held: bool,             // Mark key is down
    pub area: (u16, u16),            // Terminal size
    pub quit: bool,
}

impl InputFrame {
    pub fn idle(area: (u16, u16)) -> Self {
        InputFrame {
            pointer: None,
            clicked: false,
            mark_held: false,
            area,
            quit: false,
        }
    }
}

/// What a tick did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Marked,
    Revealed,
    Lost,
    Won,
}

impl TickOutcome {
    pub fn is_terminal(self) -> bool {
        matches!(self, TickOutcome::Lost | TickOutcome::Won)
    }
}

/// Status line shown under the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    None,
    Lost,
    Won,
}

/// Read-only snapshot handed to the renderer once per tick
pub struct Scene<'a> {
    pub board: &'a Board,
    pub geometry: Option<Geometry>,
    pub hover: Option<(usize, usize)>,
    pub banner: Banner,
}

/// Whether the main loop should keep going after a pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub trait Renderer {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()>;
}

pub trait InputSource {
    /// Collect input for one tick, waiting at most `timeout`
    fn next_frame(&mut self, timeout: Duration) -> io::Result<InputFrame>;

    /// Hold for `duration` while still honouring quit
    fn pause(&mut self, duration: Duration) -> io::Result<Flow>;
}

/// One player's game: current board, RNG for new layouts, pointer state
pub struct Session<R: Rng> {
    cfg: Config,
    board: Board,
    rng: R,
    geometry: Option<Geometry>,
    pointer: Option<(u16, u16)>,
    rounds: u64,
}

impl<R: Rng> Session<R> {
    pub fn new(cfg: Config, mut rng: R) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let board = Board::generate(cfg.board_w, cfg.board_h, cfg.mines, &mut rng)?;
        Ok(Self::with_board(cfg, board, rng))
    }

    /// Start from a prepared board; its dimensions override the config
    pub fn with_board(mut cfg: Config, board: Board, rng: R) -> Self {
        cfg.board_w = board.width();
        cfg.board_h = board.height();
        cfg.mines = board.mine_total();
        Session {
            cfg,
            board,
            rng,
            geometry: None,
            pointer: None,
            rounds: 1,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.geometry
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    fn hover_cell(&self) -> Option<(usize, usize)> {
        let (px, py) = self.pointer?;
        self.geometry?.cell_at(px, py)
    }

    /// Apply one tick of input to the board
    pub fn tick(&mut self, input: &InputFrame) -> TickOutcome {
        self.geometry = Geometry::centered(input.area.0, input.area.1, &self.cfg);
        if input.pointer.is_some() {
            self.pointer = input.pointer;
        }
        if self.board.state().is_finished() {
            return TickOutcome::Idle;
        }
        let Some((x, y)) = self.hover_cell() else {
            if input.clicked {
                trace!("click outside the board at {:?}", self.pointer);
            }
            return TickOutcome::Idle;
        };
        if self.board.is_revealed(x, y) {
            return TickOutcome::Idle;
        }

        let mut outcome = TickOutcome::Idle;
        if input.mark_held && self.board.mark(x, y) == MarkOutcome::Marked {
            debug!("marked ({x}, {y})");
            outcome = TickOutcome::Marked;
        }
        if input.clicked {
            outcome = match self.board.reveal(x, y) {
                RevealOutcome::Lost => {
                    self.board.reveal_all_mines();
                    TickOutcome::Lost
                }
                RevealOutcome::Unchanged => outcome,
                RevealOutcome::Revealed | RevealOutcome::Cascade(_) => {
                    if self.board.state() == RoundState::Won {
                        TickOutcome::Won
                    } else {
                        TickOutcome::Revealed
                    }
                }
            };
        }
        outcome
    }

    pub fn scene(&self) -> Scene<'_> {
        let banner = match self.board.state() {
            RoundState::Playing => Banner::None,
            RoundState::Lost => Banner::Lost,
            RoundState::Won => Banner::Won,
        };
        Scene {
            board: &self.board,
            geometry: self.geometry,
            hover: self.hover_cell(),
            banner,
        }
    }

    /// Throw away the current round and lay out a new one
    pub fn reset(&mut self) {
        self.board.reset(&mut self.rng);
        self.rounds += 1;
        debug!("round {} started", self.rounds);
    }

    /// Main loop: input, update, draw; pause and reset after a win or loss
    pub fn run<D: Renderer, I: InputSource>(
        &mut self,
        renderer: &mut D,
        input: &mut I,
    ) -> io::Result<()> {
        let tick = self.cfg.tick();
        loop {
            let frame = input.next_frame(tick)?;
            if frame.quit {
                info!("quit after {} round(s)", self.rounds);
                return Ok(());
            }
            let outcome = self.tick(&frame);
            renderer.draw(&self.scene())?;
            if outcome.is_terminal() {
                info!("round {} ended: {:?}", self.rounds, outcome);
                if input.pause(self.cfg.pause)? == Flow::Quit {
                    info!("quit during pause");
                    return Ok(());
                }
                self.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const AREA: (u16, u16) = (80, 24);

    fn session(board: Board) -> Session<StdRng> {
        Session::with_board(Config::default(), board, StdRng::seed_from_u64(7))
    }

    fn at(s: &Session<StdRng>, x: usize, y: usize) -> (u16, u16) {
        let g = Geometry::centered(AREA.0, AREA.1, s.config()).unwrap();
        let (px, py) = g.cell_origin(x, y);
        (px + 1, py)
    }

    fn click(pos: (u16, u16)) -> InputFrame {
        InputFrame {
            pointer: Some(pos),
            clicked: true,
            ..InputFrame::idle(AREA)
        }
    }

    #[test]
    fn geometry_maps_cells_and_gaps() {
        let cfg = Config::default();
        let g = Geometry::centered(80, 24, &cfg).unwrap();
        // 39 columns of grid centred in 80, 10 rows centred between 2 header and 2 footer rows
        assert_eq!(g.origin, (20, 7));
        assert_eq!(g.cell_at(20, 7), Some((0, 0)));
        assert_eq!(g.cell_at(22, 7), Some((0, 0)));
        assert_eq!(g.cell_at(23, 7), None); // gap
        assert_eq!(g.cell_at(24, 7), Some((1, 0)));
        assert_eq!(g.cell_at(58, 16), Some((9, 9)));
        assert_eq!(g.cell_at(59, 16), None);
        assert_eq!(g.cell_at(20, 17), None);
        assert_eq!(g.cell_at(19, 7), None);
        assert_eq!(g.cell_at(0, 0), None);
        assert_eq!(g.cell_origin(9, 9), (56, 16));
        assert_eq!(g.extent(), (39, 10));
    }

    #[test]
    fn geometry_needs_room() {
        let cfg = Config::default();
        let (w, h) = cfg.min_area();
        assert!(Geometry::centered(w, h, &cfg).is_some());
        assert!(Geometry::centered(w - 1, h, &cfg).is_none());
        assert!(Geometry::centered(w, h - 1, &cfg).is_none());
    }

    #[test]
    fn every_cell_round_trips_through_geometry() {
        let cfg = Config::default();
        let g = Geometry::centered(100, 40, &cfg).unwrap();
        for y in 0..cfg.board_h {
            for x in 0..cfg.board_w {
                let (px, py) = g.cell_origin(x, y);
                assert_eq!(g.cell_at(px, py), Some((x, y)));
                assert_eq!(g.cell_at(px + cfg.cell_w - 1, py), Some((x, y)));
            }
        }
    }

    #[test]
    fn pointer_outside_is_ignored() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0)]).unwrap());
        assert_eq!(s.tick(&click((0, 0))), TickOutcome::Idle);
        assert_eq!(s.board().revealed_safe_count(), 0);
        assert!(s.scene().hover.is_none());
    }

    #[test]
    fn click_reveals_hovered_cell() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0), (9, 9)]).unwrap());
        let pos = at(&s, 1, 1);
        assert_eq!(s.tick(&click(pos)), TickOutcome::Revealed);
        assert!(s.board().is_revealed(1, 1));
        assert_eq!(s.scene().hover, Some((1, 1)));
    }

    #[test]
    fn hover_without_click_does_nothing() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0)]).unwrap());
        let frame = InputFrame {
            pointer: Some(at(&s, 5, 5)),
            ..InputFrame::idle(AREA)
        };
        assert_eq!(s.tick(&frame), TickOutcome::Idle);
        assert_eq!(s.board().revealed_safe_count(), 0);
    }

    #[test]
    fn mark_key_marks_once() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0)]).unwrap());
        let frame = InputFrame {
            pointer: Some(at(&s, 0, 0)),
            mark_held: true,
            ..InputFrame::idle(AREA)
        };
        assert_eq!(s.tick(&frame), TickOutcome::Marked);
        assert_eq!(s.tick(&frame), TickOutcome::Idle);
        assert_eq!(s.board().marked_count(), 1);
    }

    #[test]
    fn pointer_is_remembered_between_frames() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0), (9, 9)]).unwrap());
        let moved = InputFrame {
            pointer: Some(at(&s, 1, 1)),
            ..InputFrame::idle(AREA)
        };
        s.tick(&moved);
        let press = InputFrame {
            clicked: true,
            ..InputFrame::idle(AREA)
        };
        assert_eq!(s.tick(&press), TickOutcome::Revealed);
        assert!(s.board().is_revealed(1, 1));
    }

    #[test]
    fn losing_click_shows_every_mine() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0), (9, 9), (4, 4)]).unwrap());
        let pos = at(&s, 4, 4);
        assert_eq!(s.tick(&click(pos)), TickOutcome::Lost);
        assert!(s.board().is_revealed(0, 0));
        assert!(s.board().is_revealed(9, 9));
        assert_eq!(s.scene().banner, Banner::Lost);
        // no further moves until reset
        let other = at(&s, 5, 5);
        assert_eq!(s.tick(&click(other)), TickOutcome::Idle);
    }

    #[test]
    fn cascade_can_win_the_round() {
        let mut s = session(Board::with_mines(10, 10, &[(0, 0)]).unwrap());
        let pos = at(&s, 9, 9);
        assert_eq!(s.tick(&click(pos)), TickOutcome::Won);
        assert_eq!(s.scene().banner, Banner::Won);
    }

    #[test]
    fn reset_starts_a_fresh_round() {
        let mut s = Session::new(Config::default(), StdRng::seed_from_u64(3)).unwrap();
        s.reset();
        assert_eq!(s.rounds(), 2);
        assert_eq!(s.board().state(), RoundState::Playing);
        assert_eq!(s.board().revealed_safe_count(), 0);
        assert_eq!(s.board().marked_count(), 0);
    }

    #[test]
    fn bad_config_fails_at_startup() {
        let cfg = Config { mines: 200, ..Config::default() };
        assert!(Session::new(cfg, StdRng::seed_from_u64(1)).is_err());
    }
}
