// Board engine: mine layout, adjacency counts, reveal/mark state
// Owns the per-round state machine (Playing -> Lost | Won) and the flood fill

use log::{debug, info};
use rand::Rng;
use thiserror::Error;

/// Rejected board parameters
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board must be at least 1x1")]
    EmptyBoard,
    #[error("{mines} mines do not fit on a board of {cells} cells (need fewer mines than cells)")]
    TooManyMines { mines: usize, cells: usize },
    #[error("mine coordinates ({x}, {y}) are outside the board")]
    InvalidCoords { x: usize, y: usize },
    #[error("mine at ({x}, {y}) was placed twice")]
    DuplicateMine { x: usize, y: usize },
}

/// Round state; only `Playing` accepts reveal and mark
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundState {
    Playing,
    Lost,
    Won,
}

impl RoundState {
    pub fn is_finished(self) -> bool {
        matches!(self, RoundState::Lost | RoundState::Won)
    }
}

/// Result of a reveal request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Cell was already open, or the round is over
    Unchanged,
    /// Exactly one numbered cell opened
    Revealed,
    /// A zero cell opened and the flood fill opened this many cells in total
    Cascade(usize),
    /// A mine was opened
    Lost,
}

/// Result of a mark request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    AlreadyMarked,
    /// Cell is revealed or the round is over
    Rejected,
}

/// Mine layout of a single cell
#[derive(Clone, Copy, Default)]
pub struct Cell {
    pub mine: bool, // Contains a mine
    pub adj: u8,    // Adjacent mine count (0-8), unused on mines
}

/// Read-only view of one cell for renderers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub mine: bool,
    pub adj: u8,
    pub revealed: bool,
    pub marked: bool,
}

/// Minesweeper board
#[derive(Clone)]
pub struct Board {
    w: usize,
    h: usize,
    mines: usize,
    cells: Vec<Cell>,
    revealed: Vec<bool>,
    marked: Vec<bool>,
    state: RoundState,
}

impl Board {
    /// Check board parameters without allocating
    pub fn check_params(w: usize, h: usize, mines: usize) -> Result<(), ConfigError> {
        if w == 0 || h == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        let cells = w * h;
        if mines >= cells {
            return Err(ConfigError::TooManyMines { mines, cells });
        }
        Ok(())
    }

    /// Create an empty board: no mines, everything hidden and unmarked
    pub fn new(w: usize, h: usize, mines: usize) -> Result<Self, ConfigError> {
        Self::check_params(w, h, mines)?;
        Ok(Board {
            w,
            h,
            mines,
            cells: vec![Cell::default(); w * h],
            revealed: vec![false; w * h],
            marked: vec![false; w * h],
            state: RoundState::Playing,
        })
    }

    /// Create a board and seed it with a random layout
    pub fn generate<R: Rng + ?Sized>(
        w: usize,
        h: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let mut board = Self::new(w, h, mines)?;
        board.reset(rng);
        Ok(board)
    }

    /// Create a board with mines at fixed coordinates
    pub fn with_mines(w: usize, h: usize, mines: &[(usize, usize)]) -> Result<Self, ConfigError> {
        let mut board = Self::new(w, h, mines.len())?;
        for &(x, y) in mines {
            if !board.in_bounds(x, y) {
                return Err(ConfigError::InvalidCoords { x, y });
            }
            let idx = board.index(x, y);
            if board.cells[idx].mine {
                return Err(ConfigError::DuplicateMine { x, y });
            }
            board.cells[idx].mine = true;
        }
        board.compute_adjacency();
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn mine_total(&self) -> usize {
        self.mines
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.w && y < self.h
    }

    /// Convert (x, y) coordinates to flat array index
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<CellView> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        Some(CellView {
            mine: self.cells[idx].mine,
            adj: self.cells[idx].adj,
            revealed: self.revealed[idx],
            marked: self.marked[idx],
        })
    }

    pub fn is_revealed(&self, x: usize, y: usize) -> bool {
        self.in_bounds(x, y) && self.revealed[self.index(x, y)]
    }

    /// Up to 8 surrounding coordinates, clipped at the edges
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (w, h) = (self.w, self.h);
        let xs = x.saturating_sub(1)..=(x + 1).min(w - 1);
        let ys = y.saturating_sub(1)..=(y + 1).min(h - 1);
        ys.flat_map(move |oy| xs.clone().map(move |ox| (ox, oy)))
            .filter(move |&(ox, oy)| !(ox == x && oy == y))
    }

    /// Randomly place the configured number of mines
    /// Reject-and-retry on collision; always terminates because mines < cells
    pub fn place_mines<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.w * self.h;
        for cell in self.cells.iter_mut() {
            *cell = Cell::default();
        }
        let mut placed = 0;
        while placed < self.mines {
            let i = rng.gen_range(0..n);
            if !self.cells[i].mine {
                self.cells[i].mine = true;
                placed += 1;
            }
        }
    }

    /// Recount adjacent mines for every non-mine cell
    pub fn compute_adjacency(&mut self) {
        for y in 0..self.h {
            for x in 0..self.w {
                let idx = self.index(x, y);
                if self.cells[idx].mine {
                    self.cells[idx].adj = 0;
                    continue;
                }
                let adj = self
                    .neighbors(x, y)
                    .filter(|&(ox, oy)| self.cells[self.index(ox, oy)].mine)
                    .count();
                self.cells[idx].adj = adj as u8;
            }
        }
    }

    /// Start a new round: fresh layout, everything hidden and unmarked
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.revealed.fill(false);
        self.marked.fill(false);
        self.place_mines(rng);
        self.compute_adjacency();
        self.state = RoundState::Playing;
        info!("new round: {}x{} board with {} mines", self.w, self.h, self.mines);
    }

    /// Reveal a cell at (x, y)
    /// - Mines end the round (loss)
    /// - Zero cells flood-fill their connected zero region plus its border
    /// - The round is won once every safe cell is open
    pub fn reveal(&mut self, x: usize, y: usize) -> RevealOutcome {
        debug_assert!(self.in_bounds(x, y), "reveal({x}, {y}) outside {}x{}", self.w, self.h);
        if !self.in_bounds(x, y) || self.state != RoundState::Playing {
            return RevealOutcome::Unchanged;
        }
        let idx = self.index(x, y);
        if self.revealed[idx] {
            return RevealOutcome::Unchanged;
        }
        self.revealed[idx] = true;
        if self.cells[idx].mine {
            self.state = RoundState::Lost;
            info!("mine hit at ({x}, {y})");
            return RevealOutcome::Lost;
        }
        let outcome = if self.cells[idx].adj == 0 {
            let opened = 1 + self.flood_fill(x, y);
            debug!("cascade from ({x}, {y}) opened {opened} cells");
            RevealOutcome::Cascade(opened)
        } else {
            RevealOutcome::Revealed
        };
        if self.is_won() {
            self.state = RoundState::Won;
            info!("all {} safe cells revealed", self.w * self.h - self.mines);
        }
        outcome
    }

    /// Open the zero region reachable from (x, y) and the ring around it
    /// Returns the number of cells newly revealed, not counting (x, y)
    fn flood_fill(&mut self, x: usize, y: usize) -> usize {
        let mut visited = vec![false; self.w * self.h];
        let mut stack = vec![(x, y)];
        visited[self.index(x, y)] = true;
        let mut opened = 0;
        while let Some((cx, cy)) = stack.pop() {
            for (nx, ny) in self.neighbors(cx, cy) {
                let nidx = self.index(nx, ny);
                if !self.revealed[nidx] {
                    self.revealed[nidx] = true;
                    opened += 1;
                }
                // zero cells never border a mine, so the ring is always safe
                if self.cells[nidx].adj == 0 && !self.cells[nidx].mine && !visited[nidx] {
                    visited[nidx] = true;
                    stack.push((nx, ny));
                }
            }
        }
        opened
    }

    /// Mark a hidden cell as a suspected mine
    pub fn mark(&mut self, x: usize, y: usize) -> MarkOutcome {
        debug_assert!(self.in_bounds(x, y), "mark({x}, {y}) outside {}x{}", self.w, self.h);
        if !self.in_bounds(x, y) || self.state != RoundState::Playing {
            return MarkOutcome::Rejected;
        }
        let idx = self.index(x, y);
        if self.revealed[idx] {
            return MarkOutcome::Rejected;
        }
        if self.marked[idx] {
            return MarkOutcome::AlreadyMarked;
        }
        self.marked[idx] = true;
        MarkOutcome::Marked
    }

    pub fn revealed_safe_count(&self) -> usize {
        self.cells
            .iter()
            .zip(&self.revealed)
            .filter(|(c, r)| **r && !c.mine)
            .count()
    }

    pub fn marked_count(&self) -> usize {
        self.marked.iter().filter(|m| **m).count()
    }

    /// Check if all non-mine cells have been revealed (win condition)
    pub fn is_won(&self) -> bool {
        self.revealed_safe_count() == self.w * self.h - self.mines
    }

    /// Open every mine so the renderer can show the full layout after a loss
    pub fn reveal_all_mines(&mut self) {
        for (cell, revealed) in self.cells.iter().zip(self.revealed.iter_mut()) {
            if cell.mine {
                *revealed = true;
            }
        }
    }
}
