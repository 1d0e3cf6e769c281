// Terminal Minesweeper: board engine, session controller and crossterm/ratatui front end

pub mod tsw_board;   // Mine layout, adjacency, reveal/mark and win detection
pub mod tsw_color;   // Palette matched to the terminal's colour depth
pub mod tsw_config;  // Fixed board and layout parameters
pub mod tsw_lang;    // Multi-language string resources
pub mod tsw_log;     // stderr logger behind the `log` facade
pub mod tsw_session; // Pointer-to-cell mapping, tick handling and the main loop
pub mod tsw_ui;      // Terminal renderer and input source
