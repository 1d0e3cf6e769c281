use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::execute;
use log::{trace, warn};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

use crate::tsw_board::Board;
use crate::tsw_color::Palette;
use crate::tsw_config::Config;
use crate::tsw_lang::Lang;
use crate::tsw_session::{Banner, Flow, Geometry, InputFrame, InputSource, Renderer, Scene};

// Terminals without key-release events: treat the mark key as held this long after its last press
const MARK_RELEASE_AFTER: Duration = Duration::from_millis(150);

/// Raw mode, alternate screen and mouse capture for as long as it lives
pub struct TermGuard;

impl TermGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TermGuard;
        execute!(io::stdout(), EnableMouseCapture, EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("failed to leave raw mode: {e}");
        }
        if let Err(e) = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen, Show) {
            warn!("failed to restore terminal: {e}");
        }
    }
}

/// Draws scenes with ratatui on the crossterm backend
pub struct TermRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    palette: Palette,
    lang: Lang,
    cfg: Config,
}

impl TermRenderer {
    /// The terminal must already be in raw mode (see `TermGuard`)
    pub fn new(cfg: Config, lang: Lang, palette: Palette) -> io::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(TermRenderer { terminal, palette, lang, cfg })
    }
}

impl Renderer for TermRenderer {
    fn draw(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        let palette = &self.palette;
        let lang = &self.lang;
        let cfg = &self.cfg;
        self.terminal.draw(|f| {
            let size = f.size();
            f.render_widget(Block::default().style(Style::default().bg(palette.background)), size);
            // the terminal may have been resized since the scene was built
            match scene.geometry.filter(|g| fits(g, cfg.frame, size)) {
                Some(geometry) => {
                    draw_text_rows(f, size, scene.banner, palette, lang);
                    draw_board(f, scene, geometry, cfg.frame, palette, lang);
                }
                None => {
                    let (min_w, min_h) = cfg.min_area();
                    draw_too_small(f, size, min_w, min_h, lang);
                }
            }
        })?;
        Ok(())
    }
}

fn draw_too_small<B: Backend>(f: &mut Frame<B>, size: Rect, min_w: u16, min_h: u16, lang: &Lang) {
    let warn_lines = vec![
        Spans::from(Span::raw(lang.assets.tsmsg_line1)),
        Spans::from(Span::raw(lang.min_size_message(min_w, min_h))),
    ];
    let warn = Paragraph::new(Text::from(warn_lines))
        .block(Block::default().borders(Borders::ALL).title(lang.assets.tsmsg_title))
        .alignment(Alignment::Center);
    f.render_widget(Clear, size);
    let w = 40u16.min(size.width.saturating_sub(2));
    let h = 5u16.min(size.height.saturating_sub(2));
    f.render_widget(warn, center_rect(w, h, size));
}

/// Help rows on top, help and status rows at the bottom
fn draw_text_rows<B: Backend>(f: &mut Frame<B>, size: Rect, banner: Banner, palette: &Palette, lang: &Lang) {
    let text_style = Style::default().fg(palette.text).bg(palette.background);
    let row = |y: u16| Rect::new(size.x, size.y + y, size.width, 1);
    let line = |s: &str| Paragraph::new(Spans::from(Span::styled(format!(" {}", s), text_style)));

    f.render_widget(line(lang.assets.help_loss), row(0));
    f.render_widget(line(lang.assets.help_win), row(1));
    f.render_widget(line(lang.assets.help_mark), row(size.height.saturating_sub(2)));

    let status = match banner {
        Banner::None => lang.assets.help_quit,
        Banner::Won => lang.assets.win_message,
        Banner::Lost => lang.assets.loss_message,
    };
    let status_style = match banner {
        Banner::None => text_style,
        _ => Style::default().fg(palette.alert).bg(palette.background).add_modifier(Modifier::BOLD),
    };
    let pad = (size.width as usize).saturating_sub(status.width()) / 2;
    let spans = Spans::from(vec![Span::raw(" ".repeat(pad)), Span::styled(status, status_style)]);
    f.render_widget(Paragraph::new(spans), row(size.height.saturating_sub(1)));
}

fn draw_board<B: Backend>(f: &mut Frame<B>, scene: &Scene<'_>, g: Geometry, frame: u16, palette: &Palette, lang: &Lang) {
    let (ext_w, ext_h) = g.extent();
    let outer = Rect::new(
        g.origin.0 - frame,
        g.origin.1 - frame,
        ext_w + 2 * frame,
        ext_h + 2 * frame,
    );
    let board_style = Style::default().bg(palette.board).fg(palette.text);
    let mut block = Block::default().style(board_style);
    if frame > 0 {
        block = block
            .borders(Borders::ALL)
            .title(lang.assets.title)
            .title_alignment(Alignment::Center);
    }
    f.render_widget(block, outer);

    let board = scene.board;
    let mut lines = vec![];
    for y in 0..board.height() {
        for sub_row in 0..g.cell.1 {
            let mut spans = vec![];
            for x in 0..board.width() {
                if x > 0 && g.gap.0 > 0 {
                    spans.push(Span::styled(" ".repeat(g.gap.0 as usize), board_style));
                }
                let (glyph, style) = cell_face(board, x, y, scene.hover == Some((x, y)), palette);
                let glyph = if sub_row == g.cell.1 / 2 { glyph } else { " ".to_string() };
                spans.push(Span::styled(format!("{:^w$}", glyph, w = g.cell.0 as usize), style));
            }
            lines.push(Spans::from(spans));
        }
        if y + 1 < board.height() {
            for _ in 0..g.gap.1 {
                lines.push(Spans::from(Span::styled(" ".repeat(ext_w as usize), board_style)));
            }
        }
    }
    let grid = Rect::new(g.origin.0, g.origin.1, ext_w, ext_h);
    f.render_widget(Paragraph::new(Text::from(lines)), grid);
}

/// Glyph and style of one cell
fn cell_face(board: &Board, x: usize, y: usize, hovered: bool, palette: &Palette) -> (String, Style) {
    let Some(cell) = board.cell(x, y) else {
        return (String::new(), Style::default());
    };
    if !cell.revealed {
        let bg = if cell.marked {
            palette.marked
        } else if hovered {
            palette.hover
        } else {
            palette.covered
        };
        return (" ".to_string(), Style::default().bg(bg));
    }
    let open = Style::default().bg(palette.revealed);
    if cell.mine {
        ("●".to_string(), open.fg(palette.mine))
    } else if cell.adj > 0 {
        (cell.adj.to_string(), open.fg(palette.number(cell.adj)).add_modifier(Modifier::BOLD))
    } else {
        (" ".to_string(), open)
    }
}

/// Framed board lies inside the frame area
fn fits(g: &Geometry, frame: u16, size: Rect) -> bool {
    let (ext_w, ext_h) = g.extent();
    g.origin.0 >= size.x + frame
        && g.origin.1 >= size.y + frame
        && g.origin.0 + ext_w + frame <= size.x + size.width
        && g.origin.1 + ext_h + frame <= size.y + size.height
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// What a single terminal event means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    None,
    Pointer(u16, u16),
    Click(u16, u16),
    MarkDown,
    MarkUp,
    Resize(u16, u16),
    Quit,
}

fn classify(ev: &Event) -> Signal {
    match ev {
        Event::Mouse(me) => match me.kind {
            MouseEventKind::Down(MouseButton::Left) => Signal::Click(me.column, me.row),
            MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) | MouseEventKind::Up(_) => {
                Signal::Pointer(me.column, me.row)
            }
            _ => Signal::None,
        },
        Event::Key(KeyEvent { code, modifiers, kind, .. }) => match (code, kind) {
            (KeyCode::Char(' '), KeyEventKind::Release) => Signal::MarkUp,
            (KeyCode::Char(' '), _) => Signal::MarkDown,
            (_, KeyEventKind::Release) => Signal::None,
            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Signal::Quit,
            (KeyCode::Char('c'), _) if modifiers.contains(KeyModifiers::CONTROL) => Signal::Quit,
            _ => Signal::None,
        },
        Event::Resize(w, h) => Signal::Resize(*w, *h),
        _ => Signal::None,
    }
}

/// Mouse and keyboard state collected from crossterm events
pub struct TermInput {
    pointer: Option<(u16, u16)>,
    area: (u16, u16),
    // when the mark key was last pressed; None while released
    mark_down: Option<Instant>,
    // runtime detection whether real key-release events are supported by the terminal
    supports_key_release: bool,
}

impl TermInput {
    pub fn new() -> io::Result<Self> {
        Ok(TermInput::with_area(terminal::size()?))
    }

    fn with_area(area: (u16, u16)) -> Self {
        TermInput {
            pointer: None,
            area,
            mark_down: None,
            supports_key_release: cfg!(windows),
        }
    }

    /// Fold one signal into the held state; returns true for a click
    fn apply(&mut self, signal: Signal, now: Instant) -> bool {
        match signal {
            Signal::Pointer(x, y) => self.pointer = Some((x, y)),
            Signal::Click(x, y) => {
                self.pointer = Some((x, y));
                return true;
            }
            Signal::MarkDown => self.mark_down = Some(now),
            Signal::MarkUp => {
                self.mark_down = None;
                self.supports_key_release = true;
            }
            Signal::Resize(w, h) => self.area = (w, h),
            Signal::None | Signal::Quit => {}
        }
        false
    }

    fn mark_held(&mut self, now: Instant) -> bool {
        if let Some(t0) = self.mark_down {
            if !self.supports_key_release && now.duration_since(t0) >= MARK_RELEASE_AFTER {
                self.mark_down = None;
            }
        }
        self.mark_down.is_some()
    }

    /// Read events until `deadline`, stopping early on quit
    fn drain_until(&mut self, deadline: Instant, mut on_click: impl FnMut()) -> io::Result<bool> {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(false);
            }
            let signal = classify(&event::read()?);
            if signal == Signal::Quit {
                return Ok(true);
            }
            if self.apply(signal, Instant::now()) {
                on_click();
            }
        }
    }
}

impl InputSource for TermInput {
    fn next_frame(&mut self, timeout: Duration) -> io::Result<InputFrame> {
        let mut clicked = false;
        let quit = self.drain_until(Instant::now() + timeout, || clicked = true)?;
        let mark_held = self.mark_held(Instant::now());
        Ok(InputFrame {
            pointer: self.pointer,
            clicked,
            mark_held,
            area: self.area,
            quit,
        })
    }

    fn pause(&mut self, duration: Duration) -> io::Result<Flow> {
        let quit = self.drain_until(Instant::now() + duration, || trace!("click ignored during pause"))?;
        Ok(if quit { Flow::Quit } else { Flow::Continue })
    }
}
