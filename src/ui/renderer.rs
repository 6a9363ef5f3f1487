/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Compose the next frame into `front` (a grid of Cells)
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for cells that changed, batched with
///      `queue!` and flushed once
///   4. Swap front/back
///
/// The play field is continuous (1024x768 by default); a `Viewport` scales
/// it onto whatever terminal area is left below the HUD.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geometry::{Body, Field};
use crate::domain::monkey::Monkey;
use crate::domain::player::PowerUp;
use crate::domain::projectile::ProjectileKind;
use crate::domain::entity::PickupKind;
use crate::sim::world::{Phase, WorldState};

// ── Palette ──

const BASE_BG: Color = Color::Rgb { r: 18, g: 18, b: 30 };
const HUD_BG: Color = Color::Rgb { r: 40, g: 20, b: 20 };
const GIRDER: Color = Color::Rgb { r: 210, g: 60, b: 90 };
const LADDER: Color = Color::Rgb { r: 90, g: 200, b: 220 };
const BARREL: Color = Color::Rgb { r: 170, g: 110, b: 50 };
const MONKEY: Color = Color::Rgb { r: 150, g: 100, b: 60 };
const BOSS: Color = Color::Rgb { r: 120, g: 70, b: 30 };
const BANANA: Color = Color::Yellow;
const MESSAGE_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: BASE_BG };
    /// Differs from every real cell; forces a full repaint.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg, bg: BASE_BG }
    }

    fn on(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell::on(ch, fg, bg));
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(s.chars().count()) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::on(' ', Color::White, bg));
        }
    }
}

// ── Viewport: field coordinates → terminal cells ──

/// Field area on screen: `cols`x`rows` cells starting at row `top`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    top: usize,
    cols: usize,
    rows: usize,
    sx: f64,
    sy: f64,
}

impl Viewport {
    fn fit(field: &Field, term_w: usize, term_h: usize, top: usize, reserved: usize) -> Self {
        let cols = term_w.max(1);
        let rows = term_h.saturating_sub(top + reserved).max(1);
        Viewport {
            top,
            cols,
            rows,
            sx: cols as f64 / field.width.max(1.0),
            sy: rows as f64 / field.height.max(1.0),
        }
    }

    /// Cell containing field point (x, y), if on screen.
    fn cell(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let (c, r) = ((x * self.sx).floor(), (y * self.sy).floor());
        if c < 0.0 || r < 0.0 || c >= self.cols as f64 || r >= self.rows as f64 {
            return None;
        }
        Some((c as usize, r as usize + self.top))
    }

    /// Inclusive cell span covered by `body`, at least one cell each way,
    /// clipped to the viewport. None when fully off screen.
    fn span(&self, body: &Body) -> Option<(usize, usize, usize, usize)> {
        if body.right() <= 0.0 || body.bottom() <= 0.0 {
            return None;
        }
        let c0 = (body.left() * self.sx).floor().max(0.0);
        let r0 = (body.top() * self.sy).floor().max(0.0);
        let c1 = ((body.right() * self.sx).ceil() - 1.0).max(c0).min(self.cols as f64 - 1.0);
        let r1 = ((body.bottom() * self.sy).ceil() - 1.0).max(r0).min(self.rows as f64 - 1.0);
        if c0 > c1 || r0 > r1 {
            return None;
        }
        Some((c0 as usize, r0 as usize + self.top, c1 as usize, r1 as usize + self.top))
    }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const FIELD_ROW: usize = 1;
/// Message bar and help line below the field.
const RESERVED_ROWS: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        self.fit_terminal()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Track the terminal size; a change forces a full repaint.
    fn fit_terminal(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let (tw, th) = (tw as usize, th as usize);
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.front.resize(tw, th);
            self.back.resize(tw, th);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        self.fit_terminal()?;
        if self.last_phase != Some(world.phase) {
            self.invalidate()?;
            self.last_phase = Some(world.phase);
        }

        self.front.clear();
        match world.phase {
            Phase::Title => self.compose_title(world),
            Phase::Playing => self.compose_game(world),
            Phase::LevelCleared => {
                self.compose_game(world);
                self.compose_banner(&[
                    &format!("LEVEL {} CLEAR!", world.current_level),
                    &format!("Score {}", world.final_score),
                    "[Enter] next level",
                ], Color::Green);
            }
            Phase::GameOver => {
                self.compose_game(world);
                self.compose_banner(&["GAME OVER", "Score 0", "[Enter] title  [Esc] quit"], Color::Red);
            }
            Phase::Victory => {
                self.compose_game(world);
                self.compose_banner(&[
                    "YOU WIN!",
                    &format!("Final score {}", world.final_score),
                    "[Enter] title  [Esc] quit",
                ], Color::Yellow);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) { continue; }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn viewport(&self, w: &WorldState) -> Viewport {
        Viewport::fit(&w.tuning.field, self.front.width, self.front.height, FIELD_ROW, RESERVED_ROWS)
    }

    fn compose_game(&mut self, w: &WorldState) {
        let view = self.viewport(w);
        self.compose_hud(w);

        for p in &w.platforms {
            self.fill(&view, &p.body, Cell::new('▀', GIRDER));
        }
        for l in &w.ladders {
            self.fill(&view, &l.body, Cell::new('#', LADDER));
        }
        for pickup in w.pickups.iter().filter(|p| !p.collected) {
            let cell = match pickup.kind {
                PickupKind::Hammer => Cell::new('T', Color::White),
                PickupKind::Blaster => Cell::new('⌐', Color::Cyan),
            };
            self.fill(&view, &pickup.body, cell);
        }
        for b in w.barrels.iter().filter(|b| !b.is_destroyed()) {
            self.fill(&view, &b.body, Cell::new('O', BARREL));
        }
        for m in w.monkeys.iter().filter(|m| !m.is_destroyed()) {
            self.fill(&view, &m.body, monkey_cell(m));
        }
        if let Some(boss) = &w.boss {
            let ch = if boss.is_dead() { 'x' } else { 'K' };
            self.fill(&view, &boss.body, Cell::new(ch, BOSS));
        }
        // projectiles are small; one cell at the center
        for p in w.bullets.iter().chain(&w.bananas) {
            let cell = match p.kind {
                ProjectileKind::Bullet => Cell::new('-', Color::White),
                ProjectileKind::Banana => Cell::new(')', BANANA),
            };
            if let Some((col, row)) = view.cell(p.body.x, p.body.y) {
                self.front.set(col, row, cell);
            }
        }

        let player_fg = match w.player.power {
            PowerUp::None => Color::Red,
            PowerUp::Hammer => Color::White,
            PowerUp::Blaster { .. } => Color::Cyan,
        };
        self.fill(&view, &w.player.body, Cell::new('@', player_fg));

        let msg_row = view.top + view.rows;
        if !w.message.is_empty() {
            self.front.fill_row(msg_row, MESSAGE_BG);
            self.front.put_str(1, msg_row, &w.message, Color::Black, MESSAGE_BG);
        }
        let help = " ←→ walk  ↑↓ climb  Space jump  F fire  P pause  Esc title";
        self.front.put_str(0, msg_row + 1, help, Color::DarkGrey, BASE_BG);
    }

    fn compose_hud(&mut self, w: &WorldState) {
        let power = match w.player.power {
            PowerUp::None => String::new(),
            PowerUp::Hammer => "HAMMER".to_string(),
            PowerUp::Blaster { ammo } => format!("BLASTER x{ammo}"),
        };
        let boss = w.boss.as_ref().map_or(String::new(), |b| format!("BOSS {}", b.health));
        let hud = format!(
            " L{} {:<16} SCORE {:<7} TIME {:<4} {:<8} {}",
            w.current_level, w.level_name, w.score(), w.seconds_left(), boss, power,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn fill(&mut self, view: &Viewport, body: &Body, cell: Cell) {
        let Some((c0, r0, c1, r1)) = view.span(body) else { return };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.front.set(col, row, cell);
            }
        }
    }

    /// Centered box of text lines over the field.
    fn compose_banner(&mut self, lines: &[&str], fg: Color) {
        let mid = self.front.height / 2;
        let top = mid.saturating_sub(lines.len() / 2 + 1);
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
        let pad = " ".repeat(width);
        self.front.put_centered(top, &pad, fg, Color::Black);
        for (i, line) in lines.iter().enumerate() {
            let padded = format!("{line:^width$}");
            self.front.put_centered(top + 1 + i, &padded, fg, Color::Black);
        }
        self.front.put_centered(top + 1 + lines.len(), &pad, fg, Color::Black);
    }

    fn compose_title(&mut self, w: &WorldState) {
        let art = [
            r" ___                   _   _   _              ",
            r"| _ ) __ _ _ _ _ _ ___| | | | | |___ _ __     ",
            r"| _ \/ _` | '_| '_/ -_) | | |_| / _ \ '_ \    ",
            r"|___/\__,_|_| |_| \___|_| |_| |_\___/ .__/    ",
            r"                                    |_|       ",
        ];
        let top = self.front.height.saturating_sub(art.len() + 10) / 2;
        for (i, line) in art.iter().enumerate() {
            self.front.put_centered(top + i, line, GIRDER, BASE_BG);
        }

        let mut row = top + art.len() + 2;
        let levels = if w.total_levels > 0 {
            format!("{} levels: press 1-{} to pick one", w.total_levels, w.total_levels.min(9))
        } else {
            "no levels found".to_string()
        };
        self.front.put_centered(row, "[Enter] start", Color::White, BASE_BG);
        row += 1;
        self.front.put_centered(row, &levels, Color::Grey, BASE_BG);
        row += 2;
        for line in [
            "Jump barrels for points, grab the hammer to smash them,",
            "and reach the boss before the clock runs out.",
        ] {
            self.front.put_centered(row, line, Color::DarkGrey, BASE_BG);
            row += 1;
        }
        if !w.message.is_empty() {
            self.front.put_centered(row + 1, &w.message, Color::Black, MESSAGE_BG);
        }
    }
}

fn monkey_cell(m: &Monkey) -> Cell {
    if m.is_thrower() { Cell::new('M', BANANA) } else { Cell::new('m', MONKEY) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        // 128x48 field area for a 1024x768 field: 8x16 units per cell
        Viewport::fit(&Field::default(), 128, 51, 1, 2)
    }

    #[test]
    fn viewport_fills_area_below_hud() {
        let v = view();
        assert_eq!((v.cols, v.rows, v.top), (128, 48, 1));
        assert_eq!(v.sx, 0.125);
        assert_eq!(v.sy, 0.0625);
    }

    #[test]
    fn points_map_to_cells() {
        let v = view();
        assert_eq!(v.cell(0.0, 0.0), Some((0, 1)));
        assert_eq!(v.cell(1023.0, 767.0), Some((127, 48)));
        assert_eq!(v.cell(1024.0, 10.0), None);
        assert_eq!(v.cell(-1.0, 10.0), None);
    }

    #[test]
    fn bodies_cover_at_least_one_cell() {
        let v = view();
        // platform tile 100x20 at (50, 758): columns 0..=12, rows 46..=47
        assert_eq!(v.span(&Body::new(50.0, 758.0, 100.0, 20.0)), Some((0, 47, 12, 48)));
        // a bullet thinner than a cell still shows
        let (c0, r0, c1, r1) = v.span(&Body::new(400.0, 728.0, 12.0, 6.0)).unwrap();
        assert!(c0 <= c1 && r0 <= r1);
    }

    #[test]
    fn offscreen_bodies_are_clipped() {
        let v = view();
        let (_, _, c1, _) = v.span(&Body::new(1050.0, 758.0, 100.0, 20.0)).unwrap();
        assert_eq!(c1, 127);
        assert_eq!(v.span(&Body::new(2000.0, 100.0, 30.0, 30.0)), None);
    }

    #[test]
    fn frame_buffer_ignores_out_of_range_writes() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.put_str(2, 0, "abc", Color::White, BASE_BG);
        assert_eq!(fb.get(2, 0).ch, 'a');
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(9, 9), Cell::BLANK);
    }
}
