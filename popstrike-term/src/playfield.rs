use std::io::{self, Write};
use std::iter::zip;

use popstrike_core::config::Config;
use popstrike_core::event::Event;
use popstrike_core::geometry::{Disc, Vec2};
use popstrike_core::lane::LaneId;
use popstrike_core::simulation::Simulation;
use rand::Rng;
use rustix::termios::Winsize;

/// Space kept around the lanes, in world units.
const MARGIN: f32 = 0.5;
const ARROW_HEAD_RADIUS: f32 = 0.3;
/// How long the ring around a popped note stays visible, in seconds.
const BURST_DURATION: f32 = 0.15;
/// How much the ring grows over its lifetime, relative to the note radius.
const BURST_GROWTH: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Track,
    HitLine,
    HitWindow,
    Note(LaneId),
    Burst,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Paint {
    Default,
    Color(Color),
    /// Red background of the given intensity.
    Tint(u8),
}

/// Maps world coordinates onto a grid of pixels.
///
/// Every terminal cell holds two pixels stacked vertically, which makes pixels roughly square.
#[derive(Debug, Clone, Copy, PartialEq)]
struct View {
    /// Pixels per world unit.
    scale: f32,
    /// World position of the top left corner of the grid.
    origin: Vec2,
    width: usize,
    height: usize,
}

struct Canvas {
    view: View,
    pixels: Vec<Option<Color>>,
}

struct Burst {
    center: Vec2,
    radius: f32,
    age: f32,
}

pub struct Playfield {
    config: Config,
    size: Winsize,
    canvas: Canvas,
    bursts: Vec<Burst>,
}

impl View {
    fn new(config: &Config, size: Winsize) -> Self {
        let top = config.spawn_y + config.note_radius;
        let bottom = config.despawn_y;
        let half_width = config.lane_offset_x + config.note_offset + config.note_radius + MARGIN;

        let rows = usize::from(size.ws_row) * 2;
        let cols = usize::from(size.ws_col);

        let scale = f32::min(
            rows as f32 / (top - bottom),
            cols as f32 / (half_width * 2.),
        );
        let width = ((half_width * 2. * scale).ceil() as usize).min(cols);

        Self {
            scale,
            origin: Vec2::new(
                -(width as f32) / scale / 2.,
                bottom + rows as f32 / scale,
            ),
            width,
            height: rows,
        }
    }

    fn to_pixel(&self, point: Vec2) -> (i32, i32) {
        let x = (point.x - self.origin.x) * self.scale;
        let y = (self.origin.y - point.y) * self.scale;
        (x.floor() as i32, y.floor() as i32)
    }

    /// Returns the world position of the center of a pixel.
    fn to_world(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            self.origin.x + (x as f32 + 0.5) / self.scale,
            self.origin.y - (y as f32 + 0.5) / self.scale,
        )
    }
}

impl Canvas {
    fn new(view: View) -> Self {
        Self {
            view,
            pixels: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.pixels.clear();
        self.pixels.resize(self.view.width * self.view.height, None);
    }

    #[cfg(test)]
    fn get(&self, x: i32, y: i32) -> Option<Color> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        if x >= self.view.width || y >= self.view.height {
            return None;
        }
        self.pixels[y * self.view.width + x]
    }

    fn set(&mut self, x: i32, y: i32, color: Color) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x < self.view.width && y < self.view.height {
            self.pixels[y * self.view.width + x] = Some(color);
        }
    }

    fn vline(&mut self, x: f32, color: Color) {
        let (x, _) = self.view.to_pixel(Vec2::new(x, 0.));
        for y in 0..self.view.height as i32 {
            self.set(x, y, color);
        }
    }

    fn hline(&mut self, x1: f32, x2: f32, y: f32, color: Color) {
        let (start, row) = self.view.to_pixel(Vec2::new(x1.min(x2), y));
        let (end, _) = self.view.to_pixel(Vec2::new(x1.max(x2), y));
        for x in start..=end {
            self.set(x, row, color);
        }
    }

    /// Fills the pixels whose centers lie within `outer` but not within `inner`.
    fn fill(&mut self, outer: Disc, inner: Option<Disc>, color: Color) {
        let corner = Vec2::new(outer.radius, outer.radius);
        let (x1, y2) = self.view.to_pixel(outer.center - corner);
        let (x2, y1) = self.view.to_pixel(outer.center + corner);

        // Only visit pixels that exist.
        let (x1, y1) = (x1.max(0), y1.max(0));
        let x2 = x2.min(self.view.width as i32 - 1);
        let y2 = y2.min(self.view.height as i32 - 1);

        for y in y1..=y2 {
            for x in x1..=x2 {
                let point = self.view.to_world(x, y);
                if outer.contains(point) && !inner.is_some_and(|inner| inner.contains(point)) {
                    self.set(x, y, color);
                }
            }
        }
    }
}

impl Burst {
    fn disc(&self) -> Disc {
        let t = self.age / BURST_DURATION;
        Disc::new(self.center, self.radius * (1. + BURST_GROWTH * t))
    }
}

impl Playfield {
    pub fn new(config: Config, size: Winsize) -> Self {
        Self {
            config,
            size,
            canvas: Canvas::new(View::new(&config, size)),
            bursts: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: Winsize) {
        self.size = size;
        self.canvas = Canvas::new(View::new(&self.config, size));
    }

    pub fn event(&mut self, event: &Event) {
        if let Event::NotePopped { position, .. } = *event {
            self.bursts.push(Burst {
                center: position,
                radius: self.config.note_radius,
                age: 0.,
            });
        }
    }

    pub fn advance(&mut self, dt: f32) {
        for burst in &mut self.bursts {
            burst.age += dt;
        }
        self.bursts.retain(|burst| burst.age < BURST_DURATION);
    }

    fn playfield_x(&self) -> i32 {
        // Terminal coordinates are 1-based.
        (i32::from(self.size.ws_col) - self.canvas.view.width as i32) / 2 + 1
    }

    fn render<R: Rng>(&mut self, sim: &Simulation<R>) {
        let canvas = &mut self.canvas;
        canvas.clear();

        let radius = self.config.note_radius;
        for lane in sim.lanes() {
            canvas.vline(lane.note_x - radius, Color::Track);
            canvas.vline(lane.note_x + radius, Color::Track);
            canvas.hline(
                lane.note_x - radius,
                lane.note_x + radius,
                lane.tip_position().y,
                Color::HitLine,
            );
        }

        for (lane, strike) in zip(sim.lanes(), sim.strikes()) {
            if strike.is_active() {
                canvas.fill(lane.hit_window(), None, Color::HitWindow);
            }
        }

        for note in sim.notes() {
            canvas.fill(note.disc(), None, Color::Note(note.lane()));
        }

        let thickness = 1. / canvas.view.scale;
        for burst in &self.bursts {
            let outer = burst.disc();
            let inner = Disc::new(outer.center, outer.radius - thickness);
            canvas.fill(outer, Some(inner), Color::Burst);
        }

        for (lane, strike) in zip(sim.lanes(), sim.strikes()) {
            let tip = lane.strike_position(strike.extension());
            canvas.hline(lane.base_position.x, tip.x, tip.y, Color::Arrow);
            canvas.fill(Disc::new(tip, ARROW_HEAD_RADIUS), None, Color::Arrow);
        }
    }

    pub fn draw<R: Rng>(&mut self, out: &mut impl Write, sim: &Simulation<R>) -> io::Result<()> {
        self.render(sim);

        let x = self.playfield_x();
        let width = self.canvas.view.width;
        if x <= 0 || width == 0 {
            return Ok(());
        }

        let background = tint(sim.flash_alpha());
        let mut last_fg = Paint::Default;
        let mut last_bg = Paint::Default;

        for (i, row) in self.canvas.pixels.chunks_exact(width * 2).enumerate() {
            write!(out, "\x1B[{y};{x}H", y = i + 1)?;

            let (top, bottom) = row.split_at(width);
            for (top, bottom) in zip(top, bottom) {
                let (c, fg, bg) = cell(*top, *bottom, background);

                if let Some(fg) = fg
                    && fg != last_fg
                {
                    write_paint(out, fg, false)?;
                    last_fg = fg;
                }
                if bg != last_bg {
                    write_paint(out, bg, true)?;
                    last_bg = bg;
                }

                write!(out, "{c}")?;
            }
        }

        // Restore color.
        if last_fg != Paint::Default {
            reset_paint(out, false)?;
        }
        if last_bg != Paint::Default {
            reset_paint(out, true)?;
        }

        self.draw_combo(out, sim.combo())
    }

    fn draw_combo(&self, out: &mut impl Write, combo: u32) -> io::Result<()> {
        if combo == 0 {
            return Ok(());
        }

        let text = combo.to_string();
        let x = self.playfield_x() + (self.canvas.view.width as i32 - text.len() as i32) / 2;
        if x <= 0 || self.size.ws_row < 2 {
            return Ok(());
        }
        write!(out, "\x1B[2;{x}H\x1B[1m{text}\x1B[22m")
    }
}

/// Background for the given miss flash opacity.
fn tint(alpha: f32) -> Paint {
    let intensity = (alpha.clamp(0., 1.) * 255.).round() as u8;
    if intensity == 0 {
        Paint::Default
    } else {
        Paint::Tint(intensity)
    }
}

/// Picks the glyph and colors of a cell showing two stacked pixels.
///
/// The foreground is `None` when the glyph doesn't show it.
fn cell(
    top: Option<Color>,
    bottom: Option<Color>,
    background: Paint,
) -> (char, Option<Paint>, Paint) {
    match (top, bottom) {
        (None, None) => (' ', None, background),
        (Some(top), Some(bottom)) if top == bottom => (' ', None, Paint::Color(top)),
        (Some(top), None) => ('▀', Some(Paint::Color(top)), background),
        (None, Some(bottom)) => ('▄', Some(Paint::Color(bottom)), background),
        (Some(top), Some(bottom)) => ('▀', Some(Paint::Color(top)), Paint::Color(bottom)),
    }
}

fn sgr(color: Color) -> u8 {
    match color {
        Color::Track => 90,
        Color::HitLine => 37,
        Color::HitWindow => 33,
        Color::Note(LaneId::Left) => 96,
        Color::Note(LaneId::Right) => 95,
        Color::Burst => 93,
        Color::Arrow => 97,
    }
}

fn write_paint(out: &mut impl Write, paint: Paint, background: bool) -> io::Result<()> {
    match paint {
        Paint::Default => reset_paint(out, background),
        Paint::Color(color) => {
            let code = sgr(color) + if background { 10 } else { 0 };
            write!(out, "\x1B[{code}m")
        }
        Paint::Tint(r) => {
            let layer = if background { 48 } else { 38 };
            write!(out, "\x1B[{layer};2;{r};0;0m")
        }
    }
}

fn reset_paint(out: &mut impl Write, background: bool) -> io::Result<()> {
    out.write_all(if background { b"\x1B[49m" } else { b"\x1B[39m" })
}
