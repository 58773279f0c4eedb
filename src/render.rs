use crate::body::{BodyId, BodyKind, BodyTree};
use crate::camera::Camera;
use crate::math::Vec2;
use crate::shading::KernelTable;
use crate::system::Universe;
use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::fmt;
use std::io::{self, Write};

pub const GALAXY_MARKER: char = 'x';

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// No kernel registered for this kind: a setup bug, not a transient failure.
    MissingKernel { kind: BodyKind, body: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingKernel { kind, body } => {
                write!(f, "no shading kernel registered for {kind} (body {body:?})")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/* -----------------------------
   Frame buffer
------------------------------ */

/// One character per cell, rows top to bottom. Space means empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    w: usize,
    h: usize,
    cells: Vec<char>,
}

impl Frame {
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, ' ')
    }

    pub fn filled(w: usize, h: usize, ch: char) -> Self {
        Self {
            w,
            h,
            cells: vec![ch; w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }
    pub fn height(&self) -> usize {
        self.h
    }
    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(y * self.w + x)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    /// Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, ch: char) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = ch;
        }
    }

    pub fn row(&self, y: usize) -> String {
        if y >= self.h {
            return String::new();
        }
        self.cells[y * self.w..(y + 1) * self.w].iter().collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.h).map(move |y| self.row(y))
    }

    /// Writes `s` from column 0 of row `y`, cut at the frame width.
    pub fn write_line(&mut self, y: usize, s: &str) {
        if y >= self.h {
            return;
        }
        for (x, ch) in s.chars().take(self.w).enumerate() {
            self.cells[y * self.w + x] = ch;
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.h {
            if y > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&self.row(y))?;
        }
        Ok(())
    }
}

/// Writes the whole frame in one go after a cursor-home, no clear. Rows are joined with
/// `\r\n` because raw mode turns off newline translation.
pub fn present<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    let body = frame.rows().collect::<Vec<_>>().join("\r\n");
    queue!(out, BeginSynchronizedUpdate, cursor::MoveTo(0, 0), Print(body), EndSynchronizedUpdate)?;
    out.flush()
}

/* -----------------------------
   Renderer
------------------------------ */

pub struct Renderer {
    w: usize,
    h: usize,
    kernels: KernelTable,
}

impl Renderer {
    pub fn new(w: usize, h: usize) -> Self {
        Self::with_kernels(w, h, KernelTable::builtin())
    }

    pub fn with_kernels(w: usize, h: usize, kernels: KernelTable) -> Self {
        Self { w, h, kernels }
    }

    pub fn width(&self) -> usize {
        self.w
    }
    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
    }

    fn half_extent(&self) -> Vec2 {
        Vec2::new(self.w as f64 / 2.0, self.h as f64 / 2.0)
    }

    /// `(world - center) * zoom + half extent`, truncated toward zero.
    pub fn world_to_screen(&self, camera: &Camera, p: Vec2) -> (i32, i32) {
        let s = (p - camera.center()) * camera.zoom() + self.half_extent();
        (s.x as i32, s.y as i32)
    }

    pub fn screen_to_world(&self, camera: &Camera, sx: i32, sy: i32) -> Vec2 {
        let s = Vec2::new(sx as f64, sy as f64) - self.half_extent();
        s * (1.0 / camera.zoom()) + camera.center()
    }

    pub fn on_screen(&self, (sx, sy): (i32, i32)) -> bool {
        sx >= 0 && sy >= 0 && (sx as usize) < self.w && (sy as usize) < self.h
    }

    /// Draws every subtree under `roots`, then the status line over the last row.
    pub fn render(
        &self,
        tree: &BodyTree,
        roots: &[BodyId],
        camera: &Camera,
        status: Option<&str>,
    ) -> Result<Frame, RenderError> {
        let mut frame = Frame::new(self.w, self.h);
        for &root in roots {
            self.draw_hierarchy(tree, root, camera, &mut frame)?;
        }
        self.overlay_status(&mut frame, status);
        Ok(frame)
    }

    /// Like [`render`](Self::render) over every system, with an `x` at each galaxy centre.
    pub fn render_universe(
        &self,
        universe: &Universe,
        camera: &Camera,
        status: Option<&str>,
    ) -> Result<Frame, RenderError> {
        let mut frame = Frame::new(self.w, self.h);
        for galaxy in &universe.galaxies {
            let (gx, gy) = self.world_to_screen(camera, galaxy.pos);
            if self.on_screen((gx, gy)) {
                frame.set(gx, gy, GALAXY_MARKER);
            }
            for system in &galaxy.systems {
                self.draw_hierarchy(&universe.bodies, system.root, camera, &mut frame)?;
            }
        }
        self.overlay_status(&mut frame, status);
        Ok(frame)
    }

    fn draw_hierarchy(
        &self,
        tree: &BodyTree,
        root: BodyId,
        camera: &Camera,
        frame: &mut Frame,
    ) -> Result<(), RenderError> {
        // an off-screen parent can still have children in view, so nothing is pruned
        for id in tree.walk(root) {
            let Some(body) = tree.get(id) else {
                continue;
            };
            let screen = self.world_to_screen(camera, body.pos);
            if !self.on_screen(screen) {
                continue;
            }
            let shade = self.kernels.get(body.kind).ok_or_else(|| RenderError::MissingKernel {
                kind: body.kind,
                body: body.name.clone(),
            })?;
            shade(body, frame, screen.0, screen.1, camera);
        }
        Ok(())
    }

    fn overlay_status(&self, frame: &mut Frame, status: Option<&str>) {
        if let Some(s) = status {
            if self.h > 0 {
                frame.write_line(self.h - 1, s);
            }
        }
    }
}

/* -----------------------------
   Terminal session
------------------------------ */

pub struct Terminal {
    out: io::Stdout,
    pub cols: u16,
    pub rows: u16,
}

impl Terminal {
    pub fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, DisableLineWrap, Clear(ClearType::All))?;
        terminal::enable_raw_mode()?;
        let (cols, rows) = terminal::size()?;
        Ok(Self { out, cols, rows })
    }

    pub fn end(&mut self) -> anyhow::Result<()> {
        queue!(self.out, Clear(ClearType::All), cursor::Show, EnableLineWrap, LeaveAlternateScreen)?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Returns true when the size changed. Clears once so stale rows don't linger.
    pub fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        execute!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub fn present(&mut self, frame: &Frame) -> io::Result<()> {
        present(&mut self.out, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{CelestialBody, PlanetKind};
    use crate::orbit::Orbit;
    use crate::system::{Galaxy, SolarSystem};

    #[test]
    fn projection_centres_the_camera() {
        let r = Renderer::new(80, 24);
        let cam = Camera::new((100.0, -50.0), 2.0);
        assert_eq!(r.world_to_screen(&cam, Vec2::new(100.0, -50.0)), (40, 12));
        assert_eq!(r.world_to_screen(&cam, Vec2::new(105.0, -48.0)), (50, 16));
        // truncation, not floor
        assert_eq!(r.world_to_screen(&Camera::default(), Vec2::new(-40.5, 0.0)), (0, 12));
    }

    #[test]
    fn projection_round_trip_within_a_cell() {
        let r = Renderer::new(100, 40);
        for (cx, cy, z) in [(0.0, 0.0, 1.0), (12.5, -7.25, 3.3), (-300.0, 42.0, 0.4)] {
            let cam = Camera::new((cx, cy), z);
            for i in -10..10 {
                let p = Vec2::new(cx + i as f64 * 1.37 / z, cy - i as f64 * 0.91 / z);
                let (sx, sy) = r.world_to_screen(&cam, p);
                let back = r.screen_to_world(&cam, sx, sy);
                let cell = 1.0 / z;
                assert!((back.x - p.x).abs() <= cell, "{p:?} -> {back:?}");
                assert!((back.y - p.y).abs() <= cell, "{p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn status_line_overwrites_last_row() {
        let mut tree = BodyTree::new();
        let sun = tree.add_root(CelestialBody::star("Sun", 1.0, 3.0).with_pos((0.0, 4.0)));
        let r = Renderer::new(12, 10);
        let frame = r.render(&tree, &[sun], &Camera::default(), Some("status line too long")).unwrap();
        assert_eq!(frame.row(9), "status line ");
        assert_eq!(frame.row(9).chars().count(), 12);
        assert_eq!(frame.get(7, 9), Some('l'));
        // rows above the status still carry the star
        assert_eq!(frame.get(6, 8), Some('o'));
    }

    #[test]
    fn culled_parent_still_draws_children() {
        let mut tree = BodyTree::new();
        let sun = tree.add_root(CelestialBody::star("Far", 1.0, 1.0).with_pos((-500.0, 0.0)));
        let planet = tree.add_child(
            sun,
            CelestialBody::planet("Near", PlanetKind::GasGiant, 1.0, 1.0),
            Some(Orbit::circular(500.0, 0.0, 1000.0).unwrap()),
        );
        tree.update(sun, 0.0);
        assert_eq!(tree.get(planet).unwrap().pos, Vec2::new(0.0, 0.0));

        let r = Renderer::new(20, 10);
        let frame = r.render(&tree, &[sun], &Camera::default(), None).unwrap();
        let drawn = frame.cells().iter().filter(|c| **c != ' ').count();
        assert!(drawn > 0);
    }

    #[test]
    fn missing_kernel_aborts_render() {
        let mut tree = BodyTree::new();
        let hole = tree.add_root(CelestialBody::black_hole("Sgr A*", 1e6, 1.0));
        let r = Renderer::new(10, 10);
        let err = r.render(&tree, &[hole], &Camera::default(), None).unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingKernel {
                kind: BodyKind::BlackHole,
                body: "Sgr A*".to_string()
            }
        );
        assert!(err.to_string().contains("black hole"));
    }

    #[test]
    fn off_screen_unknown_kind_is_not_dispatched() {
        let mut tree = BodyTree::new();
        let rock = tree.add_root(CelestialBody::asteroid("Rock", 1.0, 1.0).with_pos((1e4, 1e4)));
        let r = Renderer::new(10, 10);
        assert!(r.render(&tree, &[rock], &Camera::default(), None).is_ok());
    }

    #[test]
    fn custom_kernel_registration() {
        fn block(_: &CelestialBody, f: &mut Frame, x: i32, y: i32, _: &Camera) {
            f.set(x, y, '#');
        }
        let mut kernels = KernelTable::builtin();
        kernels.register(BodyKind::Debris, block);
        let mut tree = BodyTree::new();
        let d = tree.add_root(CelestialBody::new("junk", BodyKind::Debris, 1.0, 1.0));
        let r = Renderer::with_kernels(4, 4, kernels);
        let frame = r.render(&tree, &[d], &Camera::default(), None).unwrap();
        assert_eq!(frame.get(2, 2), Some('#'));
    }

    #[test]
    fn galaxy_marker_and_systems() {
        let mut u = Universe::new();
        let star = u.bodies.add_root(CelestialBody::star("Sun", 1.0, 0.5).with_pos((3.0, 0.0)));
        let mut g = Galaxy::new("Home", (-5.0, -2.0));
        g.systems.push(SolarSystem::new("Sol", star));
        u.add_galaxy(g);
        let r = Renderer::new(20, 10);
        let frame = r.render_universe(&u, &Camera::default(), None).unwrap();
        assert_eq!(frame.get(5, 3), Some(GALAXY_MARKER));
        assert_eq!(frame.get(13, 5), Some('@'));
    }

    #[test]
    fn present_homes_cursor_and_writes_rows() {
        let mut frame = Frame::new(3, 2);
        frame.set(0, 0, 'a');
        frame.set(2, 1, 'b');
        let mut out: Vec<u8> = Vec::new();
        present(&mut out, &frame).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("\x1b[1;1Ha  \r\n  b"), "{s:?}");
        assert!(!s.contains("\x1b[2J"));
        assert_eq!(frame.to_string(), "a  \n  b");
    }

    #[test]
    fn frame_bounds_are_ignored() {
        let mut f = Frame::new(2, 2);
        f.set(-1, 0, 'z');
        f.set(2, 0, 'z');
        f.set(0, 5, 'z');
        assert!(f.cells().iter().all(|c| *c == ' '));
        assert_eq!(f.get(-1, 0), None);
        f.write_line(7, "nope");
        f.write_line(0, "okay");
        assert_eq!(f.row(0), "ok");
    }
}
