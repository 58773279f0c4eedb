use crate::camera::Camera;
use crate::config::{Settings, MAX_TIME_SCALE, MIN_TIME_SCALE};
use crate::generator::UniverseGenerator;
use crate::input::{collect_input_nonblocking, map_key, Action};
use crate::render::{Frame, RenderError, Renderer, Terminal};
use crate::system::Universe;
use anyhow::Context;
use std::time::{Duration, Instant};

/// Everything one frame needs, minus the terminal.
pub struct Viewer {
    pub universe: Universe,
    pub camera: Camera,
    pub renderer: Renderer,
    pub sim_time: f64,
    pub time_scale: f64,
    pub paused: bool,
    focus: usize,
    should_quit: bool,
}

impl Viewer {
    pub fn new(mut universe: Universe, renderer: Renderer, time_scale: f64) -> Self {
        universe.update(0.0);
        let mut v = Self {
            universe,
            camera: Camera::default(),
            renderer,
            sim_time: 0.0,
            time_scale: time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE),
            paused: false,
            focus: 0,
            should_quit: false,
        };
        v.center_on_focus();
        v
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn focus_name(&self) -> &str {
        self.universe
            .systems()
            .nth(self.focus)
            .map(|s| s.name.as_str())
            .unwrap_or("-")
    }

    fn center_on_focus(&mut self) {
        let root = self.universe.systems().nth(self.focus).map(|s| s.root);
        if let Some(body) = root.and_then(|id| self.universe.bodies.get(id)) {
            self.camera.look_at(body.pos);
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Pan(dx, dy) => {
                let z = self.camera.zoom();
                self.camera.pan(dx / z, dy / z);
            }
            Action::Zoom(f) => self.camera.zoom_by(f),
            Action::TogglePause => self.paused = !self.paused,
            Action::TimeScale(f) => {
                self.time_scale = (self.time_scale * f).clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
            }
            Action::NextSystem => {
                let n = self.universe.systems().count();
                if n > 0 {
                    self.focus = (self.focus + 1) % n;
                }
                self.center_on_focus();
                log::info!("focus -> {}", self.focus_name());
            }
            Action::ResetView => {
                self.camera = self.camera.with_zoom(1.0);
                self.center_on_focus();
            }
            Action::Quit => self.should_quit = true,
        }
    }

    /// Camera easing, then simulation time, then positions. Render reads what this leaves.
    pub fn step(&mut self, real_dt: f64) {
        self.camera.update(real_dt);
        if !self.paused {
            let dt = real_dt * self.time_scale;
            self.sim_time += dt;
            self.universe.bodies.drift_roots(dt);
        }
        self.universe.update(self.sim_time);
    }

    pub fn status_line(&self) -> String {
        format!(
            "t={:.1} zoom={:.2} scale={}x{} focus={} | arrows pan  +/- zoom  space pause  [ ] speed  tab next  q quit",
            self.sim_time,
            self.camera.zoom(),
            self.time_scale,
            if self.paused { " [paused]" } else { "" },
            self.focus_name(),
        )
    }

    pub fn frame(&self) -> Result<Frame, RenderError> {
        let status = self.status_line();
        self.renderer.render_universe(&self.universe, &self.camera, Some(&status))
    }
}

pub fn run(settings: Settings) -> anyhow::Result<()> {
    let universe = UniverseGenerator::new(settings.seed)
        .with_drift(settings.drift)
        .generate_universe(settings.galaxies, settings.systems_per_galaxy)
        .context("universe generation produced an invalid orbit")?;

    let mut term = Terminal::begin()?;
    let res = run_loop(&mut term, universe, &settings);
    finish(res, term.end())
}

/// A loop error outranks a failed restore; the restore error is logged instead of lost.
fn finish(res: anyhow::Result<()>, restored: anyhow::Result<()>) -> anyhow::Result<()> {
    if let (Err(_), Err(e)) = (&res, &restored) {
        log::error!("terminal restore failed: {e:#}");
    }
    res.and(restored)
}

fn run_loop(term: &mut Terminal, universe: Universe, settings: &Settings) -> anyhow::Result<()> {
    let (w, h) = settings.frame_size_for(term.cols, term.rows);
    let mut viewer = Viewer::new(universe, Renderer::new(w, h), settings.time_scale);
    let frame_dt = Duration::from_secs_f64(1.0 / settings.fps_cap as f64);
    let mut last_frame = Instant::now();

    log::info!("frame {}x{} at {} fps, focus {}", w, h, settings.fps_cap, viewer.focus_name());

    while !viewer.should_quit() {
        if term.resize_if_needed()? {
            let (w, h) = settings.frame_size_for(term.cols, term.rows);
            viewer.renderer.resize(w, h);
            log::debug!("resized to {}x{}", w, h);
        }

        for ev in collect_input_nonblocking()? {
            if let Some(action) = map_key(ev) {
                viewer.apply(action);
            }
        }
        if viewer.should_quit() {
            break;
        }

        let now = Instant::now();
        let real_dt = now.saturating_duration_since(last_frame).as_secs_f64().min(0.25);
        last_frame = now;
        viewer.step(real_dt);

        let frame = viewer.frame().inspect_err(|e| log::error!("render aborted: {e}"))?;
        term.present(&frame)?;

        spin_sleep(frame_dt, now);
    }

    log::info!("quit at t={:.1}", viewer.sim_time);
    Ok(())
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{CelestialBody, PlanetKind};
    use crate::math::Vec2;
    use crate::orbit::Orbit;
    use crate::system::{Galaxy, SolarSystem};
    use approx::assert_abs_diff_eq;
    use clap::Parser;

    fn two_systems() -> Universe {
        let mut u = Universe::new();
        let mut g = Galaxy::new("G", (0.0, 0.0));
        for (i, x) in [0.0, 300.0].into_iter().enumerate() {
            let star = u.bodies.add_root(CelestialBody::star(format!("S{i}"), 1.0, 2.0).with_pos((x, 0.0)));
            u.bodies.add_child(
                star,
                CelestialBody::planet(format!("P{i}"), PlanetKind::IceGiant, 1.0, 1.0),
                Some(Orbit::circular(12.0, 0.0, 40.0).unwrap()),
            );
            g.systems.push(SolarSystem::new(format!("Sys{i}"), star));
        }
        u.add_galaxy(g);
        u
    }

    #[test]
    fn starts_centred_on_first_system() {
        let v = Viewer::new(two_systems(), Renderer::new(40, 20), 1.0);
        assert_eq!(v.camera.center(), Vec2::new(0.0, 0.0));
        assert_eq!(v.focus_name(), "Sys0");
        let p0 = v.universe.bodies.find("P0").unwrap();
        assert_eq!(v.universe.bodies.get(p0).unwrap().pos, Vec2::new(12.0, 0.0));
    }

    #[test]
    fn next_system_cycles_focus() {
        let mut v = Viewer::new(two_systems(), Renderer::new(40, 20), 1.0);
        v.apply(Action::NextSystem);
        assert_eq!(v.camera.center(), Vec2::new(300.0, 0.0));
        v.apply(Action::NextSystem);
        assert_eq!(v.focus_name(), "Sys0");
    }

    #[test]
    fn pan_is_in_screen_cells() {
        let mut v = Viewer::new(two_systems(), Renderer::new(40, 20), 1.0);
        v.camera = v.camera.with_zoom(2.0);
        v.apply(Action::Pan(4.0, -4.0));
        assert_eq!(v.camera.center(), Vec2::new(2.0, -2.0));
        v.apply(Action::ResetView);
        assert_eq!(v.camera.center(), Vec2::new(0.0, 0.0));
        assert_eq!(v.camera.zoom(), 1.0);
    }

    #[test]
    fn step_advances_time_unless_paused() {
        let mut v = Viewer::new(two_systems(), Renderer::new(40, 20), 2.0);
        v.step(5.0);
        assert_abs_diff_eq!(v.sim_time, 10.0, epsilon = 1e-12);
        let p0 = v.universe.bodies.find("P0").unwrap();
        let pos = v.universe.bodies.get(p0).unwrap().pos;
        // quarter of a 40-unit period
        assert_abs_diff_eq!(pos.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.y, 12.0, epsilon = 1e-9);

        v.apply(Action::TogglePause);
        v.step(5.0);
        assert_abs_diff_eq!(v.sim_time, 10.0, epsilon = 1e-12);
        assert!(v.status_line().contains("[paused]"));
    }

    #[test]
    fn time_only_runs_forward() {
        let cli = crate::config::Cli::parse_from(["orbitscope", "--time-scale=-3"]);
        let settings = Settings::from_cli(&cli);
        let mut v = Viewer::new(two_systems(), Renderer::new(40, 20), settings.time_scale);
        v.step(0.1);
        let t1 = v.sim_time;
        v.step(0.1);
        assert!(t1 > 0.0);
        assert!(v.sim_time > t1);

        let mut raw = Viewer::new(two_systems(), Renderer::new(40, 20), -5.0);
        raw.step(1.0);
        assert_eq!(raw.sim_time, MIN_TIME_SCALE);
        for _ in 0..20 {
            raw.apply(Action::TimeScale(0.5));
        }
        assert_eq!(raw.time_scale, MIN_TIME_SCALE);
    }

    #[test]
    fn loop_error_survives_failed_restore() {
        let both = finish(Err(anyhow::anyhow!("render aborted")), Err(anyhow::anyhow!("restore")));
        assert_eq!(both.unwrap_err().to_string(), "render aborted");
        let restore_only = finish(Ok(()), Err(anyhow::anyhow!("restore")));
        assert_eq!(restore_only.unwrap_err().to_string(), "restore");
        assert!(finish(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn drifting_system_carries_its_planets() {
        let mut u = two_systems();
        let s0 = u.systems().next().unwrap().root;
        u.bodies.get_mut(s0).unwrap().velocity = Vec2::new(1.0, 0.0);
        let mut v = Viewer::new(u, Renderer::new(40, 20), 1.0);
        v.step(10.0);
        let star = v.universe.bodies.get(s0).unwrap().pos;
        assert_abs_diff_eq!(star.x, 10.0, epsilon = 1e-9);
        let p0 = v.universe.bodies.find("P0").unwrap();
        let planet = v.universe.bodies.get(p0).unwrap().pos;
        // quarter turn of a 40-unit period around the moved star
        assert_abs_diff_eq!(planet.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(planet.y, 12.0, epsilon = 1e-9);

        v.apply(Action::TogglePause);
        v.step(10.0);
        assert_abs_diff_eq!(v.universe.bodies.get(s0).unwrap().pos.x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn zoom_eases_over_steps() {
        let mut v = Viewer::new(two_systems(), Renderer::new(40, 20), 1.0);
        v.apply(Action::Zoom(2.0));
        v.step(0.05);
        assert!(v.camera.zoom() > 1.0 && v.camera.zoom() < 2.0);
        v.step(1.0);
        assert_eq!(v.camera.zoom(), 2.0);
    }

    #[test]
    fn frame_carries_status_on_last_row() {
        let mut v = Viewer::new(two_systems(), Renderer::new(60, 12), 1.0);
        v.apply(Action::TimeScale(2.0));
        let frame = v.frame().unwrap();
        assert!(frame.row(11).starts_with("t=0.0 zoom=1.00 scale=2x focus=Sys0"));
        assert_eq!(frame.get(30, 6), Some('@'));
        v.apply(Action::Quit);
        assert!(v.should_quit());
    }
}
