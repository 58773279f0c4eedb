use crate::math::Vec2;

const SNAP_EPSILON: f64 = 1e-4;

/// Viewport with eased zoom. `zoom` and `target_zoom` always stay inside `[min_zoom, max_zoom]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    center: Vec2,
    zoom: f64,
    target_zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    zoom_smoothing: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
            target_zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_smoothing: 6.0,
        }
    }
}

impl Camera {
    pub fn new(center: impl Into<Vec2>, zoom: f64) -> Self {
        Self::default().with_center(center).with_zoom(zoom)
    }

    pub fn with_center(mut self, center: impl Into<Vec2>) -> Self {
        self.center = center.into();
        self
    }

    /// Sets both current and target zoom.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = self.clamp(zoom);
        self.target_zoom = self.zoom;
        self
    }

    pub fn with_target_zoom(mut self, target: f64) -> Self {
        self.target_zoom = self.clamp(target);
        self
    }

    /// Swaps the bounds if given in the wrong order, then re-clamps both zoom values.
    pub fn with_zoom_bounds(mut self, min: f64, max: f64) -> Self {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.min_zoom = lo.max(f64::MIN_POSITIVE);
        self.max_zoom = hi.max(self.min_zoom);
        self.zoom = self.clamp(self.zoom);
        self.target_zoom = self.clamp(self.target_zoom);
        self
    }

    pub fn with_smoothing(mut self, rate: f64) -> Self {
        self.zoom_smoothing = rate.max(0.0);
        self
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }
    pub fn zoom(&self) -> f64 {
        self.zoom
    }
    pub fn target_zoom(&self) -> f64 {
        self.target_zoom
    }
    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center.x += dx;
        self.center.y += dy;
    }

    pub fn look_at(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.target_zoom = self.clamp(self.target_zoom * factor);
    }

    /// First-order ease of `zoom` toward `target_zoom`. The step is capped at 1 so large `dt` never overshoots.
    pub fn update(&mut self, dt: f64) {
        let diff = self.target_zoom - self.zoom;
        if diff.abs() < SNAP_EPSILON {
            self.zoom = self.target_zoom;
            return;
        }
        let step = (self.zoom_smoothing * dt).min(1.0).max(0.0);
        self.zoom = self.clamp(self.zoom + diff * step);
    }

    fn clamp(&self, z: f64) -> f64 {
        if z.is_nan() {
            return self.min_zoom;
        }
        z.max(self.min_zoom).min(self.max_zoom)
    }
}
