//! Per-kind procedural shading. Each kernel fills a disc of the frame around a projected
//! centre, turning a scalar brightness into one of seven glyphs.
//!
//! Kernel parameters are drawn from a ChaCha8 stream seeded with `fnv1a64(name) ^ salt`,
//! once per call and in declaration order, so a body looks the same on every frame.

use crate::body::{BodyKind, CelestialBody, PlanetKind};
use crate::camera::Camera;
use crate::math::{clamp01, fnv1a64};
use crate::render::Frame;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

pub const GLYPHS: [char; 7] = [' ', '·', ':', '*', 'o', 'O', '@'];
const LEVELS: f64 = (GLYPHS.len() - 1) as f64;

const GAS_GIANT_SALT: u64 = 0x6A5;
const ICE_GIANT_SALT: u64 = 0x1CE;
const TERRESTRIAL_SALT: u64 = 0x7ED;
const LAVA_GIANT_SALT: u64 = 0x1A4A;

pub type ShadeFn = fn(&CelestialBody, &mut Frame, i32, i32, &Camera);

/// Kind → kernel lookup, filled once when the renderer is built.
#[derive(Clone)]
pub struct KernelTable {
    kernels: HashMap<BodyKind, ShadeFn>,
}

impl Default for KernelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KernelTable {
    pub fn empty() -> Self {
        Self { kernels: HashMap::new() }
    }

    pub fn builtin() -> Self {
        let mut t = Self::empty();
        t.register(BodyKind::Star, shade_star);
        t.register(BodyKind::Planet(PlanetKind::GasGiant), shade_gas_giant);
        t.register(BodyKind::Planet(PlanetKind::IceGiant), shade_ice_giant);
        t.register(BodyKind::Planet(PlanetKind::Terrestrial), shade_terrestrial);
        t.register(BodyKind::Planet(PlanetKind::LavaGiant), shade_lava_giant);
        t
    }

    pub fn register(&mut self, kind: BodyKind, kernel: ShadeFn) -> Option<ShadeFn> {
        self.kernels.insert(kind, kernel)
    }

    pub fn get(&self, kind: BodyKind) -> Option<ShadeFn> {
        self.kernels.get(&kind).copied()
    }
}

// -------------------- Shared disc fill --------------------

pub fn radius_px(radius: f64, zoom: f64) -> i32 {
    let r = (radius.max(0.5) * zoom).round();
    (r as i32).max(1)
}

pub fn glyph_index(brightness: f64) -> usize {
    if brightness.is_nan() {
        return 0;
    }
    (brightness * LEVELS).round().max(0.0).min(LEVELS) as usize
}

/// Runs `brightness(nx, ny, r)` over every frame cell of the disc. `write_blank` decides
/// whether index 0 overwrites what is already there.
fn fill_disc<F>(frame: &mut Frame, sx: i32, sy: i32, rp: i32, write_blank: bool, mut brightness: F)
where
    F: FnMut(f64, f64, f64) -> f64,
{
    let w = frame.width() as i64;
    let h = frame.height() as i64;
    let (sx, sy, rp) = (sx as i64, sy as i64, rp as i64);
    let rpf = rp as f64;

    // offsets that would land outside the frame are skipped up front
    let dy_range = (-rp).max(-sy)..=rp.min(h - 1 - sy);
    let dx_range = (-rp).max(-sx)..=rp.min(w - 1 - sx);

    for dy in dy_range {
        let y = sy + dy;
        for dx in dx_range.clone() {
            let x = sx + dx;
            let (fdx, fdy) = (dx as f64, dy as f64);
            let dist = (fdx * fdx + fdy * fdy).sqrt();
            if dist > rpf {
                continue;
            }
            let nx = fdx / rpf;
            let ny = fdy / rpf;
            let r = (nx * nx + ny * ny).sqrt();
            if r > 1.0 {
                continue;
            }
            let idx = glyph_index(brightness(nx, ny, r));
            if idx == 0 && !write_blank {
                continue;
            }
            frame.set(x as i32, y as i32, GLYPHS[idx]);
        }
    }
}

fn kernel_rng(name: &str, salt: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(fnv1a64(name) ^ salt)
}

// -------------------- Star --------------------

pub fn shade_star(body: &CelestialBody, frame: &mut Frame, sx: i32, sy: i32, camera: &Camera) {
    let rp = radius_px(body.radius, camera.zoom());
    let lum = body.luminosity.unwrap_or(1.0);
    fill_disc(frame, sx, sy, rp, false, |_, _, r| (1.0 - r) * lum);
}

// -------------------- Gas giant --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasGiantParams {
    pub band_count: u32,
    pub wave_amp: f64,
    pub band_mix: f64,
}

impl GasGiantParams {
    pub fn for_body(name: &str) -> Self {
        let mut rng = kernel_rng(name, GAS_GIANT_SALT);
        Self {
            band_count: rng.gen_range(6..=10),
            wave_amp: rng.gen_range(0.1..0.25),
            band_mix: rng.gen_range(0.2..0.4),
        }
    }

    fn brightness(&self, nx: f64, ny: f64, r: f64, lum: f64) -> f64 {
        let latitude = ny * FRAC_PI_2;
        let band = (latitude * self.band_count as f64).sin();
        // horizontal shear standing in for wind
        let distortion = (nx * 8.0 + self.band_mix * ny * 6.0).sin();
        let band = (band + self.wave_amp * distortion) * 0.5 + 0.5;
        band * lum * (1.0 - r * 0.7)
    }
}

pub fn shade_gas_giant(body: &CelestialBody, frame: &mut Frame, sx: i32, sy: i32, camera: &Camera) {
    let rp = radius_px(body.radius, camera.zoom());
    let lum = body.luminosity.unwrap_or(1.0);
    let p = GasGiantParams::for_body(&body.name);
    fill_disc(frame, sx, sy, rp, true, |nx, ny, r| p.brightness(nx, ny, r, lum));
}

// -------------------- Ice giant --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IceGiantParams {
    pub band_count: u32,
    pub band_phase: f64,
    pub band_amp: f64,
    pub turb_amp: f64,
    pub spot_x: f64,
    pub spot_y: f64,
    pub spot_sigma: f64,
}

impl IceGiantParams {
    pub fn for_body(name: &str) -> Self {
        let mut rng = kernel_rng(name, ICE_GIANT_SALT);
        Self {
            band_count: rng.gen_range(2..=5),
            band_phase: rng.gen_range(0.0..TAU),
            band_amp: rng.gen_range(0.15..0.3),
            turb_amp: rng.gen_range(0.05..0.12),
            spot_x: rng.gen_range(-0.3..0.3),
            spot_y: rng.gen_range(-0.3..0.3),
            spot_sigma: rng.gen_range(0.10..0.18),
        }
    }

    fn brightness(&self, nx: f64, ny: f64, r: f64, lum: f64) -> f64 {
        let latitude = ny * FRAC_PI_2;
        let band = (latitude * self.band_count as f64 + self.band_phase).cos() * 0.5 + 0.5;
        let band_mix = (1.0 - self.band_amp) * 0.5 + self.band_amp * band;
        let turb = (nx * 6.0 + ny * 2.0 + self.band_phase * 0.7).sin() * 0.5 + 0.5;
        let val = band_mix * (1.0 - self.turb_amp) + turb * self.turb_amp;

        let sdx = nx - self.spot_x;
        let sdy = ny - self.spot_y;
        let spot = (-(sdx * sdx + sdy * sdy) / (2.0 * self.spot_sigma * self.spot_sigma)).exp();

        let base = 0.35 + 0.55 * val;
        clamp01((base * (1.0 - r * 0.5) + 0.35 * spot) * lum)
    }
}

pub fn shade_ice_giant(body: &CelestialBody, frame: &mut Frame, sx: i32, sy: i32, camera: &Camera) {
    let rp = radius_px(body.radius, camera.zoom());
    let lum = body.luminosity.unwrap_or(1.0);
    let p = IceGiantParams::for_body(&body.name);
    fill_disc(frame, sx, sy, rp, true, |nx, ny, r| p.brightness(nx, ny, r, lum));
}

// -------------------- Terrestrial --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrestrialParams {
    pub freq: [f64; 3],
    pub phase: [f64; 3],
    pub sea_level: f64,
    pub mount_gain: f64,
    pub ocean_dark: f64,
    pub land_base: f64,
}

impl TerrestrialParams {
    pub fn for_body(name: &str) -> Self {
        let mut rng = kernel_rng(name, TERRESTRIAL_SALT);
        let f1 = rng.gen_range(3.0..6.0);
        let f2 = rng.gen_range(3.0..6.0);
        let f3 = rng.gen_range(2.0..4.0);
        let p1 = rng.gen_range(0.0..TAU);
        let p2 = rng.gen_range(0.0..TAU);
        let p3 = rng.gen_range(0.0..TAU);
        Self {
            freq: [f1, f2, f3],
            phase: [p1, p2, p3],
            sea_level: rng.gen_range(-0.15..0.15),
            mount_gain: rng.gen_range(0.3..0.6),
            ocean_dark: rng.gen_range(0.15..0.25),
            land_base: rng.gen_range(0.45..0.6),
        }
    }

    fn brightness(&self, nx: f64, ny: f64, r: f64, albedo: f64) -> f64 {
        let [f1, f2, f3] = self.freq;
        let [p1, p2, p3] = self.phase;

        let elev = ((nx * f1 + p1).sin() + (ny * f2 + p2).cos() + ((nx + ny) * f3 + p3).sin()) / 3.0;
        let landness = elev - self.sea_level;

        let mut b = if landness > 0.0 {
            let rough = ((nx * f1 * 2.0 + p1 * 1.7).sin() * (ny * f2 * 2.0 + p2 * 1.3).cos()).abs();
            self.land_base + self.mount_gain * landness * (0.5 + 0.5 * rough)
        } else {
            let wave = (nx * 10.0 + p3).sin() * (ny * 8.0 + p2).sin();
            self.ocean_dark + 0.06 * (wave * 0.5 + 0.5)
        };

        // ice caps
        let polar = (ny.abs() - 0.6).max(0.0) / 0.4;
        b = b * (1.0 - 0.6 * polar) + 0.85 * polar;
        b *= 1.0 - r * 0.7;
        b *= 0.7 + 0.6 * albedo;
        clamp01(b)
    }
}

pub fn shade_terrestrial(body: &CelestialBody, frame: &mut Frame, sx: i32, sy: i32, camera: &Camera) {
    let rp = radius_px(body.radius, camera.zoom());
    let albedo = body.albedo.unwrap_or(0.3);
    let p = TerrestrialParams::for_body(&body.name);
    fill_disc(frame, sx, sy, rp, true, |nx, ny, r| p.brightness(nx, ny, r, albedo));
}

// -------------------- Lava giant --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LavaGiantParams {
    pub freq: [f64; 3],
    pub phase: [f64; 3],
    pub thickness: f64,
    pub glow: f64,
    pub base_dark: f64,
}

impl LavaGiantParams {
    pub fn for_body(name: &str) -> Self {
        let mut rng = kernel_rng(name, LAVA_GIANT_SALT);
        let f1 = rng.gen_range(8.0..12.0);
        let f2 = rng.gen_range(8.0..12.0);
        let f3 = rng.gen_range(4.0..8.0);
        let p1 = rng.gen_range(0.0..TAU);
        let p2 = rng.gen_range(0.0..TAU);
        let p3 = rng.gen_range(0.0..TAU);
        Self {
            freq: [f1, f2, f3],
            phase: [p1, p2, p3],
            thickness: rng.gen_range(0.10..0.18),
            glow: rng.gen_range(0.6..0.9),
            base_dark: rng.gen_range(0.15..0.25),
        }
    }

    fn brightness(&self, nx: f64, ny: f64, r: f64) -> f64 {
        let [f1, f2, f3] = self.freq;
        let [p1, p2, p3] = self.phase;

        let u = (nx * f1 + p1).sin().abs();
        let v = (ny * f2 + p2).sin().abs();
        let w = ((nx - ny) * f3 + p3).sin().abs();
        let m = u.min(v).min(w);
        let crack = (-(m / self.thickness).powi(2)).exp();
        let pool = (nx * 3.0 + ny * 2.0 + p3).sin().max(0.0) * 0.15;

        let edge_cool = 1.0 - r * 0.5;
        clamp01(self.base_dark * edge_cool + self.glow * crack + pool)
    }
}

pub fn shade_lava_giant(body: &CelestialBody, frame: &mut Frame, sx: i32, sy: i32, camera: &Camera) {
    let rp = radius_px(body.radius, camera.zoom());
    let p = LavaGiantParams::for_body(&body.name);
    fill_disc(frame, sx, sy, rp, true, |nx, ny, r| p.brightness(nx, ny, r));
}
