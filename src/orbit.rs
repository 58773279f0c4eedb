use crate::math::Vec2;
use std::f64::consts::TAU;
use std::fmt;

/// Fixed iteration count. Good enough for e < 0.3 and keeps output stable frame to frame.
const KEPLER_ITERATIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitError {
    SemiMajorAxis(f64),
    Eccentricity(f64),
    Period(f64),
    NotFinite,
}

impl fmt::Display for OrbitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitError::SemiMajorAxis(a) => write!(f, "semi-major axis must be > 0 (got {a})"),
            OrbitError::Eccentricity(e) => write!(f, "eccentricity must be in [0, 1) (got {e})"),
            OrbitError::Period(t) => write!(f, "orbital period must be > 0 (got {t})"),
            OrbitError::NotFinite => write!(f, "orbital elements must be finite"),
        }
    }
}

impl std::error::Error for OrbitError {}

/// Planar Keplerian elements, relative to the parent body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    a: f64,
    e: f64,
    omega: f64,
    m0: f64,
    period: f64,
}

impl Orbit {
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        arg_periapsis: f64,
        mean_anomaly_at_epoch: f64,
        period: f64,
    ) -> Result<Self, OrbitError> {
        let all = [semi_major_axis, eccentricity, arg_periapsis, mean_anomaly_at_epoch, period];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(OrbitError::NotFinite);
        }
        if semi_major_axis <= 0.0 {
            return Err(OrbitError::SemiMajorAxis(semi_major_axis));
        }
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(OrbitError::Eccentricity(eccentricity));
        }
        if period <= 0.0 {
            return Err(OrbitError::Period(period));
        }
        Ok(Self {
            a: semi_major_axis,
            e: eccentricity,
            omega: arg_periapsis,
            m0: mean_anomaly_at_epoch,
            period,
        })
    }

    /// Circular orbit starting at periapsis direction `phase`.
    pub fn circular(radius: f64, phase: f64, period: f64) -> Result<Self, OrbitError> {
        Self::new(radius, 0.0, 0.0, phase, period)
    }

    pub fn semi_major_axis(&self) -> f64 {
        self.a
    }
    pub fn eccentricity(&self) -> f64 {
        self.e
    }
    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn mean_anomaly(&self, t: f64) -> f64 {
        self.m0 + TAU * t / self.period
    }

    pub fn eccentric_anomaly(&self, t: f64) -> f64 {
        solve_kepler(self.mean_anomaly(t), self.e)
    }

    /// Offset from the parent at absolute simulation time `t`.
    pub fn position_at(&self, t: f64) -> Vec2 {
        let e_anom = self.eccentric_anomaly(t);
        let (sin_e, cos_e) = e_anom.sin_cos();

        let p = self.a * (cos_e - self.e);
        let q = self.a * (1.0 - self.e * self.e).sqrt() * sin_e;

        let (sin_w, cos_w) = self.omega.sin_cos();
        Vec2 {
            x: p * cos_w - q * sin_w,
            y: p * sin_w + q * cos_w,
        }
    }
}

/// Fixed-point iteration on M = E - e sin E, seeded at E = M. No convergence check.
pub fn solve_kepler(m: f64, e: f64) -> f64 {
    let mut e_anom = m;
    for _ in 0..KEPLER_ITERATIONS {
        e_anom = m + e * e_anom.sin();
    }
    e_anom
}
