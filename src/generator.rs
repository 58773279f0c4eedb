use crate::body::{BodyId, BodyTree, CelestialBody, PlanetKind};
use crate::math::Vec2;
use crate::orbit::{Orbit, OrbitError};
use crate::system::{Galaxy, SolarSystem, Universe};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Seeded universe builder. Same seed and counts, same universe.
pub struct UniverseGenerator {
    rng: ChaCha8Rng,
    drift: f64,
}

impl UniverseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            drift: 0.0,
        }
    }

    /// Gives each system root a random velocity below `speed`. Zero keeps systems fixed and
    /// draws nothing extra from the rng.
    pub fn with_drift(mut self, speed: f64) -> Self {
        self.drift = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        self
    }

    pub fn generate_universe(&mut self, galaxies: usize, systems_per_galaxy: usize) -> Result<Universe, OrbitError> {
        let mut universe = Universe::new();
        for i in 0..galaxies {
            let pos = Vec2::new(self.rng.gen_range(-1000.0..1000.0), self.rng.gen_range(-1000.0..1000.0));
            let galaxy = self.generate_galaxy(&mut universe.bodies, format!("Galaxy-{i}"), pos, systems_per_galaxy)?;
            universe.add_galaxy(galaxy);
        }
        log::debug!(
            "generated {} galaxies, {} systems, {} bodies",
            universe.galaxies.len(),
            universe.systems().count(),
            universe.bodies.len()
        );
        Ok(universe)
    }

    pub fn generate_galaxy(
        &mut self,
        tree: &mut BodyTree,
        name: String,
        pos: Vec2,
        systems: usize,
    ) -> Result<Galaxy, OrbitError> {
        let mut galaxy = Galaxy::new(name, pos);
        for i in 0..systems {
            let angle = self.rng.gen_range(0.0..TAU);
            let dist = self.rng.gen_range(10.0..200.0);
            let (s, c) = f64::sin_cos(angle);
            let sys_pos = pos + Vec2::new(dist * c, dist * s);
            let sys_name = format!("{}-Sys-{i}", galaxy.name);
            galaxy.systems.push(self.generate_system(tree, sys_name, sys_pos)?);
        }
        Ok(galaxy)
    }

    pub fn generate_system(&mut self, tree: &mut BodyTree, name: String, pos: Vec2) -> Result<SolarSystem, OrbitError> {
        let mass = self.rng.gen_range(0.5..5.0) * 1000.0;
        let radius = self.rng.gen_range(2.0..10.0);
        let velocity = if self.drift > 0.0 {
            let (s, c) = f64::sin_cos(self.rng.gen_range(0.0..TAU));
            Vec2::new(c, s) * self.rng.gen_range(0.0..self.drift)
        } else {
            Vec2::ZERO
        };
        let star = tree.add_root(
            CelestialBody::star(format!("{name}-Star"), mass, radius)
                .with_pos(pos)
                .with_velocity(velocity),
        );

        let mut system = SolarSystem::new(name, star);
        let planets = self.rng.gen_range(1..=8);
        for i in 0..planets {
            let dist = self.rng.gen_range(10.0..100.0) + i as f64 * 15.0;
            let planet = self.generate_planet(tree, star, format!("{}-P{i}", system.name), dist)?;
            system.bodies_of_interest.push(planet);
        }
        Ok(system)
    }

    fn generate_planet(&mut self, tree: &mut BodyTree, parent: BodyId, name: String, distance: f64) -> Result<BodyId, OrbitError> {
        let kind = *PlanetKind::ALL.choose(&mut self.rng).unwrap_or(&PlanetKind::Terrestrial);
        let mass = self.rng.gen_range(0.1..10.0);
        let radius = self.rng.gen_range(0.5..2.0);
        let orbit = Orbit::new(
            distance,
            self.rng.gen_range(0.0..0.2),
            self.rng.gen_range(0.0..TAU),
            self.rng.gen_range(0.0..TAU),
            // Kepler's third law with G*M folded into the units
            distance.powi(3).sqrt(),
        )?;
        log::trace!(
            "{name}: {kind:?} a={:.1} e={:.3} T={:.1}",
            orbit.semi_major_axis(),
            orbit.eccentricity(),
            orbit.period()
        );
        let planet = tree.add_child(parent, CelestialBody::planet(name.clone(), kind, mass, radius), Some(orbit));

        if self.rng.gen_bool(0.5) {
            let moons = self.rng.gen_range(1..=3);
            for i in 0..moons {
                let dist = self.rng.gen_range(2.0..5.0) + i as f64;
                self.generate_moon(tree, planet, format!("{name}-M{i}"), dist)?;
            }
        }
        Ok(planet)
    }

    fn generate_moon(&mut self, tree: &mut BodyTree, parent: BodyId, name: String, distance: f64) -> Result<BodyId, OrbitError> {
        let orbit = Orbit::new(
            distance,
            self.rng.gen_range(0.0..0.1),
            self.rng.gen_range(0.0..TAU),
            self.rng.gen_range(0.0..TAU),
            distance.powi(3).sqrt() * 0.2,
        )?;
        let moon = CelestialBody::planet(name, PlanetKind::Terrestrial, 0.01, 0.2);
        Ok(tree.add_child(parent, moon, Some(orbit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;

    #[test]
    fn same_seed_same_universe() {
        let a = UniverseGenerator::new(123).generate_universe(2, 3).unwrap();
        let b = UniverseGenerator::new(123).generate_universe(2, 3).unwrap();
        assert_eq!(a.bodies.len(), b.bodies.len());
        for ((_, x), (_, y)) in a.bodies.iter().zip(b.bodies.iter()) {
            assert_eq!(x.name, y.name);
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.orbit(), y.orbit());
        }
    }

    #[test]
    fn structure_matches_counts() {
        let u = UniverseGenerator::new(7).generate_universe(2, 4).unwrap();
        assert_eq!(u.galaxies.len(), 2);
        assert_eq!(u.systems().count(), 8);
        for sys in u.systems() {
            let star = u.bodies.get(sys.root).unwrap();
            assert_eq!(star.kind, BodyKind::Star);
            assert!(star.is_root());
            assert!((1..=8).contains(&star.children().len()));
            assert_eq!(sys.bodies_of_interest, star.children());
            for &p in star.children() {
                let planet = u.bodies.get(p).unwrap();
                assert!(matches!(planet.kind, BodyKind::Planet(_)));
                assert!(planet.orbit().unwrap().eccentricity() < 0.2);
                assert!(planet.children().len() <= 3);
                for &m in planet.children() {
                    let moon = u.bodies.get(m).unwrap();
                    assert_eq!(moon.kind, BodyKind::Planet(PlanetKind::Terrestrial));
                    assert_eq!(moon.parent(), Some(p));
                }
            }
        }
    }

    #[test]
    fn planets_move_over_time() {
        let mut u = UniverseGenerator::new(123).generate_universe(1, 1).unwrap();
        u.update(0.0);
        let planet = u.systems().next().unwrap().bodies_of_interest[0];
        let start = u.bodies.get(planet).unwrap().pos;
        u.update(1000.0);
        assert_ne!(u.bodies.get(planet).unwrap().pos, start);
    }

    #[test]
    fn drift_gives_roots_bounded_velocity() {
        let still = UniverseGenerator::new(5).generate_universe(1, 3).unwrap();
        let moving = UniverseGenerator::new(5).with_drift(0.5).generate_universe(1, 3).unwrap();
        for root in still.system_roots() {
            assert_eq!(still.bodies.get(root).unwrap().velocity, Vec2::ZERO);
        }
        let mut u = moving;
        let roots = u.system_roots();
        let before: Vec<Vec2> = roots.iter().map(|r| u.bodies.get(*r).unwrap().pos).collect();
        assert!(roots.iter().any(|r| u.bodies.get(*r).unwrap().velocity != Vec2::ZERO));
        u.bodies.drift_roots(4.0);
        for (r, p) in roots.iter().zip(before) {
            let body = u.bodies.get(*r).unwrap();
            assert!(body.velocity.len() < 0.5);
            assert_eq!(body.pos, p + body.velocity * 4.0);
        }
    }

    #[test]
    fn negative_drift_means_fixed_systems() {
        let u = UniverseGenerator::new(5).with_drift(-2.0).generate_universe(1, 2).unwrap();
        let plain = UniverseGenerator::new(5).generate_universe(1, 2).unwrap();
        assert_eq!(u.bodies.len(), plain.bodies.len());
        for root in u.system_roots() {
            assert_eq!(u.bodies.get(root).unwrap().velocity, Vec2::ZERO);
        }
    }
}
