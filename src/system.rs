use crate::body::{BodyId, BodyTree};
use crate::math::Vec2;

#[derive(Clone, Debug)]
pub struct SolarSystem {
    pub name: String,
    pub root: BodyId,
    /// Flat listing for callers that don't want to walk the tree.
    pub bodies_of_interest: Vec<BodyId>,
}

impl SolarSystem {
    pub fn new(name: impl Into<String>, root: BodyId) -> Self {
        Self {
            name: name.into(),
            root,
            bodies_of_interest: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Galaxy {
    pub name: String,
    pub pos: Vec2,
    pub systems: Vec<SolarSystem>,
}

impl Galaxy {
    pub fn new(name: impl Into<String>, pos: impl Into<Vec2>) -> Self {
        Self {
            name: name.into(),
            pos: pos.into(),
            systems: Vec::new(),
        }
    }
}

/// Top-level container. Owns the body arena every system's ids point into.
#[derive(Clone, Debug, Default)]
pub struct Universe {
    pub bodies: BodyTree,
    pub galaxies: Vec<Galaxy>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_galaxy(&mut self, galaxy: Galaxy) {
        self.galaxies.push(galaxy);
    }

    pub fn systems(&self) -> impl Iterator<Item = &SolarSystem> {
        self.galaxies.iter().flat_map(|g| g.systems.iter())
    }

    pub fn system_roots(&self) -> Vec<BodyId> {
        self.systems().map(|s| s.root).collect()
    }

    /// Recomputes every orbiting body for simulation time `t`.
    pub fn update(&mut self, t: f64) {
        for root in self.system_roots() {
            self.bodies.update(root, t);
        }
    }
}
