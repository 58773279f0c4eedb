use crate::math::Vec2;
use crate::orbit::Orbit;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlanetKind {
    GasGiant,
    IceGiant,
    Terrestrial,
    LavaGiant,
}

impl PlanetKind {
    pub const ALL: [PlanetKind; 4] = [
        PlanetKind::GasGiant,
        PlanetKind::IceGiant,
        PlanetKind::Terrestrial,
        PlanetKind::LavaGiant,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Star,
    Planet(PlanetKind),
    Asteroid,
    Debris,
    BlackHole,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BodyKind::Star => "star",
            BodyKind::Planet(PlanetKind::GasGiant) => "gas giant",
            BodyKind::Planet(PlanetKind::IceGiant) => "ice giant",
            BodyKind::Planet(PlanetKind::Terrestrial) => "terrestrial planet",
            BodyKind::Planet(PlanetKind::LavaGiant) => "lava giant",
            BodyKind::Asteroid => "asteroid",
            BodyKind::Debris => "debris",
            BodyKind::BlackHole => "black hole",
        };
        f.write_str(s)
    }
}

/// Index of a body inside its [`BodyTree`]. Stable for the life of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    pub mass: f64,
    pub radius: f64,
    pub luminosity: Option<f64>,
    pub temperature: Option<f64>,
    pub albedo: Option<f64>,
    pub composition: Option<String>,
    pub description: Option<String>,
    pub pos: Vec2,
    /// Only applied to roots, see [`BodyTree::drift_roots`].
    pub velocity: Vec2,
    orbit: Option<Orbit>,
    parent: Option<BodyId>,
    children: Vec<BodyId>,
}

impl CelestialBody {
    pub fn new(name: impl Into<String>, kind: BodyKind, mass: f64, radius: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            mass,
            radius: radius.max(0.0),
            luminosity: None,
            temperature: None,
            albedo: None,
            composition: None,
            description: None,
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            orbit: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn star(name: impl Into<String>, mass: f64, radius: f64) -> Self {
        Self::new(name, BodyKind::Star, mass, radius)
            .with_luminosity(1.0)
            .with_temperature(5778.0)
            .with_composition("Hydrogen/Helium")
            .with_description("Main sequence star")
    }

    pub fn planet(name: impl Into<String>, kind: PlanetKind, mass: f64, radius: f64) -> Self {
        let description = match kind {
            PlanetKind::GasGiant => "Gas giant",
            PlanetKind::IceGiant => "Ice giant",
            PlanetKind::Terrestrial => "Terrestrial planet",
            PlanetKind::LavaGiant => "Lava giant",
        };
        Self::new(name, BodyKind::Planet(kind), mass, radius)
            .with_albedo(0.3)
            .with_composition("Silicate")
            .with_description(description)
    }

    pub fn asteroid(name: impl Into<String>, mass: f64, radius: f64) -> Self {
        Self::new(name, BodyKind::Asteroid, mass, radius)
            .with_composition("Carbonaceous")
            .with_description("Irregular asteroid")
    }

    pub fn black_hole(name: impl Into<String>, mass: f64, radius: f64) -> Self {
        Self::new(name, BodyKind::BlackHole, mass, radius).with_description("Supermassive black hole")
    }

    pub fn with_pos(mut self, pos: impl Into<Vec2>) -> Self {
        self.pos = pos.into();
        self
    }
    pub fn with_velocity(mut self, v: impl Into<Vec2>) -> Self {
        self.velocity = v.into();
        self
    }
    pub fn with_luminosity(mut self, l: f64) -> Self {
        self.luminosity = Some(l);
        self
    }
    pub fn with_temperature(mut self, k: f64) -> Self {
        self.temperature = Some(k);
        self
    }
    pub fn with_albedo(mut self, a: f64) -> Self {
        self.albedo = Some(a);
        self
    }
    pub fn with_composition(mut self, c: impl Into<String>) -> Self {
        self.composition = Some(c.into());
        self
    }
    pub fn with_description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        self.orbit.as_ref()
    }
    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }
    pub fn children(&self) -> &[BodyId] {
        &self.children
    }
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena owning every body. Parents hold ordered child ids; children point back by id only.
#[derive(Clone, Debug, Default)]
pub struct BodyTree {
    bodies: Vec<CelestialBody>,
}

impl BodyTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Inserts a stationary root. Any orbit or links on `body` are discarded.
    pub fn add_root(&mut self, mut body: CelestialBody) -> BodyId {
        body.orbit = None;
        body.parent = None;
        body.children.clear();
        let id = BodyId(self.bodies.len());
        self.bodies.push(body);
        id
    }

    /// Inserts `child` under `parent`. The child is always a fresh node, so no cycle can form.
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: BodyId, mut child: CelestialBody, orbit: Option<Orbit>) -> BodyId {
        assert!(parent.0 < self.bodies.len(), "unknown parent {parent:?}");
        child.parent = Some(parent);
        child.orbit = orbit;
        child.children.clear();
        let id = BodyId(self.bodies.len());
        self.bodies.push(child);
        self.bodies[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.0)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut CelestialBody> {
        self.bodies.get_mut(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &CelestialBody)> {
        self.bodies.iter().enumerate().map(|(i, b)| (BodyId(i), b))
    }

    pub fn roots(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.iter().filter(|(_, b)| b.is_root()).map(|(id, _)| id)
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.iter().find(|(_, b)| b.name == name).map(|(id, _)| id)
    }

    /// Positions `id` from its parent and orbit, then recurses into its children in order.
    pub fn update(&mut self, id: BodyId, t: f64) {
        let body = &self.bodies[id.0];
        if let (Some(parent), Some(orbit)) = (body.parent, body.orbit) {
            let parent_pos = self.bodies[parent.0].pos;
            self.bodies[id.0].pos = parent_pos + orbit.position_at(t);
        }
        // children are never removed, so indexing by position stays valid through recursion
        for i in 0..self.bodies[id.0].children.len() {
            let child = self.bodies[id.0].children[i];
            self.update(child, t);
        }
    }

    /// Moves every root by `velocity * dt`. Orbiting bodies follow on the next [`update`](Self::update).
    pub fn drift_roots(&mut self, dt: f64) {
        for b in self.bodies.iter_mut().filter(|b| b.parent.is_none()) {
            let v = b.velocity;
            b.pos += v * dt;
        }
    }

    /// Depth-first, parent before children, starting at `id`. Empty for an unknown id.
    pub fn walk(&self, id: BodyId) -> Vec<BodyId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(body) = self.bodies.get(cur.0) else {
                continue;
            };
            out.push(cur);
            stack.extend(body.children.iter().rev().copied());
        }
        out
    }
}
