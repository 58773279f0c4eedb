//! Kinematic orbit hierarchy plus a camera-projected ASCII renderer.
//!
//! Bodies live in a [`BodyTree`](body::BodyTree) arena and are positioned from Keplerian
//! [`Orbit`](orbit::Orbit)s relative to their parent. A [`Renderer`](render::Renderer)
//! projects them through a [`Camera`](camera::Camera) and shades each one with the kernel
//! registered for its kind.

pub mod app;
pub mod body;
pub mod camera;
pub mod config;
pub mod generator;
pub mod input;
pub mod logger;
pub mod math;
pub mod orbit;
pub mod render;
pub mod shading;
pub mod system;
