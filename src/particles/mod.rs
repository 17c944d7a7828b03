//! Fireworks and confetti simulator drawn behind the Tet greeting.

mod config;
mod particle;
mod simulator;

pub use config::FireworksConfig;
pub use particle::{PALETTE, Particle, ParticleKind, Viewport};
pub use simulator::ParticleSimulator;

pub(crate) use particle::uniform;
