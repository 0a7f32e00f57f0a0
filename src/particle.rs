//! Particle state and its GPU-resident layout.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Per-particle scalar channel driving death and rendering.
///
/// `life` starts at 1.0 on emission and decays linearly to 0 over the
/// configured death age; the billboard pass also uses it as an intensity
/// and size curve. `bounce` flashes to 1.0 when the particle reflects off
/// the surface and cools back down, tinting recently bounced particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleInfo {
    /// Remaining life fraction in `[0, 1]`. The particle dies at 0.
    pub life: f32,
    /// Recent-collision state in `[0, 1]`.
    pub bounce: f32,
}

/// A single simulated particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position in field space.
    pub position: Vec3,
    /// Velocity in field units per second.
    pub velocity: Vec3,
    /// Life/bounce channel.
    pub info: ParticleInfo,
}

impl Particle {
    /// A freshly emitted particle sitting on the surface.
    pub fn emitted(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            info: ParticleInfo {
                life: 1.0,
                bounce: 0.0,
            },
        }
    }

    /// Interleaved GPU representation for the billboard vertex buffer.
    pub fn to_gpu(&self) -> ParticleGpu {
        ParticleGpu {
            info: [self.info.life, self.info.bounce],
            velocity: self.velocity.to_array(),
            position: self.position.to_array(),
        }
    }
}

/// GPU layout of a particle: 8 interleaved floats (info, velocity, position),
/// matching the stream layout the stages feed to the billboard pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleGpu {
    /// `[life, bounce]`.
    pub info: [f32; 2],
    /// Velocity.
    pub velocity: [f32; 3],
    /// Position.
    pub position: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emitted_starts_fresh() {
        let p = Particle::emitted(Vec3::new(0.1, 0.2, 0.3), Vec3::Y);
        assert_eq!(p.info.life, 1.0);
        assert_eq!(p.info.bounce, 0.0);
        assert_eq!(p.velocity, Vec3::Y);
    }

    #[test]
    fn test_gpu_layout_is_8_floats() {
        assert_eq!(std::mem::size_of::<ParticleGpu>(), 8 * 4);
        let gpu = Particle::emitted(Vec3::ONE, Vec3::ZERO).to_gpu();
        assert_eq!(gpu.info, [1.0, 0.0]);
        assert_eq!(gpu.position, [1.0, 1.0, 1.0]);
    }
}
