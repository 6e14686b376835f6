use bytemuck::{Pod, Zeroable};

use crate::boid::Boid;
use crate::particles::Particle;

/// Per-boid instance data for an external renderer.
/// Stride = 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct BoidInstance {
    /// World position (x, y).
    pub position: [f32; 2],
    /// Velocity (x, y). Renderers orient triangles along it.
    pub velocity: [f32; 2],
    /// Body radius in world units.
    pub radius: f32,
    /// RGBA color packed as u32.
    pub color: u32,
}

impl BoidInstance {
    pub fn from_boid(boid: &Boid) -> Self {
        Self {
            position: boid.position().into(),
            velocity: boid.velocity().into(),
            radius: boid.radius(),
            color: boid.color().to_rgba(0xFF),
        }
    }
}

/// Per-particle instance data. Alpha rides in the packed color.
/// Stride = 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    /// Dot diameter.
    pub size: f32,
    /// RGBA color packed as u32.
    pub color: u32,
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle) -> Self {
        let alpha = p.alpha().clamp(0.0, 255.0) as u8;
        Self {
            position: p.position().into(),
            size: p.size().max(0.0),
            color: p.color().to_rgba(alpha),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, DEFAULT_PALETTE};
    use crate::config::{FlockConfig, ParticleSettings};
    use glam::Vec2;

    #[test]
    fn instance_strides() {
        assert_eq!(std::mem::size_of::<BoidInstance>(), 24);
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 16);
    }

    #[test]
    fn boid_instance_copies_state() {
        let config = FlockConfig::default();
        let b = Boid::new(Vec2::new(1.0, 2.0), Vec2::new(0.5, 0.0), Color::rgb(1, 2, 3), &config);
        let inst = BoidInstance::from_boid(&b);
        assert_eq!(inst.position, [1.0, 2.0]);
        assert_eq!(inst.velocity, [0.5, 0.0]);
        assert_eq!(inst.color, 0x010203FF);
        let bytes: &[u8] = bytemuck::bytes_of(&inst);
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn particle_alpha_is_packed() {
        let mut rng = fastrand::Rng::with_seed(1);
        let p = Particle::spawn(
            Vec2::ZERO,
            Vec2::ZERO,
            Color::rgb(9, 9, 9),
            &DEFAULT_PALETTE,
            0.0,
            &ParticleSettings::default(),
            &mut rng,
        );
        let inst = ParticleInstance::from_particle(&p);
        assert_eq!(inst.color & 0xFF, 150);
        assert_eq!(inst.color >> 8, 0x090909);
    }
}
