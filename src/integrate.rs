//! The integration stage: age, move, bounce and cull last frame's particles.
//!
//! Each surviving candidate takes one explicit Euler step under gravity.
//! The scalar field is evaluated at the position before and after the step;
//! a sign change (relative to the iso level) means the particle crossed the
//! surface, so its velocity reflects about the local surface normal and its
//! bounce channel flashes. Particles whose life has run out are dropped and
//! never reach the next frame. Testing only the endpoints is knowingly
//! simple: fields with tightly spaced zero regions can let a fast particle
//! tunnel through within a single step.

use glam::Vec3;
use log::warn;

use crate::kernel;
use crate::particle::Particle;
use crate::shape::ShapeField;

/// How fast the bounce flash cools, in units per second.
const BOUNCE_DECAY: f32 = 2.0;

/// Per-frame integration parameters.
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    /// Frame duration in seconds.
    pub dt: f32,
    /// Iso level of the surface, shared with the extraction stage.
    pub iso_level: f32,
    /// Downward gravity acceleration.
    pub gravity: f32,
    /// Seconds a particle lives in total; consumed as `dt / death_age`.
    pub death_age: f32,
}

/// Advance `previous` (the active slot) and append the survivors to `slot`
/// directly after the `emitted` particles already written there. The kernel
/// count is known only after the join; this is the third per-frame
/// synchronization stall.
///
/// Survivors beyond the slot's spare capacity are dropped deterministically
/// from the tail, which after repeated concatenation holds the oldest
/// particles. The returned count is the number actually appended, so the
/// occupancy recurrence holds through an overflow.
pub fn run(
    previous: &[Particle],
    field: &ShapeField,
    params: &StepParams,
    slot: &mut Vec<Particle>,
    capacity: usize,
) -> usize {
    let survivors = kernel::filter_map_ordered(previous, |_, p| step_particle(p, field, params));
    let count = survivors.len();

    let room = capacity - slot.len();
    if count > room {
        warn!(
            "slot overflow: {} survivors after {} emitted, dropping {}",
            count,
            slot.len(),
            count - room
        );
    }
    slot.extend(survivors.into_iter().take(room));
    count.min(room)
}

/// Integrate one particle; `None` when it dies of old age.
fn step_particle(p: &Particle, field: &ShapeField, params: &StepParams) -> Option<Particle> {
    let mut p = *p;

    p.info.life -= params.dt / params.death_age;
    if p.info.life <= 0.0 {
        return None;
    }
    p.info.bounce = (p.info.bounce - BOUNCE_DECAY * params.dt).max(0.0);

    p.velocity.y -= params.gravity * params.dt;
    let before = p.position;
    let after = before + p.velocity * params.dt;

    let f_before = field.eval(before) - params.iso_level;
    let f_after = field.eval(after) - params.iso_level;
    if f_before.signum() != f_after.signum() {
        // Crossed the surface: reflect about the local normal and stay on
        // the incoming side.
        let normal = field.normal(after).unwrap_or(Vec3::Y);
        p.velocity -= 2.0 * p.velocity.dot(normal) * normal;
        p.info.bounce = 1.0;
    } else {
        p.position = after;
    }
    Some(p)
}
