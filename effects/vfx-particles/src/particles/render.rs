//! Conversion of a live pool into render-ready records

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

use super::instance::ParticleInstance;
use super::particle::Particle;
use crate::definition::{OrientationMode, RendererBlock};
use crate::providers::{CameraProvider, RIGHT, TransformProvider, UP};

/// One textured quad for the external renderer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderInstance {
    /// Quad-to-world transform
    pub transform: Mat4,
    /// Atlas rectangle origin; z is unused
    pub min_uv: Vec3,
    /// Atlas rectangle end; z carries the soft-particle factor
    pub max_uv: Vec3,
    pub color: Vec4,
}

/// Everything needed to draw one instance for one frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderBatch {
    pub texture: String,
    pub technique: String,
    pub instances: Vec<RenderInstance>,
}

/// Build the batch for `instance`
///
/// Returns `None` while the owning transform is missing or the start delay
/// has not elapsed.
pub fn build_render_batch(
    instance: &ParticleInstance,
    transform: Option<&dyn TransformProvider>,
    camera: &dyn CameraProvider,
) -> Option<RenderBatch> {
    let transform = transform?;
    if instance.is_delayed() {
        return None;
    }

    let renderer = &instance.definition().renderer;
    let emitter_front = transform.front();
    let instances = instance
        .particles()
        .iter()
        .map(|particle| {
            let (min_uv, max_uv) = uv_rect(particle.frame, renderer);
            RenderInstance {
                transform: particle_transform(particle, renderer, emitter_front, camera),
                min_uv,
                max_uv,
                color: particle.color,
            }
        })
        .collect();

    Some(RenderBatch {
        texture: renderer.texture.clone(),
        technique: renderer.technique.clone(),
        instances,
    })
}

/// Direction towards the viewer and up vector for one particle
fn orientation(
    mode: OrientationMode,
    particle: &Particle,
    emitter_front: Vec3,
    camera: &dyn CameraProvider,
) -> (Vec3, Vec3) {
    match mode {
        OrientationMode::Default => (-camera.front(), camera.up()),
        OrientationMode::Horizontal => (UP, RIGHT),
        OrientationMode::Vertical => {
            let front = camera.front();
            (-Vec3::new(front.x, 0.0, front.z), UP)
        }
        OrientationMode::Stretched => {
            let front = emitter_front.try_normalize().unwrap_or(Vec3::NEG_Z);
            let up = particle.velocity.try_normalize().unwrap_or(front);
            (front.cross(up), up)
        }
    }
}

fn particle_transform(
    particle: &Particle,
    renderer: &RendererBlock,
    emitter_front: Vec3,
    camera: &dyn CameraProvider,
) -> Mat4 {
    let (to_camera, up) = orientation(renderer.mode, particle, emitter_front, camera);

    let extent = particle.size * particle.scale;
    let stretch = match renderer.mode {
        OrientationMode::Stretched => renderer.stretch_length,
        _ => 1.0,
    };
    let scale = Vec3::new(extent, extent * stretch, extent);

    let r = particle.rotation;
    let rotation = Quat::from_euler(EulerRot::YXZ, r.x, r.y, r.z);

    billboard(particle.position, to_camera, up)
        * Mat4::from_scale(scale)
        * Mat4::from_quat(rotation)
}

/// Basis whose z axis points at the viewer and whose y axis follows `up`
///
/// Degenerate inputs (zero vectors, `up` parallel to the view direction)
/// fall back to an arbitrary orthonormal frame instead of producing NaNs.
pub fn billboard(position: Vec3, to_camera: Vec3, up: Vec3) -> Mat4 {
    let z = to_camera.try_normalize().unwrap_or(Vec3::Z);
    let x = up
        .cross(z)
        .try_normalize()
        .unwrap_or_else(|| z.any_orthonormal_vector());
    let y = z.cross(x);
    Mat4::from_cols(
        x.extend(0.0),
        y.extend(0.0),
        z.extend(0.0),
        position.extend(1.0),
    )
}

/// Atlas rectangle for `frame`, row-major over `frame_size.x` columns
fn uv_rect(frame: u32, renderer: &RendererBlock) -> (Vec3, Vec3) {
    let columns = (renderer.frame_size.x.floor() as u32).max(1);
    let cell = Vec2::ONE / renderer.frame_size.max(Vec2::ONE);
    let row = frame / columns;
    let column = frame % columns;

    let min = Vec2::new(column as f32, row as f32) * cell;
    (min.extend(0.0), (min + cell).extend(renderer.softness))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::definition::ParticleDefinition;
    use crate::particles::instance::StepContext;
    use crate::providers::{Camera, EmitterTransform, SeededRandom, StillAir};
    use crate::settings::SimulationSettings;
    use test_case::test_case;

    fn atlas(columns: f32, rows: f32) -> RendererBlock {
        RendererBlock {
            frame_size: Vec2::new(columns, rows),
            num_frames: (columns * rows) as u32,
            softness: 0.5,
            ..RendererBlock::default()
        }
    }

    #[test_case(0, Vec2::new(0.0, 0.0) ; "first cell")]
    #[test_case(3, Vec2::new(0.75, 0.0) ; "end of first row")]
    #[test_case(5, Vec2::new(0.25, 0.5) ; "second row")]
    fn test_uv_rect(frame: u32, min: Vec2) {
        let (min_uv, max_uv) = uv_rect(frame, &atlas(4.0, 2.0));
        assert_eq!(min_uv, min.extend(0.0));
        assert_eq!(max_uv, (min + Vec2::new(0.25, 0.5)).extend(0.5));
    }

    #[test]
    fn test_billboard_identity_basis() {
        let m = billboard(Vec3::new(1.0, 2.0, 3.0), Vec3::Z, Vec3::Y);
        assert_eq!(m, Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_billboard_degenerate_up() {
        let m = billboard(Vec3::ZERO, Vec3::Y, Vec3::Y);
        assert!(m.is_finite());
        let x = m.x_axis.truncate();
        let y = m.y_axis.truncate();
        let z = m.z_axis.truncate();
        assert!((x.length() - 1.0).abs() < 1e-5);
        assert!(x.dot(z).abs() < 1e-5);
        assert!(y.dot(z).abs() < 1e-5);
    }

    fn particle_with_velocity(velocity: Vec3) -> Particle {
        Particle {
            velocity,
            ..Particle::default()
        }
    }

    #[test_case(OrientationMode::Default, Vec3::new(0.0, 0.5, 1.0), Vec3::Y ; "faces camera")]
    #[test_case(OrientationMode::Horizontal, Vec3::Y, Vec3::X ; "lies flat")]
    #[test_case(OrientationMode::Vertical, Vec3::Z, Vec3::Y ; "yaw only")]
    fn test_orientation_modes(mode: OrientationMode, to_camera: Vec3, up: Vec3) {
        let camera = Camera {
            front: Vec3::new(0.0, -0.5, -1.0),
            up: Vec3::Y,
        };
        let particle = particle_with_velocity(Vec3::ZERO);
        assert_eq!(
            orientation(mode, &particle, Vec3::NEG_Z, &camera),
            (to_camera, up)
        );
    }

    #[test]
    fn test_stretched_follows_velocity() {
        let particle = particle_with_velocity(Vec3::new(3.0, 0.0, 0.0));
        let (to_camera, up) =
            orientation(OrientationMode::Stretched, &particle, Vec3::NEG_Z, &Camera::default());
        assert_eq!(up, Vec3::X);
        assert_eq!(to_camera, Vec3::NEG_Z.cross(Vec3::X));
    }

    #[test]
    fn test_stretched_at_rest_uses_emitter_front() {
        let particle = particle_with_velocity(Vec3::ZERO);
        let (_, up) =
            orientation(OrientationMode::Stretched, &particle, Vec3::NEG_Z, &Camera::default());
        assert_eq!(up, Vec3::NEG_Z);
    }

    #[test]
    fn test_batch_built_from_pool() {
        let mut def = ParticleDefinition::default();
        def.emission.rate_time = 3;
        def.renderer.texture = "spark.png".to_string();
        def.renderer.technique = "additive".to_string();

        let transform = EmitterTransform::from_translation(Vec3::new(5.0, 0.0, 0.0));
        let environment = StillAir::default();
        let mut rng = SeededRandom::new(4);
        let settings = SimulationSettings::default();
        let mut ctx = StepContext::new(Some(&transform), &environment, &mut rng, &settings);

        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut ctx);
        instance.update(0.1, &mut ctx);

        let batch = build_render_batch(&instance, Some(&transform), &Camera::default())
            .unwrap_or_else(|| panic!("batch should be built"));
        assert_eq!(batch.texture, "spark.png");
        assert_eq!(batch.technique, "additive");
        assert_eq!(batch.instances.len(), 3);
        for (record, particle) in batch.instances.iter().zip(instance.particles()) {
            assert_eq!(record.transform.w_axis.truncate(), particle.position);
            assert_eq!(record.color, particle.color);
        }

        assert!(build_render_batch(&instance, None, &Camera::default()).is_none());
    }
}
