use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Vec3, Vec4};
use vfx_particles::{
    Camera, EmitterTransform, OrientationMode, ParticleDefinition, ParticleInstance, SeededRandom,
    Shape, SimulationSettings, StepContext, StillAir, Track, particles::build_render_batch,
};

fn busy_definition(max_particles: usize) -> ParticleDefinition {
    let mut def = ParticleDefinition::default();
    def.system.max_particles = max_particles;
    def.system.looping = true;
    def.system.duration = 0.0;
    def.system.gravity_scale = 0.2;
    def.shape = Shape::Sphere { radius: 2.0 };
    def.noise.strength = 0.3;
    def.velocity.wind_factor = 1.0;
    def.velocity.acceleration = 1.5;
    def.velocity.velocity = Track::linear([(0.0, Vec3::ZERO), (1.0, Vec3::Y)]);
    def.color.colors = Track::linear([(0.0, Vec4::ONE), (1.0, Vec4::ZERO)]);
    def.emission.rate_time = max_particles as u32;
    def.emission.time_ratio = 0.001;
    def.renderer.mode = OrientationMode::Stretched;
    def
}

fn filled_instance(
    max_particles: usize,
    transform: &EmitterTransform,
    environment: &StillAir,
    rng: &mut SeededRandom,
    settings: &SimulationSettings,
) -> ParticleInstance {
    let mut instance = ParticleInstance::from_definition(Arc::new(busy_definition(max_particles)));
    let mut ctx = StepContext::new(Some(transform), environment, rng, settings);
    instance.launch(&mut ctx);
    while instance.len() < max_particles {
        instance.update(0.001, &mut ctx);
    }
    instance
}

fn bench_update(c: &mut Criterion) {
    let transform = EmitterTransform::default();
    let environment = StillAir {
        wind: Vec3::new(0.5, 0.0, 0.0),
    };
    let settings = SimulationSettings::default();
    let mut group = c.benchmark_group("update");

    for count in [256usize, 4096] {
        let mut rng = SeededRandom::new(1);
        let mut instance = filled_instance(count, &transform, &environment, &mut rng, &settings);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut ctx = StepContext::new(Some(&transform), &environment, &mut rng, &settings);
                black_box(instance.update(black_box(1.0 / 60.0), &mut ctx));
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let transform = EmitterTransform::default();
    let environment = StillAir::default();
    let settings = SimulationSettings::default();
    let mut rng = SeededRandom::new(2);
    let instance = filled_instance(4096, &transform, &environment, &mut rng, &settings);
    let camera = Camera::default();

    c.bench_function("render_batch_4096", |b| {
        b.iter(|| black_box(build_render_batch(&instance, Some(&transform), &camera)));
    });
}

criterion_group!(benches, bench_update, bench_render);
criterion_main!(benches);
