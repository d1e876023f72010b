//! Runtime state of one attached particle effect
//!
//! A [`ParticleInstance`] owns its particle pool, emission schedule and fade
//! state. The definition it runs is shared and read-only; everything that
//! changes from frame to frame lives here.

use std::f32::consts::PI;
use std::sync::{Arc, Weak};

use glam::{Quat, Vec3};

use super::emission::EmissionScheduler;
use super::fade::FadeController;
use super::noise;
use super::particle::Particle;
use super::shape::{sample_direction, sample_position};
use crate::definition::{ParticleDefinition, SimulationSpace};
use crate::library::DefinitionSlot;
use crate::providers::{Environment, RandomSource, TransformProvider};
use crate::settings::SimulationSettings;

/// Collaborators consulted during one step
pub struct StepContext<'a> {
    /// Transform of the owning entity, if it still exists
    pub transform: Option<&'a dyn TransformProvider>,
    pub environment: &'a dyn Environment,
    pub rng: &'a mut dyn RandomSource,
    pub settings: &'a SimulationSettings,
}

impl<'a> StepContext<'a> {
    pub fn new(
        transform: Option<&'a dyn TransformProvider>,
        environment: &'a dyn Environment,
        rng: &'a mut dyn RandomSource,
        settings: &'a SimulationSettings,
    ) -> Self {
        Self {
            transform,
            environment,
            rng,
            settings,
        }
    }
}

/// Rotation applied to definition vectors for the given simulation space
fn space_rotation(space: SimulationSpace, emitter: Quat) -> Quat {
    match space {
        SimulationSpace::Local => emitter,
        SimulationSpace::World => Quat::IDENTITY,
    }
}

/// One running instance of a particle effect
#[derive(Debug)]
pub struct ParticleInstance {
    slot: Weak<DefinitionSlot>,
    version: u64,
    definition: Arc<ParticleDefinition>,
    enabled: bool,
    deploy_time: f32,
    launch_pending: bool,
    scheduler: EmissionScheduler,
    fade: FadeController,
    pool: Vec<Particle>,
    emitted: u64,
    capacity_warned: bool,
}

impl ParticleInstance {
    /// Instance that follows reloads of `slot`
    pub fn new(slot: &Arc<DefinitionSlot>) -> Self {
        let (definition, version) = slot.snapshot();
        let mut instance = Self::from_definition(definition);
        instance.slot = Arc::downgrade(slot);
        instance.version = version;
        instance
    }

    /// Instance bound to a fixed definition
    pub fn from_definition(definition: Arc<ParticleDefinition>) -> Self {
        let scheduler = EmissionScheduler::new(&definition.emission, Vec3::ZERO);
        let capacity = definition.system.max_particles;
        Self {
            slot: Weak::new(),
            version: 0,
            definition,
            enabled: true,
            deploy_time: 0.0,
            launch_pending: true,
            scheduler,
            fade: FadeController::default(),
            pool: Vec::with_capacity(capacity),
            emitted: 0,
            capacity_warned: false,
        }
    }

    /// Start (or restart) the effect
    ///
    /// Clears the pool and all schedule state. One-shot systems emit their
    /// initial burst right away when the owning transform is known and there
    /// is no start delay; otherwise the burst goes out on the first step that
    /// passes the delay.
    pub fn launch(&mut self, ctx: &mut StepContext<'_>) {
        let position = ctx.transform.map_or(Vec3::ZERO, |t| t.position());
        self.pool.clear();
        self.deploy_time = 0.0;
        self.fade.reset();
        self.scheduler.reset(&self.definition.emission, position);
        self.emitted = 0;
        self.capacity_warned = false;
        self.launch_pending = true;

        log::debug!(
            "Launching particle system (max {} particles, looping: {})",
            self.definition.system.max_particles,
            self.definition.system.looping
        );

        if let Some(transform) = ctx.transform
            && self.definition.system.start_delay <= 0.0
        {
            self.finish_launch(transform, ctx);
        }
    }

    fn finish_launch(&mut self, transform: &dyn TransformProvider, ctx: &mut StepContext<'_>) {
        self.launch_pending = false;
        self.scheduler
            .reset(&self.definition.emission, transform.position());
        if self.enabled {
            let count =
                EmissionScheduler::launch_count(&self.definition.emission, self.definition.system.looping);
            self.emit(count, transform, ctx);
        }
    }

    /// Advance the effect by `dt` seconds
    ///
    /// Returns `false` once the effect has finished and can be dropped by its
    /// owner. An instance whose entity is gone stays alive and does nothing.
    pub fn update(&mut self, dt: f32, ctx: &mut StepContext<'_>) -> bool {
        self.sync_definition(ctx);

        let Some(transform) = ctx.transform else {
            return true;
        };

        self.deploy_time += dt;
        if self.is_delayed() {
            return true;
        }

        self.fade.step(dt);
        let dt = dt * self.definition.system.simulation_speed;

        if self.launch_pending {
            self.finish_launch(transform, ctx);
        }
        if self.enabled {
            let definition = Arc::clone(&self.definition);
            let requested = self.scheduler.step(
                &definition.emission,
                definition.system.looping,
                dt,
                self.deploy_time,
                transform.position(),
                ctx.settings.rate_min_distance,
            );
            self.emit(requested, transform, ctx);
        }
        self.resolve_collisions(dt);
        self.integrate(dt, transform, ctx);

        self.is_alive()
    }

    /// Adopt a newer definition from the slot, restarting the effect
    fn sync_definition(&mut self, ctx: &mut StepContext<'_>) {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };
        if slot.version() == self.version {
            return;
        }
        let (definition, version) = slot.snapshot();
        log::debug!(
            "Particle definition '{}' changed (version {} -> {version}), relaunching",
            slot.name(),
            self.version
        );
        self.definition = definition;
        self.version = version;
        self.launch(ctx);
    }

    fn emit(&mut self, requested: u32, transform: &dyn TransformProvider, ctx: &mut StepContext<'_>) {
        if requested == 0 {
            return;
        }
        let max_particles = self.definition.system.max_particles;
        let available = max_particles.saturating_sub(self.pool.len());
        let count = (requested as usize).min(available);

        if count < requested as usize && !self.capacity_warned {
            self.capacity_warned = true;
            log::warn!(
                "Particle pool full ({max_particles} particles), dropping {} of {requested} requested",
                requested as usize - count
            );
        }

        let definition = Arc::clone(&self.definition);
        for _ in 0..count {
            let particle = spawn_particle(&definition, transform, ctx.rng);
            self.pool.push(particle);
        }
        self.emitted += count as u64;
        log::trace!("Emitted {count} particles ({} alive)", self.pool.len());
    }

    /// Collision hook; particles currently pass through all geometry
    fn resolve_collisions(&mut self, _dt: f32) {}

    fn integrate(&mut self, dt: f32, transform: &dyn TransformProvider, ctx: &mut StepContext<'_>) {
        let definition = Arc::clone(&self.definition);
        let system = &definition.system;
        let velocity_block = &definition.velocity;
        let renderer = &definition.renderer;

        let curve_rotation = space_rotation(velocity_block.space, transform.rotation());
        let world = transform.world_matrix();
        let gravity = ctx.settings.gravity * system.gravity_scale * dt;
        let wind = ctx.environment.wind_velocity() * velocity_block.wind_factor * dt;
        let fade_ratio = self.fade.ratio();
        let num_frames = renderer.num_frames.max(1);

        let mut index = 0;
        while index < self.pool.len() {
            let particle = &mut self.pool[index];
            particle.lifetime_elapsed += dt;
            if particle.is_expired() {
                self.pool.swap_remove(index);
                continue;
            }
            let life = particle.life_ratio();

            let curve = curve_rotation * velocity_block.velocity.evaluate(life);
            particle.velocity = particle.origin_velocity * system.start_speed
                + curve * velocity_block.acceleration * dt
                + gravity;
            if definition.noise.strength > 0.0 {
                particle.velocity +=
                    noise::perturb(particle.random_direction, definition.noise.strength, dt, ctx.rng);
            }

            // Attached particles restart from the emitter each step; only this step's offset applies
            if particle.inherits_transform {
                particle.position = world.transform_point3(particle.origin_position);
            }
            particle.position += particle.velocity * dt + wind;

            particle.rotation += velocity_block.rotation.evaluate(life) * dt;

            let mut color = definition.color.colors.evaluate(life) * fade_ratio;
            color.w *= definition.color.opacity;
            particle.color = color;

            particle.size = system.start_size * definition.size.sizes.evaluate(life);

            let advance = (particle.lifetime_elapsed * renderer.frame_speed).floor() as u32;
            particle.frame = particle.init_frame + renderer.initial_frame + advance % num_frames;

            index += 1;
        }
    }

    /// Whether the effect still has work to do
    ///
    /// Alive while the fade has not run out and particles remain or the
    /// system loops. Two more cases keep a one-shot system alive: a launch
    /// still waiting on its start delay, and bursts left on an enabled
    /// instance. A burst that has fired its last cycle is only dropped on the
    /// following step, so such a system can outlive its particles by one step.
    pub fn is_alive(&self) -> bool {
        let pending = self.launch_pending || (self.enabled && !self.scheduler.bursts().is_empty());
        !self.fade.is_finished()
            && (!self.pool.is_empty() || self.definition.system.looping || pending)
    }

    /// Start a global fade-out over `duration` seconds
    pub fn fade_out(&mut self, duration: f32) {
        self.fade.fade_out(duration);
    }

    /// Whether a fade-out has been requested
    pub fn is_fading(&self) -> bool {
        self.fade.is_fading()
    }

    /// Enable or disable emission; live particles keep simulating
    pub fn set_active(&mut self, active: bool) {
        self.enabled = active;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the start delay is still holding the effect back
    pub fn is_delayed(&self) -> bool {
        self.deploy_time < self.definition.system.start_delay
    }

    /// Live particles, in pool order
    pub fn particles(&self) -> &[Particle] {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Definition currently in use
    pub fn definition(&self) -> &Arc<ParticleDefinition> {
        &self.definition
    }

    /// Version of the slot definition last adopted (0 for a fixed definition)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Seconds since launch
    pub fn deploy_time(&self) -> f32 {
        self.deploy_time
    }

    /// Current global opacity multiplier
    pub fn fade_ratio(&self) -> f32 {
        self.fade.ratio()
    }

    /// Particles emitted since the last launch
    pub fn emitted_total(&self) -> u64 {
        self.emitted
    }

    /// Emission schedule state
    pub fn scheduler(&self) -> &EmissionScheduler {
        &self.scheduler
    }
}

/// Create one particle at the emitter's current transform
fn spawn_particle(
    definition: &ParticleDefinition,
    transform: &dyn TransformProvider,
    rng: &mut dyn RandomSource,
) -> Particle {
    let system = &definition.system;
    let rotation = transform.rotation();

    let origin_position = sample_position(&definition.shape, rng) + system.offset;
    let direction = rotation * sample_direction(&definition.shape, rng);
    let origin_velocity = direction
        + space_rotation(definition.velocity.space, rotation) * definition.velocity.constant_velocity;

    let jitter = Vec3::new(
        rng.uniform(-1.0, 1.0),
        rng.uniform(-1.0, 1.0),
        rng.uniform(-1.0, 1.0),
    );
    let scale_variation = definition.size.scale_variation;
    let lifetime_variation = definition.emission.variation;
    let num_frames = definition.renderer.num_frames.max(1);
    let init_frame = (rng.uniform(0.0, num_frames as f32).floor() as u32).min(num_frames - 1);

    Particle {
        origin_position,
        origin_velocity,
        position: transform.world_matrix().transform_point3(origin_position),
        velocity: origin_velocity,
        random_direction: noise::random_direction(rng),
        rotation: system.start_rotation + jitter * system.random_rotation * PI,
        color: definition.color.colors.evaluate(0.0),
        size: system.start_size * definition.size.sizes.evaluate(0.0),
        scale: definition.size.scale + rng.uniform(-scale_variation, scale_variation),
        frame: definition.renderer.initial_frame,
        init_frame,
        lifetime_elapsed: 0.0,
        max_lifetime: system.duration + rng.uniform(-lifetime_variation, lifetime_variation),
        inherits_transform: definition.velocity.inherit_velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Burst;
    use crate::providers::{EmitterTransform, SeededRandom, StillAir};

    struct Fixture {
        transform: EmitterTransform,
        environment: StillAir,
        rng: SeededRandom,
        settings: SimulationSettings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                transform: EmitterTransform::default(),
                environment: StillAir::default(),
                rng: SeededRandom::new(9),
                settings: SimulationSettings::default(),
            }
        }

        fn ctx(&mut self) -> StepContext<'_> {
            StepContext::new(
                Some(&self.transform),
                &self.environment,
                &mut self.rng,
                &self.settings,
            )
        }
    }

    fn one_shot(rate_time: u32) -> ParticleDefinition {
        let mut def = ParticleDefinition::default();
        def.emission.rate_time = rate_time;
        def
    }

    #[test]
    fn test_launch_emits_initial_burst() {
        let mut fx = Fixture::new();
        let mut instance = ParticleInstance::from_definition(Arc::new(one_shot(10)));
        instance.launch(&mut fx.ctx());
        assert_eq!(instance.len(), 10);
        assert_eq!(instance.emitted_total(), 10);
    }

    #[test]
    fn test_launch_truncated_by_capacity() {
        let mut fx = Fixture::new();
        let mut def = one_shot(50);
        def.system.max_particles = 8;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());
        assert_eq!(instance.len(), 8);
    }

    #[test]
    fn test_start_delay_defers_everything() {
        let mut fx = Fixture::new();
        let mut def = one_shot(3);
        def.system.start_delay = 1.0;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());
        assert!(instance.is_empty());

        assert!(instance.update(0.5, &mut fx.ctx()));
        assert!(instance.is_empty());
        assert!(instance.is_delayed());

        assert!(instance.update(0.5, &mut fx.ctx()));
        assert_eq!(instance.len(), 3);
    }

    #[test]
    fn test_missing_transform_is_inert() {
        let mut fx = Fixture::new();
        let mut instance = ParticleInstance::from_definition(Arc::new(one_shot(4)));
        let mut ctx = StepContext::new(None, &fx.environment, &mut fx.rng, &fx.settings);
        instance.launch(&mut ctx);
        for _ in 0..10 {
            assert!(instance.update(1.0, &mut ctx));
        }
        assert!(instance.is_empty());
        assert_eq!(instance.deploy_time(), 0.0);
    }

    #[test]
    fn test_particle_removed_on_expiry_step() {
        let mut fx = Fixture::new();
        let mut def = one_shot(1);
        def.system.duration = 1.0;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());

        for step in 1..=3 {
            assert!(instance.update(0.25, &mut fx.ctx()));
            assert_eq!(instance.particles()[0].lifetime_elapsed, step as f32 * 0.25);
        }
        assert!(!instance.update(0.25, &mut fx.ctx()));
        assert!(instance.is_empty());
    }

    #[test]
    fn test_disabled_instance_keeps_integrating() {
        let mut fx = Fixture::new();
        let mut def = ParticleDefinition::default();
        def.system.looping = true;
        def.system.duration = 0.0;
        def.emission.rate_time = 1;
        def.emission.time_ratio = 0.1;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());

        instance.update(0.1, &mut fx.ctx());
        assert_eq!(instance.len(), 1);
        let before = instance.particles()[0].position;

        instance.set_active(false);
        for _ in 0..5 {
            assert!(instance.update(0.1, &mut fx.ctx()));
        }
        assert_eq!(instance.len(), 1);
        assert_ne!(instance.particles()[0].position, before);
    }

    #[test]
    fn test_pending_burst_keeps_instance_alive() {
        let mut fx = Fixture::new();
        let mut def = ParticleDefinition::default();
        def.emission.bursts.push(Burst {
            time: 1.0,
            count: 2,
            ..Burst::default()
        });
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());

        assert!(instance.update(0.5, &mut fx.ctx()));
        assert!(instance.is_empty());
        assert!(instance.update(0.5, &mut fx.ctx()));
        assert_eq!(instance.len(), 2);
    }

    #[test]
    fn test_spent_burst_outlives_particles_by_one_step() {
        let mut fx = Fixture::new();
        let mut def = ParticleDefinition::default();
        def.system.duration = 0.1;
        def.emission.bursts.push(Burst {
            count: 1,
            ..Burst::default()
        });
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());

        assert!(instance.update(0.1, &mut fx.ctx()));
        assert_eq!(instance.emitted_total(), 1);
        assert!(instance.is_empty());
        assert_eq!(instance.scheduler().bursts()[0].cycles, 0);

        assert!(!instance.update(0.1, &mut fx.ctx()));
        assert!(instance.scheduler().bursts().is_empty());
    }

    #[test]
    fn test_slot_reload_restarts_instance() {
        let mut fx = Fixture::new();
        let slot = DefinitionSlot::new("sparks", one_shot(2));
        let mut instance = ParticleInstance::new(&slot);
        instance.launch(&mut fx.ctx());
        assert_eq!(instance.len(), 2);
        assert_eq!(instance.version(), 1);

        let mut replacement = one_shot(6);
        replacement.system.duration = 5.0;
        slot.replace(replacement);

        assert!(instance.update(0.1, &mut fx.ctx()));
        assert_eq!(instance.version(), 2);
        assert_eq!(instance.len(), 6);
        assert_eq!(instance.definition().system.duration, 5.0);
    }

    #[test]
    fn test_dropped_slot_keeps_last_definition() {
        let mut fx = Fixture::new();
        let slot = DefinitionSlot::new("smoke", one_shot(1));
        let mut instance = ParticleInstance::new(&slot);
        instance.launch(&mut fx.ctx());
        drop(slot);

        assert!(instance.update(0.1, &mut fx.ctx()));
        assert_eq!(instance.len(), 1);
        assert_eq!(instance.version(), 1);
    }

    #[test]
    fn test_color_applies_fade_and_opacity() {
        let mut fx = Fixture::new();
        let mut def = one_shot(1);
        def.system.duration = 0.0;
        def.color.opacity = 0.5;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());
        instance.fade_out(1.0);

        assert!(instance.is_fading());
        instance.update(0.25, &mut fx.ctx());
        let color = instance.particles()[0].color;
        assert!((color.x - 0.75).abs() < 1e-6);
        assert!((color.w - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_overrun_fade_scales_every_channel() {
        let mut fx = Fixture::new();
        let mut def = one_shot(1);
        def.system.duration = 0.0;
        def.color.opacity = 0.5;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());
        instance.fade_out(1.0);

        assert!(!instance.update(1.5, &mut fx.ctx()));
        let color = instance.particles()[0].color;
        assert!((color.x + 0.5).abs() < 1e-6);
        assert!((color.y + 0.5).abs() < 1e-6);
        assert!((color.z + 0.5).abs() < 1e-6);
        assert!((color.w + 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_frame_cycles_through_atlas() {
        let mut fx = Fixture::new();
        let mut def = one_shot(1);
        def.system.duration = 0.0;
        def.renderer.num_frames = 4;
        def.renderer.frame_speed = 2.0;
        let mut instance = ParticleInstance::from_definition(Arc::new(def));
        instance.launch(&mut fx.ctx());

        let init = instance.particles()[0].init_frame;
        assert!(init < 4);
        let mut frames = Vec::new();
        for _ in 0..6 {
            instance.update(0.5, &mut fx.ctx());
            frames.push(instance.particles()[0].frame - init);
        }
        assert_eq!(frames, vec![1, 2, 3, 0, 1, 2]);
    }
}
