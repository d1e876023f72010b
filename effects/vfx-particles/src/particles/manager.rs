//! Owner of every running particle effect
//!
//! The manager assigns handles, resolves the owning entity of each instance
//! every frame, steps all instances with a shared random source and drops the
//! ones that report termination.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use glam::Vec3;

use super::instance::{ParticleInstance, StepContext};
use super::render::{RenderBatch, build_render_batch};
use crate::error::{ParticleError, Result};
use crate::library::DefinitionSlot;
use crate::providers::{
    CameraProvider, Environment, RandomSource, SeededRandom, StillAir, TransformProvider,
};
use crate::settings::SimulationSettings;

/// Identifier of a running particle effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleHandle(u32);

impl ParticleHandle {
    /// Raw handle value
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ParticleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the entity an effect is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Lookup from entity to its current transform
pub trait EntityResolver {
    /// Transform of `entity`, or `None` if it no longer exists
    fn resolve(&self, entity: EntityId) -> Option<&dyn TransformProvider>;
}

impl<T: TransformProvider> EntityResolver for HashMap<EntityId, T> {
    fn resolve(&self, entity: EntityId) -> Option<&dyn TransformProvider> {
        self.get(&entity).map(|t| t as &dyn TransformProvider)
    }
}

#[derive(Debug)]
struct Running {
    entity: EntityId,
    instance: ParticleInstance,
}

/// Collection of running particle effects
#[derive(Debug)]
pub struct ParticleManager<R: RandomSource = SeededRandom> {
    settings: SimulationSettings,
    wind: Vec3,
    rng: R,
    next_handle: u32,
    running: BTreeMap<ParticleHandle, Running>,
}

impl ParticleManager<SeededRandom> {
    /// Manager with the default seeded random source
    pub fn new(settings: SimulationSettings) -> Self {
        Self::with_rng(settings, SeededRandom::default())
    }
}

impl Default for ParticleManager<SeededRandom> {
    fn default() -> Self {
        Self::new(SimulationSettings::default())
    }
}

impl<R: RandomSource> ParticleManager<R> {
    /// Manager drawing every random decision from `rng`
    pub fn with_rng(settings: SimulationSettings, rng: R) -> Self {
        Self {
            settings,
            wind: Vec3::ZERO,
            rng,
            next_handle: 1,
            running: BTreeMap::new(),
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Set the global wind velocity
    pub fn set_wind_velocity(&mut self, wind: Vec3) {
        self.wind = wind;
    }

    /// Start a new instance of `slot` attached to `entity`
    pub fn launch(
        &mut self,
        slot: &Arc<DefinitionSlot>,
        entity: EntityId,
        resolver: &dyn EntityResolver,
    ) -> ParticleHandle {
        let handle = self.allocate_handle();
        let environment = StillAir { wind: self.wind };
        let mut instance = ParticleInstance::new(slot);
        let mut ctx = StepContext::new(
            resolver.resolve(entity),
            &environment,
            &mut self.rng,
            &self.settings,
        );
        instance.launch(&mut ctx);

        log::debug!(
            "Launched particle system '{}' as {handle} on entity {}",
            slot.name(),
            entity.0
        );
        self.running.insert(handle, Running { entity, instance });
        handle
    }

    /// Next handle not held by a running instance; 0 is never handed out
    fn allocate_handle(&mut self) -> ParticleHandle {
        loop {
            let handle = ParticleHandle(self.next_handle);
            self.next_handle = self.next_handle.wrapping_add(1).max(1);
            if !self.running.contains_key(&handle) {
                return handle;
            }
        }
    }

    /// Step every instance by `dt` seconds and return how many finished
    pub fn update(&mut self, dt: f32, resolver: &dyn EntityResolver) -> usize {
        let environment = StillAir { wind: self.wind };
        let rng = &mut self.rng;
        let settings = &self.settings;
        let before = self.running.len();

        self.running.retain(|handle, running| {
            let mut ctx = StepContext::new(
                resolver.resolve(running.entity),
                &environment,
                &mut *rng,
                settings,
            );
            let alive = running.instance.update(dt, &mut ctx);
            if !alive {
                log::debug!("Particle system {handle} finished");
            }
            alive
        });

        before - self.running.len()
    }

    /// Start fading out the instance over `duration` seconds
    pub fn fade_out(&mut self, handle: ParticleHandle, duration: f32) -> Result<()> {
        self.instance_mut(handle)?.fade_out(duration);
        Ok(())
    }

    /// Enable or disable emission for the instance
    pub fn set_active(&mut self, handle: ParticleHandle, active: bool) -> Result<()> {
        self.instance_mut(handle)?.set_active(active);
        Ok(())
    }

    /// Drop the instance immediately
    pub fn kill(&mut self, handle: ParticleHandle) -> Result<()> {
        self.running
            .remove(&handle)
            .map(|_| ())
            .ok_or(ParticleError::UnknownHandle(handle))
    }

    /// Render batches for every visible instance, in handle order
    pub fn render(
        &self,
        camera: &dyn CameraProvider,
        resolver: &dyn EntityResolver,
    ) -> Vec<RenderBatch> {
        self.running
            .values()
            .filter_map(|running| {
                build_render_batch(&running.instance, resolver.resolve(running.entity), camera)
            })
            .collect()
    }

    /// Running instance behind `handle`
    pub fn instance(&self, handle: ParticleHandle) -> Option<&ParticleInstance> {
        self.running.get(&handle).map(|running| &running.instance)
    }

    fn instance_mut(&mut self, handle: ParticleHandle) -> Result<&mut ParticleInstance> {
        self.running
            .get_mut(&handle)
            .map(|running| &mut running.instance)
            .ok_or(ParticleError::UnknownHandle(handle))
    }

    /// Handles of every running instance
    pub fn handles(&self) -> impl Iterator<Item = ParticleHandle> + '_ {
        self.running.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

impl<R: RandomSource> Environment for ParticleManager<R> {
    fn wind_velocity(&self) -> Vec3 {
        self.wind
    }
}
