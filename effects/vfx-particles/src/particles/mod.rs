//! Particle simulation runtime
//!
//! This module holds everything that runs per frame: spawn shapes, noise,
//! emission scheduling, the particle pool and its integrator, fading, and the
//! conversion of a pool into render batches.
//!
//! # Architecture
//!
//! - `Particle`: one live particle with kinematic and visual state
//! - `ParticleInstance`: pool, emission schedule and fade state of one attached effect
//! - `ParticleManager`: owner of every running instance, addressed by handle
//! - `RenderBatch`: flat per-frame output for the external renderer
//!
//! # Usage
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use vfx_particles::{
//!     Camera, DefinitionLibrary, EmitterTransform, EntityId, ParticleDefinition,
//!     ParticleManager, SimulationSettings,
//! };
//!
//! let mut definition = ParticleDefinition::default();
//! definition.emission.rate_time = 8;
//!
//! let mut library = DefinitionLibrary::new();
//! let slot = library.insert("puff", definition).unwrap();
//!
//! let entity = EntityId(1);
//! let scene = HashMap::from([(entity, EmitterTransform::default())]);
//!
//! let mut manager = ParticleManager::new(SimulationSettings::default());
//! let handle = manager.launch(&slot, entity, &scene);
//! manager.update(1.0 / 60.0, &scene);
//!
//! let batches = manager.render(&Camera::default(), &scene);
//! assert_eq!(batches[0].instances.len(), 8);
//! assert_eq!(manager.instance(handle).unwrap().len(), 8);
//! ```

mod emission;
mod fade;
mod instance;
mod manager;
pub mod noise;
mod particle;
mod render;
pub mod shape;

pub use emission::{BurstState, EmissionScheduler, SCHEDULE_EPSILON};
pub use fade::FadeController;
pub use instance::{ParticleInstance, StepContext};
pub use manager::{EntityId, EntityResolver, ParticleHandle, ParticleManager};
pub use particle::Particle;
pub use render::{RenderBatch, RenderInstance, billboard, build_render_batch};
pub use shape::{Shape, ShapeKind, ShapeParts, sample_direction, sample_position};
