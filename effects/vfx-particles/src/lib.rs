//! CPU particle simulation core
//!
//! `vfx-particles` runs particle effects described by an immutable
//! [`ParticleDefinition`]: it schedules emission, samples spawn shapes,
//! integrates particles through life-ratio curves, fades whole effects out and
//! reduces each frame to a flat [`RenderBatch`].
//!
//! Loading definitions, drawing, entity lookup and wind live outside this
//! crate and reach it through the traits in [`providers`].

pub mod definition;
pub mod error;
pub mod library;
pub mod particles;
pub mod providers;
pub mod settings;
pub mod track;

pub use definition::{
    Burst, ColorBlock, EmissionBlock, NoiseBlock, OrientationMode, ParticleDefinition,
    RendererBlock, SimulationSpace, SizeBlock, SystemBlock, VelocityBlock,
};
pub use error::{ParticleError, Result};
pub use library::{DefinitionLibrary, DefinitionSlot};
pub use particles::{
    EntityId, EntityResolver, Particle, ParticleHandle, ParticleInstance, ParticleManager,
    RenderBatch, RenderInstance, Shape, ShapeKind, ShapeParts, StepContext,
};
pub use providers::{
    Camera, CameraProvider, EmitterTransform, Environment, RandomSource, SeededRandom, StillAir,
    TransformProvider,
};
pub use settings::SimulationSettings;
pub use track::Track;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
