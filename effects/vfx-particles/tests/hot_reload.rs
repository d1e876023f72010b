//! Definition reloads reaching running instances through the manager

use std::collections::HashMap;

use glam::Vec3;
use vfx_particles::{
    Camera, DefinitionLibrary, EmitterTransform, EntityId, ParticleDefinition, ParticleError,
    ParticleManager, SimulationSettings,
};

fn fountain(rate_time: u32) -> ParticleDefinition {
    let mut def = ParticleDefinition::default();
    def.system.duration = 0.0;
    def.emission.rate_time = rate_time;
    def.renderer.texture = "fountain.png".to_string();
    def
}

#[test]
fn test_reload_restarts_every_instance() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut library = DefinitionLibrary::new();
    let slot = library.insert("fountain", fountain(4)).unwrap();

    let a = EntityId(1);
    let b = EntityId(2);
    let scene = HashMap::from([
        (a, EmitterTransform::default()),
        (b, EmitterTransform::from_translation(Vec3::new(10.0, 0.0, 0.0))),
    ]);

    let mut manager = ParticleManager::new(SimulationSettings::default());
    let first = manager.launch(&slot, a, &scene);
    let second = manager.launch(&slot, b, &scene);
    manager.update(0.1, &scene);

    let mut replacement = fountain(9);
    replacement.renderer.texture = "fountain_v2.png".to_string();
    assert_eq!(library.reload("fountain", replacement).unwrap(), 2);

    manager.update(0.1, &scene);
    for handle in [first, second] {
        let instance = manager.instance(handle).unwrap();
        assert_eq!(instance.version(), 2);
        assert_eq!(instance.len(), 9);
        // Runtime state restarted with the new definition
        assert!((instance.deploy_time() - 0.1).abs() < 1e-6);
    }

    let batches = manager.render(&Camera::default(), &scene);
    assert!(batches.iter().all(|b| b.texture == "fountain_v2.png"));
}

#[test]
fn test_rejected_reload_leaves_instances_alone() {
    let mut library = DefinitionLibrary::new();
    let slot = library.insert("fountain", fountain(3)).unwrap();

    let entity = EntityId(5);
    let scene = HashMap::from([(entity, EmitterTransform::default())]);
    let mut manager = ParticleManager::new(SimulationSettings::default());
    let handle = manager.launch(&slot, entity, &scene);

    let mut broken = fountain(3);
    broken.system.simulation_speed = -1.0;
    assert!(matches!(
        library.reload("fountain", broken),
        Err(ParticleError::InvalidDefinition { .. })
    ));

    for _ in 0..5 {
        manager.update(0.2, &scene);
    }
    let instance = manager.instance(handle).unwrap();
    assert_eq!(instance.version(), 1);
    assert_eq!(instance.len(), 3);
    assert!((instance.deploy_time() - 1.0).abs() < 1e-5);
}

#[test]
fn test_removed_definition_keeps_running() {
    let mut library = DefinitionLibrary::new();
    let slot = library.insert("fountain", fountain(2)).unwrap();

    let entity = EntityId(3);
    let scene = HashMap::from([(entity, EmitterTransform::default())]);
    let mut manager = ParticleManager::new(SimulationSettings::default());
    let handle = manager.launch(&slot, entity, &scene);

    drop(slot);
    assert!(library.remove("fountain").is_some());
    assert_eq!(
        library.reload("fountain", fountain(1)),
        Err(ParticleError::UnknownDefinition("fountain".to_string()))
    );

    manager.update(0.1, &scene);
    assert_eq!(manager.instance(handle).unwrap().len(), 2);
}
