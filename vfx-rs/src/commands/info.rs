//! Definition summary command

use anyhow::Result;
use std::path::Path;
use vfx_particles::{ParticleDefinition, Shape};

use crate::loader::{effect_name, load_definition};
use crate::utils::{
    add_property, add_table_row, create_table, format_color, format_percentage, format_seconds,
    format_vec2, format_vec3,
};

pub fn execute(path: &Path, detailed: bool) -> Result<()> {
    let definition = load_definition(path)?;

    println!("Particle effect: {}", effect_name(path));
    println!();
    print_summary(&definition);

    match definition.validate() {
        Ok(()) => println!("\n✓ Definition is valid"),
        Err(e) => println!("\n✗ {e}"),
    }

    if detailed {
        println!("\n=== Detailed Information ===");
        println!("{definition:#?}");
    }

    Ok(())
}

fn describe_shape(shape: &Shape) -> String {
    match *shape {
        Shape::Point => "point".to_string(),
        Shape::Line { length } => format!("line (length {length:.2})"),
        Shape::Square { size } => format!("square {}", format_vec2(size)),
        Shape::Box { size } => format!("box {}", format_vec3(size)),
        Shape::Sphere { radius } => format!("sphere (radius {radius:.2})"),
        Shape::Circle { radius } => format!("circle (radius {radius:.2})"),
        Shape::Cone { radius, angle } => {
            format!("cone (radius {radius:.2}, angle {:.1}°)", angle.to_degrees())
        }
    }
}

fn print_summary(definition: &ParticleDefinition) {
    let system = &definition.system;
    let velocity = &definition.velocity;
    let emission = &definition.emission;
    let renderer = &definition.renderer;

    let mut table = create_table(&["Property", "Value"]);
    add_property(&mut table, "Max particles", system.max_particles);
    add_property(&mut table, "Lifetime", format_seconds(system.duration));
    add_property(&mut table, "Lifetime variation", format!("±{:.2}s", emission.variation));
    add_property(&mut table, "Start delay", format!("{:.2}s", system.start_delay));
    add_property(&mut table, "Looping", system.looping);
    add_property(&mut table, "Simulation speed", format!("{:.2}x", system.simulation_speed));
    add_property(&mut table, "Shape", describe_shape(&definition.shape));
    add_property(&mut table, "Spawn offset", format_vec3(system.offset));
    add_property(&mut table, "Velocity space", format!("{:?}", velocity.space));
    add_property(&mut table, "Constant velocity", format_vec3(velocity.constant_velocity));
    add_property(&mut table, "Inherit velocity", velocity.inherit_velocity);
    add_property(&mut table, "Noise strength", format!("{:.2}", definition.noise.strength));
    add_property(
        &mut table,
        "Start color",
        format_color(definition.color.colors.evaluate(0.0)),
    );
    add_property(
        &mut table,
        "End color",
        format_color(definition.color.colors.evaluate(1.0)),
    );
    add_property(&mut table, "Opacity", format_percentage(definition.color.opacity));
    add_property(
        &mut table,
        "Rate over time",
        match emission.period() {
            Some(period) => format!("{} (every {period:.2}s)", emission.rate_time),
            None => "off".to_string(),
        },
    );
    add_property(&mut table, "Rate over distance", emission.rate_distance);
    add_property(&mut table, "Bursts", emission.bursts.len());
    add_property(&mut table, "Texture", display_or_none(&renderer.texture));
    add_property(&mut table, "Technique", display_or_none(&renderer.technique));
    add_property(
        &mut table,
        "Atlas",
        format!("{} ({} frames)", format_vec2(renderer.frame_size), renderer.num_frames),
    );
    add_property(&mut table, "Orientation", format!("{:?}", renderer.mode));
    table.printstd();

    if !emission.bursts.is_empty() {
        println!("\nBursts:");
        let mut bursts = create_table(&["#", "Time", "Count", "Interval", "Cycles"]);
        for (index, burst) in emission.bursts.iter().enumerate() {
            add_table_row(
                &mut bursts,
                vec![
                    index.to_string(),
                    format!("{:.2}s", burst.time),
                    burst.count.to_string(),
                    format!("{:.2}s", burst.interval),
                    burst.cycles.to_string(),
                ],
            );
        }
        bursts.printstd();
    }
}

fn display_or_none(value: &str) -> &str {
    if value.is_empty() { "(none)" } else { value }
}
