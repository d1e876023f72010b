//! Formatting utilities

use glam::{Vec2, Vec3, Vec4};

/// Format a 2D vector
pub fn format_vec2(v: Vec2) -> String {
    format!("({:.2}, {:.2})", v.x, v.y)
}

/// Format a 3D vector
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

/// Format an RGBA color
pub fn format_color(c: Vec4) -> String {
    format!("rgba({:.2}, {:.2}, {:.2}, {:.2})", c.x, c.y, c.z, c.w)
}

/// Format a duration in seconds, with "never" for non-positive lifetimes
pub fn format_seconds(seconds: f32) -> String {
    if seconds > 0.0 {
        format!("{seconds:.2}s")
    } else {
        "never".to_string()
    }
}

/// Format a ratio as a percentage
pub fn format_percentage(value: f32) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3(Vec3::new(1.0, -0.5, 2.25)), "(1.00, -0.50, 2.25)");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(1.5), "1.50s");
        assert_eq!(format_seconds(0.0), "never");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.25), "25.0%");
    }
}
