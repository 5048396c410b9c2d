use flock_core::{Boid, Bounds, Vector3D};
use flock_shared::DisplaySettings;

const NEAR_PLANE: f64 = 1.0;

/// A position in window pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Perspective camera on the z axis looking at the origin with +y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye_z: f64,
    pub width: f64,
    pub height: f64,
    pub near: f64,
    pub far: f64,
    focal: f64,
}

impl Camera {
    pub fn new(display: &DisplaySettings) -> Self {
        let half_angle = display.view_angle.to_radians() / 2.0;
        Self {
            eye_z: display.camera_z,
            width: display.width as f64,
            height: display.height as f64,
            near: NEAR_PLANE,
            far: display.max_depth,
            focal: 1.0 / half_angle.tan(),
        }
    }

    /// Projects a world point into the window. `None` outside the depth range.
    pub fn project(&self, point: Vector3D) -> Option<ScreenPoint> {
        let depth = self.eye_z - point.z;
        if !(depth >= self.near && depth <= self.far) {
            return None;
        }

        let aspect = self.width / self.height;
        let ndc_x = self.focal / aspect * point.x / depth;
        let ndc_y = self.focal * point.y / depth;

        Some(ScreenPoint {
            x: (ndc_x + 1.0) / 2.0 * self.width,
            y: (1.0 - ndc_y) / 2.0 * self.height,
        })
    }

    /// Projects both ends of a segment; `None` if either end is not visible.
    pub fn project_segment(
        &self,
        (from, to): (Vector3D, Vector3D),
    ) -> Option<(ScreenPoint, ScreenPoint)> {
        Some((self.project(from)?, self.project(to)?))
    }
}

/// Line through the boid along its heading, `size` long on each side.
///
/// Boids that are not moving have no heading and yield `None`.
pub fn boid_segment<const H: usize>(boid: &Boid<H>, size: f64) -> Option<(Vector3D, Vector3D)> {
    let speed = boid.velocity.length();
    if !(speed > 0.0) || !speed.is_finite() {
        return None;
    }

    let half = boid.velocity * (size / speed);
    Some((boid.position - half, boid.position + half))
}

/// Consecutive pairs of recorded positions, oldest first.
pub fn trail_segments<const H: usize>(
    boid: &Boid<H>,
) -> impl Iterator<Item = (Vector3D, Vector3D)> + '_ {
    boid.trail().zip(boid.trail().skip(1)).map(|(a, b)| (*a, *b))
}

/// The twelve edges of the bounding box.
pub fn bounds_edges(bounds: &Bounds) -> [(Vector3D, Vector3D); 12] {
    let (lo, hi) = (bounds.min, bounds.max);
    let corner = |x: f64, y: f64, z: f64| Vector3D::new(x, y, z);

    let near = [
        corner(lo.x, lo.y, lo.z),
        corner(hi.x, lo.y, lo.z),
        corner(hi.x, hi.y, lo.z),
        corner(lo.x, hi.y, lo.z),
    ];
    let far = [
        corner(lo.x, lo.y, hi.z),
        corner(hi.x, lo.y, hi.z),
        corner(hi.x, hi.y, hi.z),
        corner(lo.x, hi.y, hi.z),
    ];

    let mut edges = [(Vector3D::zero(), Vector3D::zero()); 12];
    for i in 0..4 {
        let next = (i + 1) % 4;
        edges[i] = (near[i], near[next]);
        edges[i + 4] = (far[i], far[next]);
        edges[i + 8] = (near[i], far[i]);
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&DisplaySettings::default())
    }

    #[test]
    fn test_origin_projects_to_center() {
        let p = camera().project(Vector3D::zero()).unwrap();
        assert!((p.x - 400.0).abs() < 1e-9);
        assert!((p.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let cam = camera();
        let above = cam.project(Vector3D::new(0.0, 50.0, 0.0)).unwrap();
        let right = cam.project(Vector3D::new(50.0, 0.0, 0.0)).unwrap();
        assert!(above.y < 300.0);
        assert!(right.x > 400.0);
    }

    #[test]
    fn test_points_behind_camera_are_hidden() {
        let cam = camera();
        assert!(cam.project(Vector3D::new(0.0, 0.0, 250.0)).is_none());
        assert!(cam.project(Vector3D::new(0.0, 0.0, 300.0)).is_none());
        assert!(cam.project(Vector3D::new(0.0, 0.0, -800.0)).is_none());
    }

    #[test]
    fn test_boid_segment_follows_velocity() {
        let boid: Boid = Boid::new(Vector3D::new(10.0, 0.0, 0.0), Vector3D::new(0.0, 2.0, 0.0));
        let (from, to) = boid_segment(&boid, 5.0).unwrap();
        assert_eq!(from, Vector3D::new(10.0, -5.0, 0.0));
        assert_eq!(to, Vector3D::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_still_boid_has_no_segment() {
        let boid: Boid = Boid::new(Vector3D::zero(), Vector3D::zero());
        assert!(boid_segment(&boid, 5.0).is_none());
    }

    #[test]
    fn test_trail_segments_join_recorded_positions() {
        let mut boid: Boid<4> = Boid::new(Vector3D::zero(), Vector3D::zero());
        assert_eq!(trail_segments(&boid).count(), 0);

        for x in 0..6 {
            boid.position = Vector3D::new(x as f64, 0.0, 0.0);
            boid.record_position();
        }

        // Capacity 4 keeps x = 2..=5
        let segments: Vec<_> = trail_segments(&boid).collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], (Vector3D::new(2.0, 0.0, 0.0), Vector3D::new(3.0, 0.0, 0.0)));
        assert_eq!(segments[2], (Vector3D::new(4.0, 0.0, 0.0), Vector3D::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_bounds_edges_are_axis_aligned() {
        let edges = bounds_edges(&Bounds::default());
        for (a, b) in edges {
            let differing = [a.x != b.x, a.y != b.y, a.z != b.z]
                .iter()
                .filter(|&&d| d)
                .count();
            assert_eq!(differing, 1);
        }
    }
}
