use crate::projection::{bounds_edges, boid_segment, trail_segments, Camera, ScreenPoint};
use anyhow::Result;
use flock_core::{Boid, Bounds, Rgba};
use flock_shared::DisplaySettings;
use opencv::{
    core::{Mat, Point, Scalar, CV_8UC3},
    imgproc,
    prelude::*,
};

fn pixel(point: ScreenPoint) -> Point {
    Point::new(point.x.round() as i32, point.y.round() as i32)
}

/// Converts an RGBA color to a BGR scalar, blended over the black background.
pub fn color_scalar(color: Rgba) -> Scalar {
    let alpha = color[3] as f64 / 255.0;
    Scalar::new(
        color[2] as f64 * alpha,
        color[1] as f64 * alpha,
        color[0] as f64 * alpha,
        0.0,
    )
}

/// Trails are drawn at half the boid's alpha.
fn trail_color(color: Rgba) -> Scalar {
    color_scalar([color[0], color[1], color[2], color[3] / 2])
}

/// Draws flock snapshots into an off-screen frame
pub struct Renderer {
    camera: Camera,
    boid_size: f64,
    bounds: Option<Bounds>,
    trails: bool,
    frame: Mat,
}

impl Renderer {
    pub fn new(display: &DisplaySettings, bounds: Bounds) -> Self {
        Self {
            camera: Camera::new(display),
            boid_size: display.boid_size,
            bounds: display.draw_bounds.then_some(bounds),
            trails: display.draw_trails,
            frame: Mat::default(),
        }
    }

    /// Renders one frame and returns it. Returns how many boids were visible.
    pub fn draw<const H: usize>(&mut self, boids: &[Boid<H>]) -> Result<(&Mat, usize)> {
        self.frame = Mat::new_rows_cols_with_default(
            self.camera.height as i32,
            self.camera.width as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;

        if let Some(bounds) = self.bounds {
            let white = Scalar::new(255.0, 255.0, 255.0, 0.0);
            for edge in bounds_edges(&bounds) {
                if let Some((from, to)) = self.camera.project_segment(edge) {
                    imgproc::line(&mut self.frame, pixel(from), pixel(to), white, 2, imgproc::LINE_AA, 0)?;
                }
            }
        }

        if self.trails {
            for boid in boids {
                let color = trail_color(boid.color());
                for segment in trail_segments(boid) {
                    if let Some((from, to)) = self.camera.project_segment(segment) {
                        imgproc::line(&mut self.frame, pixel(from), pixel(to), color, 1, imgproc::LINE_AA, 0)?;
                    }
                }
            }
        }

        let mut visible = 0;
        for boid in boids {
            let Some(segment) = boid_segment(boid, self.boid_size) else {
                continue;
            };
            let Some((from, to)) = self.camera.project_segment(segment) else {
                continue;
            };

            imgproc::line(
                &mut self.frame,
                pixel(from),
                pixel(to),
                color_scalar(boid.color()),
                1,
                imgproc::LINE_AA,
                0,
            )?;
            visible += 1;
        }

        Ok((&self.frame, visible))
    }
}
