use image::{GrayImage, ImageBuffer};
use rayon::prelude::*;

use crate::{enums::Interpolation, plane::PlanePose, volume::Volume};

/// Samples 2D images through a volume along arbitrary plane poses.
pub struct Reslicer;

impl Reslicer {
    /// Cut a `width` x `height` image through `pose`, centered on the pose
    /// origin, with square pixels of `pixel_spacing` millimetres.
    ///
    /// Image columns run along the pose's x axis and rows along its y axis.
    /// Samples outside the volume are black.
    pub fn reslice(
        volume: &Volume,
        pose: &PlanePose,
        width: u32,
        height: u32,
        pixel_spacing: f64,
        interpolation: Interpolation,
    ) -> Option<GrayImage> {
        if width == 0 || height == 0 || !(pixel_spacing > 0.0) {
            return None;
        }
        let half_w = (width - 1) as f64 / 2.0;
        let half_h = (height - 1) as f64 / 2.0;

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|row| {
                (0..width)
                    .map(|col| {
                        let u = (col as f64 - half_w) * pixel_spacing;
                        let v = (row as f64 - half_h) * pixel_spacing;
                        volume
                            .sample(pose.point_at(u, v), interpolation)
                            .map_or(0, Volume::normalize_to_u8)
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        ImageBuffer::from_raw(width, height, pixel_data)
    }

    /// Reslice with the isotropic output size of the pose's orientation.
    pub fn reslice_isotropic(volume: &Volume, pose: &PlanePose) -> Option<GrayImage> {
        let (width, height) = volume.get_output_dimensions(pose.orientation);
        Self::reslice(
            volume,
            pose,
            width,
            height,
            volume.min_spacing(),
            Interpolation::Linear,
        )
    }
}
