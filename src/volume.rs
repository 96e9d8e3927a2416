use crate::enums::{Interpolation, Orientation};
use crate::interpolator::Interpolator;
use crate::volume_frame::VolumeFrame;
use crate::volume_loader::VolumeLoaderError;

use glam::DVec3;
use ndarray::Array3;

/// A decoded scalar grid stored as (depth, height, width) = (z, y, x).
#[derive(Default)]
pub struct Volume {
    pub data: Array3<u16>,
    /// Voxel spacing along (x, y, z) in millimetres
    pub spacing: (f32, f32, f32),
    /// World position of voxel (0, 0, 0)
    pub origin: (f32, f32, f32),
    pub interpolated_dim: (u32, u32, u32),
}

impl Volume {
    pub fn new(data: Array3<u16>, spacing: (f32, f32, f32)) -> Self {
        let original_dim = data.dim();
        Self {
            data,
            spacing,
            origin: (0.0, 0.0, 0.0),
            interpolated_dim: Interpolator::get_isotropic_dimensions(spacing, original_dim),
        }
    }

    pub fn with_origin(mut self, origin: (f32, f32, f32)) -> Self {
        self.origin = origin;
        self
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<u16> {
        &self.data
    }

    /// Describe the loaded grid as an immutable frame.
    pub fn frame(&self) -> Result<VolumeFrame, VolumeLoaderError> {
        VolumeFrame::load(self)
    }

    #[inline]
    pub(crate) fn normalize_to_u8(value: f32) -> u8 {
        ((value / 65535.0) * 255.0).clamp(0.0, 255.0) as u8
    }

    /// Isotropic (width, height) of an image cut in `orientation`.
    pub fn get_output_dimensions(&self, orientation: Orientation) -> (u32, u32) {
        // Always return (width, height) - standard image convention
        match orientation {
            Orientation::Axial => {
                // Looking down Z-axis: X is width, Y is height
                (self.interpolated_dim.2, self.interpolated_dim.1)
            }
            Orientation::Coronal => {
                // Looking down Y-axis: X is width, Z is height
                (self.interpolated_dim.2, self.interpolated_dim.0)
            }
            Orientation::Sagittal => {
                // Looking down X-axis: Y is width, Z is height
                (self.interpolated_dim.1, self.interpolated_dim.0)
            }
        }
    }

    /// Smallest voxel edge, the pixel size of isotropic output.
    pub fn min_spacing(&self) -> f64 {
        let (x, y, z) = self.spacing;
        x.min(y).min(z) as f64
    }

    /// Continuous voxel index (x, y, z) of a world point.
    pub fn world_to_index(&self, point: DVec3) -> DVec3 {
        let origin = DVec3::new(
            self.origin.0 as f64,
            self.origin.1 as f64,
            self.origin.2 as f64,
        );
        let spacing = DVec3::new(
            self.spacing.0 as f64,
            self.spacing.1 as f64,
            self.spacing.2 as f64,
        );
        (point - origin) / spacing
    }

    /// Sample the grid at a world point, `None` outside the volume.
    pub fn sample(&self, point: DVec3, interpolation: Interpolation) -> Option<f32> {
        let index = self.world_to_index(point);
        let (z, y, x) = (index.z as f32, index.y as f32, index.x as f32);
        let data = self.data.view();
        match interpolation {
            Interpolation::Linear => Interpolator::trilinear_interpolate(&data, z, y, x),
            Interpolation::None => Interpolator::nearest(&data, z, y, x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Volume {
        let data = Array3::from_shape_fn((4, 5, 6), |(z, y, x)| (z * 100 + y * 10 + x) as u16);
        Volume::new(data, (1.0, 1.0, 2.0)).with_origin((-3.0, 0.0, 10.0))
    }

    #[test]
    fn samples_voxel_centres_exactly() {
        let volume = ramp();
        // voxel (x=2, y=1, z=3)
        let p = DVec3::new(-3.0 + 2.0, 1.0, 10.0 + 3.0 * 2.0);
        assert_eq!(volume.sample(p, Interpolation::Linear), Some(312.0));
        assert_eq!(volume.sample(p, Interpolation::None), Some(312.0));
    }

    #[test]
    fn interpolates_between_slices() {
        let volume = ramp();
        let p = DVec3::new(-3.0, 0.0, 11.0);
        assert_eq!(volume.sample(p, Interpolation::Linear), Some(50.0));
    }

    #[test]
    fn outside_points_have_no_sample() {
        let volume = ramp();
        assert_eq!(volume.sample(DVec3::new(-10.0, 0.0, 10.0), Interpolation::Linear), None);
    }

    #[test]
    fn isotropic_output_dimensions() {
        let volume = ramp();
        // z spacing is twice the in-plane spacing
        assert_eq!(volume.get_output_dimensions(Orientation::Axial), (6, 5));
        assert_eq!(volume.get_output_dimensions(Orientation::Coronal), (6, 8));
        assert_eq!(volume.get_output_dimensions(Orientation::Sagittal), (5, 8));
    }
}
