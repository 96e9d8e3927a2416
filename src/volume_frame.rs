use glam::DVec3;

use crate::{volume::Volume, volume_loader::VolumeLoaderError};

/// Axis-aligned extent of the loaded grid in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Bounds {
    pub fn from_array([x_min, x_max, y_min, y_max, z_min, z_max]: [f64; 6]) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
            z_min,
            z_max,
        }
    }

    pub fn center(&self) -> DVec3 {
        DVec3::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
            (self.z_min + self.z_max) / 2.0,
        )
    }

    pub fn max(&self) -> DVec3 {
        DVec3::new(self.x_max, self.y_max, self.z_max)
    }
}

/// Immutable description of the loaded volume: bounds, center and voxel
/// spacing. Built once per session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeFrame {
    bounds: Bounds,
    center: DVec3,
    spacing: DVec3,
}

impl VolumeFrame {
    pub fn new(bounds: Bounds, spacing: DVec3) -> Result<Self, VolumeLoaderError> {
        if !spacing.is_finite() || spacing.min_element() <= 0.0 {
            return Err(VolumeLoaderError::InvalidSpacing);
        }
        Ok(Self {
            bounds,
            center: bounds.center(),
            spacing,
        })
    }

    /// Describe a decoded volume.
    ///
    /// Bounds follow structured-points semantics: the first voxel sits on the
    /// origin and the last one `(n - 1) * spacing` further along each axis.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeLoaderError::NoValidImages`] for an empty grid and
    /// [`VolumeLoaderError::InvalidSpacing`] for non-positive spacing.
    pub fn load(volume: &Volume) -> Result<Self, VolumeLoaderError> {
        let (depth, height, width) = volume.dim();
        if depth == 0 || height == 0 || width == 0 {
            return Err(VolumeLoaderError::NoValidImages);
        }
        let spacing = DVec3::new(
            volume.spacing.0 as f64,
            volume.spacing.1 as f64,
            volume.spacing.2 as f64,
        );
        let origin = DVec3::new(
            volume.origin.0 as f64,
            volume.origin.1 as f64,
            volume.origin.2 as f64,
        );
        let extent = DVec3::new(
            (width - 1) as f64,
            (height - 1) as f64,
            (depth - 1) as f64,
        ) * spacing;
        let max = origin + extent;
        Self::new(
            Bounds::from_array([origin.x, max.x, origin.y, max.y, origin.z, max.z]),
            spacing,
        )
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn spacing(&self) -> DVec3 {
        self.spacing
    }

    /// Voxel spacing measured along an arbitrary direction.
    ///
    /// Axis-aligned directions give the spacing of that axis; oblique ones
    /// blend the three. The blend approximates the automatic output spacing
    /// of an oblique reslice, so oblique wheel steps may differ slightly
    /// from it.
    pub fn spacing_along(&self, direction: DVec3) -> f64 {
        let d = direction.normalize_or_zero();
        if d == DVec3::ZERO {
            return self.spacing.min_element();
        }
        (d * self.spacing).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn frame_from_volume() {
        let volume = Volume::new(Array3::zeros((11, 21, 31)), (0.5, 1.0, 2.0))
            .with_origin((-7.5, 0.0, 100.0));
        let frame = VolumeFrame::load(&volume).unwrap();
        let b = frame.bounds();
        assert_eq!((b.x_min, b.x_max), (-7.5, 7.5));
        assert_eq!((b.y_min, b.y_max), (0.0, 20.0));
        assert_eq!((b.z_min, b.z_max), (100.0, 120.0));
        assert_eq!(frame.center(), DVec3::new(0.0, 10.0, 110.0));
    }

    #[test]
    fn empty_volume_is_rejected() {
        let volume = Volume::new(Array3::zeros((0, 4, 4)), (1.0, 1.0, 1.0));
        assert!(matches!(
            VolumeFrame::load(&volume),
            Err(VolumeLoaderError::NoValidImages)
        ));
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        let bounds = Bounds::from_array([-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
        assert!(VolumeFrame::new(bounds, DVec3::new(1.0, 0.0, 1.0)).is_err());
        assert!(VolumeFrame::new(bounds, DVec3::new(1.0, f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn spacing_along_axes_and_diagonals() {
        let bounds = Bounds::from_array([-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
        let frame = VolumeFrame::new(bounds, DVec3::new(0.5, 0.75, 2.0)).unwrap();
        assert_eq!(frame.spacing_along(DVec3::NEG_Z), 2.0);
        assert_eq!(frame.spacing_along(DVec3::Y), 0.75);
        assert_eq!(frame.spacing_along(DVec3::new(-3.0, 0.0, 0.0)), 0.5);
        let diagonal = frame.spacing_along(DVec3::new(1.0, 0.0, 1.0));
        assert!(diagonal > 0.5 && diagonal < 2.0);
    }
}
