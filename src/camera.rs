use glam::{DQuat, DVec3};

use crate::{enums::Orientation, volume_frame::VolumeFrame};

/// Camera looking at one MPR view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewCamera {
    pub position: DVec3,
    pub focal_point: DVec3,
    pub view_up: DVec3,
}

impl ViewCamera {
    /// Camera placed outside the volume along the view's axis, looking at
    /// the volume center. `distance_factor` scales the upper bound of that
    /// axis to get the camera distance.
    pub fn for_view(orientation: Orientation, frame: &VolumeFrame, distance_factor: f64) -> Self {
        let center = frame.center();
        let max = frame.bounds().max() * distance_factor;
        let (position, view_up) = match orientation {
            Orientation::Axial => (DVec3::new(center.x, center.y, max.z), DVec3::Y),
            Orientation::Coronal => (DVec3::new(center.x, max.y, center.z), DVec3::NEG_Z),
            Orientation::Sagittal => (DVec3::new(max.x, center.y, center.z), DVec3::NEG_Z),
        };
        Self {
            position,
            focal_point: center,
            view_up,
        }
    }

    /// Unit vector from the camera toward its focal point.
    pub fn direction_of_projection(&self) -> DVec3 {
        (self.focal_point - self.position).normalize_or_zero()
    }

    /// Orbit the camera about its view-up vector, centered on the focal point.
    pub fn azimuth(&mut self, degrees: f64) {
        let axis = self.view_up.normalize_or_zero();
        if axis == DVec3::ZERO {
            return;
        }
        let rotation = DQuat::from_axis_angle(axis, degrees.to_radians());
        self.position = self.focal_point + rotation * (self.position - self.focal_point);
    }
}
