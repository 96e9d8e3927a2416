use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use crate::{enums::Orientation, navigation::CrosshairState, volume_frame::VolumeFrame};

/// Colour of a crosshair line. Red lines mark the axial plane and turn with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineColor {
    Red,
    Green,
    Blue,
}

/// One centerline drawn over a view, positioned on the crosshair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLine {
    pub color: LineColor,
    /// Second endpoint relative to the actor origin; the first is its mirror.
    pub half_extent: DVec3,
    pub position: DVec3,
    /// In-plane rotation about the actor's Z axis.
    pub rotation_z_degrees: f64,
}

impl OverlayLine {
    fn new(color: LineColor, half_extent: DVec3, position: DVec3) -> Self {
        Self {
            color,
            half_extent,
            position,
            rotation_z_degrees: 0.0,
        }
    }

    /// World-space endpoints after rotation and translation.
    pub fn endpoints(&self) -> (DVec3, DVec3) {
        let rotation = DQuat::from_rotation_z(self.rotation_z_degrees.to_radians());
        let tip = rotation * self.half_extent;
        (self.position - tip, self.position + tip)
    }
}

/// A draggable sphere widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleWidget {
    pub center: DVec3,
    pub radius: f64,
}

/// Everything drawn on top of one view's slice.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewOverlay {
    pub orientation: Orientation,
    pub lines: [OverlayLine; 2],
    pub crosshair_handle: HandleWidget,
    /// Only the axial view carries a rotation handle.
    pub rotation_handle: Option<HandleWidget>,
}

impl ViewOverlay {
    pub fn new(
        orientation: Orientation,
        frame: &VolumeFrame,
        state: &CrosshairState,
        crosshair_radius: f64,
        rotation_radius: f64,
    ) -> Self {
        let max = frame.bounds().max();
        let at = state.position;
        let lines = match orientation {
            Orientation::Axial => [
                OverlayLine::new(LineColor::Green, DVec3::new(0.0, max.y, 0.0), at),
                OverlayLine::new(LineColor::Blue, DVec3::new(max.x, 0.0, 0.0), at),
            ],
            Orientation::Coronal => [
                OverlayLine::new(LineColor::Green, DVec3::new(0.0, 0.0, max.z), at),
                OverlayLine::new(LineColor::Red, DVec3::new(max.x, 0.0, 0.0), at),
            ],
            Orientation::Sagittal => [
                OverlayLine::new(LineColor::Blue, DVec3::new(0.0, 0.0, max.z), at),
                OverlayLine::new(LineColor::Red, DVec3::new(0.0, max.y, 0.0), at),
            ],
        };
        let rotation_handle = (orientation == Orientation::Axial).then_some(HandleWidget {
            center: state.rotation_handle_position,
            radius: rotation_radius,
        });
        Self {
            orientation,
            lines,
            crosshair_handle: HandleWidget {
                center: at,
                radius: crosshair_radius,
            },
            rotation_handle,
        }
    }

    /// Move lines and handles onto the current crosshair.
    pub fn follow(&mut self, state: &CrosshairState) {
        for line in &mut self.lines {
            line.position = state.position;
        }
        self.crosshair_handle.center = state.position;
        if let Some(handle) = &mut self.rotation_handle {
            handle.center = state.rotation_handle_position;
        }
    }

    /// Spin the lines that mark obliqued planes.
    ///
    /// In the axial view both lines turn; in the coronal and sagittal views
    /// only the red (axial) line does.
    pub fn rotate(&mut self, degrees: f64) {
        for line in &mut self.lines {
            if self.orientation == Orientation::Axial || line.color == LineColor::Red {
                line.rotation_z_degrees += degrees;
            }
        }
    }

    pub fn line(&self, color: LineColor) -> Option<&OverlayLine> {
        self.lines.iter().find(|line| line.color == color)
    }
}
