//! Synchronized navigation of the three MPR planes.
//!
//! A single [`CrosshairState`] is shared by the axial, coronal and sagittal
//! views. Dragging the crosshair in any view, or stepping with the mouse
//! wheel, moves that shared point; dragging the rotation handle in the axial
//! view obliques the coronal and sagittal planes about the axial normal.

use glam::{DMat3, DVec3};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    enums::{Handle, Orientation},
    geometry::{EPSILON, rotation_about_y, signed_angle_degrees},
    plane::{PlanePose, PlaneSet},
    volume_frame::VolumeFrame,
};

/// Rotation angles are measured in the axial plane, seen from the axial camera.
const AXIAL_REFERENCE_NORMAL: DVec3 = DVec3::Z;

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("unknown view id {0}")]
    InvalidViewId(i64),

    #[error("view reference {0:?} is not a view id")]
    InvalidViewName(String),

    #[error("{handle:?} handle is not available in the {orientation:?} view")]
    UnsupportedHandle {
        orientation: Orientation,
        handle: Handle,
    },

    #[error("rotation handle coincides with the crosshair")]
    DegenerateRotationInput,

    #[error("navigation input contains NaN or infinite coordinates")]
    NonFiniteInput,

    #[error("malformed interaction event: {0}")]
    MalformedEvent(#[from] serde_json::Error),
}

/// Which views follow navigation started elsewhere.
///
/// The axial plane is the reference plane and always follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub sync_coronal_to_others: bool,
    pub sync_sagittal_to_others: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sync_coronal_to_others: true,
            sync_sagittal_to_others: true,
        }
    }
}

impl SyncConfig {
    pub fn follows(&self, orientation: Orientation) -> bool {
        match orientation {
            Orientation::Axial => true,
            Orientation::Coronal => self.sync_coronal_to_others,
            Orientation::Sagittal => self.sync_sagittal_to_others,
        }
    }
}

/// The shared crosshair and rotation handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrosshairState {
    /// Intersection point of the three planes.
    pub position: DVec3,
    /// Sum of every applied rotation delta, in degrees.
    pub rotation_angle_degrees: f64,
    /// Marker dragged to derive the next rotation angle.
    pub rotation_handle_position: DVec3,
    /// Product of every rotation delta, composed in order.
    pub rotation: DMat3,
}

impl CrosshairState {
    pub fn new(position: DVec3, rotation_handle_position: DVec3) -> Self {
        Self {
            position,
            rotation_angle_degrees: 0.0,
            rotation_handle_position,
            rotation: DMat3::IDENTITY,
        }
    }

    /// Crosshair at the volume center, rotation handle halfway to the
    /// upper Y bound on the axial centerline.
    pub fn centered(frame: &VolumeFrame) -> Self {
        let center = frame.center();
        let handle = DVec3::new(
            center.x,
            (frame.bounds().y_max + center.y) / 2.0,
            center.z,
        );
        Self::new(center, handle)
    }
}

/// What a navigation call changed.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationUpdate {
    /// Views whose published plane was recomputed.
    pub affected: Vec<Orientation>,
    pub translation: DVec3,
    pub rotation_delta_degrees: f64,
}

impl NavigationUpdate {
    fn unchanged() -> Self {
        Self {
            affected: Vec::new(),
            translation: DVec3::ZERO,
            rotation_delta_degrees: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }

    pub fn affects(&self, orientation: Orientation) -> bool {
        self.affected.contains(&orientation)
    }
}

/// Owns the crosshair state of one session and republishes plane poses.
pub struct NavigationController {
    frame: VolumeFrame,
    state: CrosshairState,
    sync: SyncConfig,
    planes: PlaneSet,
}

impl NavigationController {
    pub fn new(frame: VolumeFrame, sync: SyncConfig) -> Self {
        Self::with_state(frame, CrosshairState::centered(&frame), sync)
    }

    pub fn with_state(frame: VolumeFrame, state: CrosshairState, sync: SyncConfig) -> Self {
        Self {
            frame,
            planes: PlaneSet::derive(&state),
            state,
            sync,
        }
    }

    pub fn frame(&self) -> &VolumeFrame {
        &self.frame
    }

    pub fn state(&self) -> &CrosshairState {
        &self.state
    }

    pub fn sync(&self) -> SyncConfig {
        self.sync
    }

    /// The poses last handed to the renderer.
    pub fn planes(&self) -> &PlaneSet {
        &self.planes
    }

    /// Move the crosshair to `new_position`.
    ///
    /// The rotation handle moves by the same delta. Positions are not
    /// clamped: the crosshair may leave the volume.
    pub fn translate_to(&mut self, new_position: DVec3) -> Result<NavigationUpdate, NavigationError> {
        if !new_position.is_finite() {
            return Err(NavigationError::NonFiniteInput);
        }
        Ok(self.apply_translation(new_position, None))
    }

    /// [`translate_to`](Self::translate_to) started by a drag inside
    /// `orientation`, which republishes that view even when it does not
    /// follow the others.
    pub fn translate_in(
        &mut self,
        orientation: Orientation,
        new_position: DVec3,
    ) -> Result<NavigationUpdate, NavigationError> {
        if !new_position.is_finite() {
            return Err(NavigationError::NonFiniteInput);
        }
        Ok(self.apply_translation(new_position, Some(orientation)))
    }

    /// Step the crosshair one slice along the camera axis of `orientation`.
    ///
    /// A negative `spin_sign` moves away from the camera, a positive one
    /// toward it; zero does nothing. The stepped view always republishes,
    /// and the shared position moves for every view.
    pub fn dolly(
        &mut self,
        orientation: Orientation,
        camera_position: DVec3,
        focal_point: DVec3,
        spin_sign: f64,
        slice_spacing: f64,
    ) -> Result<NavigationUpdate, NavigationError> {
        if !camera_position.is_finite()
            || !focal_point.is_finite()
            || !spin_sign.is_finite()
            || !slice_spacing.is_finite()
        {
            return Err(NavigationError::NonFiniteInput);
        }
        let axis = if spin_sign < 0.0 {
            focal_point - camera_position
        } else if spin_sign > 0.0 {
            camera_position - focal_point
        } else {
            return Ok(NavigationUpdate::unchanged());
        };
        if axis.length() < EPSILON {
            debug!("{orientation:?} camera sits on its focal point, ignoring wheel step");
            return Ok(NavigationUpdate::unchanged());
        }
        let new_position = self.state.position + slice_spacing * axis.normalize();
        trace!("dolly {orientation:?} spin {spin_sign} to {new_position}");
        Ok(self.apply_translation(new_position, Some(orientation)))
    }

    /// Rotate the coronal and sagittal planes by dragging the rotation
    /// handle to `new_handle_position`.
    ///
    /// The delta is the signed angle between the old and new handle as seen
    /// from the crosshair, negative for clockwise drags in the axial view.
    /// Deltas compound: each call multiplies the cumulative rotation.
    /// A handle on top of the crosshair has no direction and yields a zero
    /// delta with nothing changed.
    pub fn rotate_by(
        &mut self,
        new_handle_position: DVec3,
    ) -> Result<NavigationUpdate, NavigationError> {
        if !new_handle_position.is_finite() {
            return Err(NavigationError::NonFiniteInput);
        }
        let v1 = self.state.rotation_handle_position - self.state.position;
        let v2 = new_handle_position - self.state.position;
        let angle_delta = match signed_angle_degrees(v1, v2, AXIAL_REFERENCE_NORMAL) {
            Ok(angle) => angle,
            Err(NavigationError::DegenerateRotationInput) => {
                debug!("degenerate rotation input at {new_handle_position}, treating as 0 degrees");
                return Ok(NavigationUpdate::unchanged());
            }
            Err(err) => return Err(err),
        };

        // Planes turn opposite to the reported angle.
        self.state.rotation *= rotation_about_y(-angle_delta);
        self.state.rotation_angle_degrees += angle_delta;
        self.state.rotation_handle_position = new_handle_position;
        trace!(
            "rotate by {angle_delta:.3} deg, total {:.3}",
            self.state.rotation_angle_degrees
        );

        let affected = self.publish(&[Orientation::Coronal, Orientation::Sagittal], None);
        Ok(NavigationUpdate {
            affected,
            translation: DVec3::ZERO,
            rotation_delta_degrees: angle_delta,
        })
    }

    fn apply_translation(
        &mut self,
        new_position: DVec3,
        source: Option<Orientation>,
    ) -> NavigationUpdate {
        let translation = new_position - self.state.position;
        self.state.position = new_position;
        self.state.rotation_handle_position += translation;
        let affected = self.publish(&Orientation::ALL, source);
        NavigationUpdate {
            affected,
            translation,
            rotation_delta_degrees: 0.0,
        }
    }

    /// Recompute the poses of `candidates` that follow navigation, plus `source`.
    fn publish(
        &mut self,
        candidates: &[Orientation],
        source: Option<Orientation>,
    ) -> Vec<Orientation> {
        let affected: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|&o| self.sync.follows(o) || source == Some(o))
            .collect();
        for &orientation in &affected {
            self.planes
                .set(PlanePose::derive(orientation, &self.state));
        }
        affected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume_frame::Bounds;
    use approx::assert_abs_diff_eq;

    fn cube_frame() -> VolumeFrame {
        VolumeFrame::new(
            Bounds::from_array([-100.0, 100.0, -100.0, 100.0, -100.0, 100.0]),
            DVec3::ONE,
        )
        .unwrap()
    }

    fn controller() -> NavigationController {
        NavigationController::new(cube_frame(), SyncConfig::default())
    }

    #[test]
    fn starts_at_center_with_handle_on_centerline() {
        let controller = controller();
        assert_eq!(controller.state().position, DVec3::ZERO);
        assert_eq!(
            controller.state().rotation_handle_position,
            DVec3::new(0.0, 50.0, 0.0)
        );
        assert_eq!(controller.state().rotation, DMat3::IDENTITY);
    }

    #[test]
    fn translation_carries_rotation_handle() {
        let mut controller = controller();
        let update = controller.translate_to(DVec3::new(3.0, -4.0, 12.5)).unwrap();
        assert_eq!(update.translation, DVec3::new(3.0, -4.0, 12.5));
        assert_eq!(update.affected, Orientation::ALL.to_vec());
        assert_eq!(
            controller.state().rotation_handle_position,
            DVec3::new(3.0, 46.0, 12.5)
        );
    }

    #[test]
    fn translation_is_not_clamped() {
        let mut controller = controller();
        controller.translate_to(DVec3::new(500.0, 0.0, 0.0)).unwrap();
        assert_eq!(controller.planes().axial.origin().x, 500.0);
    }

    #[test]
    fn non_finite_input_is_rejected_without_mutation() {
        let mut controller = controller();
        let before = *controller.state();
        assert!(matches!(
            controller.translate_to(DVec3::new(f64::NAN, 0.0, 0.0)),
            Err(NavigationError::NonFiniteInput)
        ));
        assert!(controller.rotate_by(DVec3::splat(f64::INFINITY)).is_err());
        assert!(
            controller
                .dolly(Orientation::Axial, DVec3::Z, DVec3::ZERO, -1.0, f64::NAN)
                .is_err()
        );
        assert_eq!(*controller.state(), before);
    }

    #[test]
    fn quarter_turn_clockwise() {
        let mut controller = controller();
        let update = controller.rotate_by(DVec3::new(50.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(update.rotation_delta_degrees, -90.0, epsilon = 1e-9);
        assert_eq!(
            update.affected,
            vec![Orientation::Coronal, Orientation::Sagittal]
        );
        let r = controller.state().rotation;
        // row-major [[0,0,1],[0,1,0],[-1,0,0]]
        assert_abs_diff_eq!(r.z_axis.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.x_axis.z, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.x_axis.x, 0.0, epsilon = 1e-12);
        assert_eq!(
            controller.state().rotation_handle_position,
            DVec3::new(50.0, 0.0, 0.0)
        );
    }

    #[test]
    fn rotations_compound() {
        let mut controller = controller();
        let step = 50.0 * std::f64::consts::FRAC_1_SQRT_2;
        controller.rotate_by(DVec3::new(step, step, 0.0)).unwrap();
        controller.rotate_by(DVec3::new(50.0, 0.0, 0.0)).unwrap();
        assert_abs_diff_eq!(
            controller.state().rotation_angle_degrees,
            -90.0,
            epsilon = 1e-9
        );
        let expected = rotation_about_y(90.0);
        assert_abs_diff_eq!(
            controller.state().rotation.to_cols_array().as_slice(),
            expected.to_cols_array().as_slice(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn degenerate_rotation_changes_nothing() {
        let mut controller = controller();
        let before = *controller.state();
        let update = controller.rotate_by(before.position).unwrap();
        assert!(update.is_empty());
        assert_eq!(update.rotation_delta_degrees, 0.0);
        assert_eq!(*controller.state(), before);
    }

    #[test]
    fn rotation_ignores_height_above_axial_plane() {
        let mut controller = controller();
        let update = controller.rotate_by(DVec3::new(-50.0, 0.0, 30.0)).unwrap();
        assert_abs_diff_eq!(update.rotation_delta_degrees, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn dolly_steps_along_camera_axis() {
        let mut controller = controller();
        let camera = DVec3::new(0.0, 0.0, 350.0);
        controller
            .dolly(Orientation::Axial, camera, DVec3::ZERO, -1.0, 2.5)
            .unwrap();
        assert_eq!(controller.state().position, DVec3::new(0.0, 0.0, -2.5));
        controller
            .dolly(Orientation::Axial, camera, DVec3::ZERO, 3.0, 2.5)
            .unwrap();
        assert_eq!(controller.state().position, DVec3::ZERO);
    }

    #[test]
    fn dolly_without_spin_or_axis_is_a_no_op() {
        let mut controller = controller();
        let update = controller
            .dolly(Orientation::Coronal, DVec3::Y, DVec3::ZERO, 0.0, 1.0)
            .unwrap();
        assert!(update.is_empty());
        let update = controller
            .dolly(Orientation::Coronal, DVec3::ONE, DVec3::ONE, -1.0, 1.0)
            .unwrap();
        assert!(update.is_empty());
        assert_eq!(controller.state().position, DVec3::ZERO);
    }

    #[test]
    fn unsynced_view_keeps_its_pose() {
        let sync = SyncConfig {
            sync_coronal_to_others: false,
            sync_sagittal_to_others: true,
        };
        let mut controller = NavigationController::new(cube_frame(), sync);
        let coronal_before = controller.planes().coronal;

        let update = controller.translate_to(DVec3::new(0.0, 0.0, 20.0)).unwrap();
        assert!(!update.affects(Orientation::Coronal));
        assert_eq!(controller.planes().coronal, coronal_before);
        assert_eq!(controller.planes().sagittal.origin().z, 20.0);

        controller.rotate_by(DVec3::new(50.0, 0.0, 20.0)).unwrap();
        assert_eq!(controller.planes().coronal, coronal_before);

        // stepping inside the coronal view republishes it anyway
        let update = controller
            .dolly(Orientation::Coronal, DVec3::new(0.0, 350.0, 0.0), DVec3::ZERO, 1.0, 1.0)
            .unwrap();
        assert!(update.affects(Orientation::Coronal));
        assert_eq!(controller.planes().coronal.origin(), DVec3::new(0.0, 1.0, 20.0));
    }

    #[test]
    fn dragging_inside_an_unsynced_view_moves_its_plane() {
        let sync = SyncConfig {
            sync_coronal_to_others: true,
            sync_sagittal_to_others: false,
        };
        let mut controller = NavigationController::new(cube_frame(), sync);
        let target = DVec3::new(0.0, 20.0, 0.0);

        let update = controller.translate_in(Orientation::Coronal, target).unwrap();
        assert!(!update.affects(Orientation::Sagittal));
        assert_eq!(controller.planes().sagittal.origin(), DVec3::ZERO);

        let update = controller.translate_in(Orientation::Sagittal, target).unwrap();
        assert_eq!(update.affected, Orientation::ALL.to_vec());
        assert_eq!(controller.planes().sagittal.origin(), target);
    }
}
