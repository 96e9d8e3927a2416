use glam::{DMat3, DMat4, DVec3};

use crate::{
    enums::Orientation,
    geometry::{base_rotation, rigid_transform, to_row_major},
    navigation::CrosshairState,
};

/// Reslice axes of one view: a rigid 4x4 transform whose columns are the
/// in-plane x axis, the in-plane y axis, the plane normal and the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanePose {
    pub orientation: Orientation,
    pub matrix: DMat4,
}

impl PlanePose {
    /// Derive the pose of `orientation` from the crosshair state.
    ///
    /// The axial plane keeps its base orientation: its in-plane rotation is
    /// applied to overlays only. Coronal and sagittal compose the cumulative
    /// rotation after their base orientation.
    pub fn derive(orientation: Orientation, state: &CrosshairState) -> Self {
        let rotation = match orientation {
            Orientation::Axial => base_rotation(orientation),
            Orientation::Coronal | Orientation::Sagittal => {
                base_rotation(orientation) * state.rotation
            }
        };
        Self {
            orientation,
            matrix: rigid_transform(rotation, state.position),
        }
    }

    pub fn origin(&self) -> DVec3 {
        self.matrix.w_axis.truncate()
    }

    pub fn rotation(&self) -> DMat3 {
        DMat3::from_mat4(self.matrix)
    }

    pub fn axis_x(&self) -> DVec3 {
        self.matrix.x_axis.truncate()
    }

    pub fn axis_y(&self) -> DVec3 {
        self.matrix.y_axis.truncate()
    }

    pub fn normal(&self) -> DVec3 {
        self.matrix.z_axis.truncate()
    }

    /// Map in-plane coordinates onto the world.
    pub fn point_at(&self, u: f64, v: f64) -> DVec3 {
        self.matrix.transform_point3(DVec3::new(u, v, 0.0))
    }

    pub fn to_row_major(&self) -> [[f64; 4]; 4] {
        to_row_major(&self.matrix)
    }
}

/// The three poses handed to the renderer after each navigation event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneSet {
    pub axial: PlanePose,
    pub coronal: PlanePose,
    pub sagittal: PlanePose,
}

impl PlaneSet {
    pub fn derive(state: &CrosshairState) -> Self {
        Self {
            axial: PlanePose::derive(Orientation::Axial, state),
            coronal: PlanePose::derive(Orientation::Coronal, state),
            sagittal: PlanePose::derive(Orientation::Sagittal, state),
        }
    }

    pub fn get(&self, orientation: Orientation) -> &PlanePose {
        match orientation {
            Orientation::Axial => &self.axial,
            Orientation::Coronal => &self.coronal,
            Orientation::Sagittal => &self.sagittal,
        }
    }

    pub(crate) fn set(&mut self, pose: PlanePose) {
        match pose.orientation {
            Orientation::Axial => self.axial = pose,
            Orientation::Coronal => self.coronal = pose,
            Orientation::Sagittal => self.sagittal = pose,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanePose> {
        [&self.axial, &self.coronal, &self.sagittal].into_iter()
    }
}
