use serde::{Deserialize, Serialize};

use crate::navigation::NavigationError;

/// The three MPR viewing orientations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Axial,
        Orientation::Coronal,
        Orientation::Sagittal,
    ];

    /// Map a transport view id (1 = axial, 2 = coronal, 3 = sagittal).
    pub fn from_view_id(view_id: i64) -> Result<Self, NavigationError> {
        match view_id {
            1 => Ok(Orientation::Axial),
            2 => Ok(Orientation::Coronal),
            3 => Ok(Orientation::Sagittal),
            other => Err(NavigationError::InvalidViewId(other)),
        }
    }

    pub fn view_id(self) -> i64 {
        match self {
            Orientation::Axial => 1,
            Orientation::Coronal => 2,
            Orientation::Sagittal => 3,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Axial => "axial",
            Orientation::Coronal => "coronal",
            Orientation::Sagittal => "sagittal",
        }
    }
}

/// Which widget a drag event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    /// The crosshair center, present in every view.
    Crosshair,
    /// The rotation marker on the axial centerline.
    Rotation,
}

/// Phase of a wheel interaction as reported by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionPhase {
    Start,
    Move,
    End,
}

impl InteractionPhase {
    // Transports send "StartMouseWheel", "MouseWheel", "EndMouseWheel" or the bare phase.
    pub fn from_event_type(event_type: &str) -> Self {
        if event_type.contains("Start") {
            InteractionPhase::Start
        } else if event_type.contains("End") {
            InteractionPhase::End
        } else {
            InteractionPhase::Move
        }
    }
}

/// Sampling used when reslicing an oblique plane.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    None,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_ids_round_trip_and_reject_unknown() {
        for orientation in Orientation::ALL {
            assert_eq!(
                Orientation::from_view_id(orientation.view_id()).unwrap(),
                orientation
            );
        }
        assert!(matches!(
            Orientation::from_view_id(4),
            Err(NavigationError::InvalidViewId(4))
        ));
        assert!(Orientation::from_view_id(0).is_err());
    }

    #[test]
    fn phase_is_read_by_substring() {
        assert_eq!(
            InteractionPhase::from_event_type("StartMouseWheel"),
            InteractionPhase::Start
        );
        assert_eq!(
            InteractionPhase::from_event_type("EndMouseWheel"),
            InteractionPhase::End
        );
        assert_eq!(
            InteractionPhase::from_event_type("MouseWheel"),
            InteractionPhase::Move
        );
    }
}
