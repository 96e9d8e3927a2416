//! # DICOM-MPR library
//!
//! This crate serves the navigation model of a multi-planar reconstruction
//! (MPR) viewer: three cutting planes (axial, coronal, sagittal) through one
//! DICOM volume, kept in sync while a remote client drags their crosshair,
//! scrolls through slices or obliques the planes with a rotation handle.
//!
//! Volumes are read from a folder of ".dcm" files with the dicom-rs
//! ecosystem and described by an immutable [`VolumeFrame`]. A
//! [`NavigationController`] owns the shared crosshair and derives the three
//! [`PlanePose`] matrices from it. A [`ViewSyncAdapter`] turns transport
//! events (handle drags, mouse wheel notifications) into controller calls
//! and forwards the result to whatever renders the views through the
//! [`RenderSink`] trait. Rendering, picking and the transport itself live
//! outside this crate.
//!
//! The model makes a few assumptions:
//!   - One volume per session; the frame never changes once loaded
//!   - The axial plane is the reference plane: rotations oblique the coronal
//!     and sagittal planes about the axial normal
//!   - Views can be configured not to follow navigation started elsewhere
//!     (see [`SyncConfig`])
//!
//! # Examples
//!
//! ## Loading a series and stepping through it
//!
//! Read all DICOM files from the dicom/ directory, sorted by
//! InstanceNumber, then scroll the axial view one slice and cut the
//! coronal plane at the new crosshair.
//!
//! ```no_run
//! # use dicom_mpr::{
//! #     NavigationController, Orientation, Reslicer, SortBy, SyncConfig, VolumeFrame,
//! #     VolumeLoader,
//! # };
//! # use glam::DVec3;
//! let volume = VolumeLoader::load_from_directory("dicom", SortBy::InstanceNumber)
//!     .expect("should have loaded files from directory");
//! let frame = VolumeFrame::load(&volume).expect("should describe the volume");
//! let mut controller = NavigationController::new(frame, SyncConfig::default());
//! let camera = frame.center() + DVec3::new(0.0, 0.0, 3.5 * frame.bounds().z_max);
//! controller
//!     .dolly(Orientation::Axial, camera, frame.center(), -1.0, frame.spacing().z)
//!     .expect("finite input");
//! let image = Reslicer::reslice_isotropic(&volume, &controller.planes().coronal)
//!     .expect("should have cut the coronal plane");
//! image.save("coronal.png").expect("should have written the image");
//! ```

pub mod camera;
pub mod config;
pub mod enums;
pub mod geometry;
mod interpolator;
pub mod navigation;
pub mod overlay;
pub mod plane;
pub mod reslice;
pub mod session;
pub mod view_sync;
pub mod volume;
pub mod volume_frame;
pub mod volume_loader;

pub use camera::ViewCamera;
pub use config::{ConfigError, ViewerConfig};
pub use enums::{Handle, InteractionPhase, Interpolation, Orientation, SortBy};
pub use navigation::{
    CrosshairState, NavigationController, NavigationError, NavigationUpdate, SyncConfig,
};
pub use overlay::{HandleWidget, LineColor, OverlayLine, ViewOverlay};
pub use plane::{PlanePose, PlaneSet};
pub use reslice::Reslicer;
pub use session::{SessionError, SessionHandle};
pub use view_sync::{RenderSink, ViewRef, ViewState, ViewSyncAdapter, WheelEvent};
pub use volume::Volume;
pub use volume_frame::{Bounds, VolumeFrame};
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
