//! Glue between transport events and the navigation model.
//!
//! The adapter owns one [`NavigationController`] together with the camera
//! and overlay of every view. Each inbound event is turned into a controller
//! call, and every view the call touched is handed to the injected
//! [`RenderSink`] for redraw.

use glam::DVec3;
use log::{debug, warn};
use serde::Deserialize;

use crate::{
    camera::ViewCamera,
    config::ViewerConfig,
    enums::{Handle, InteractionPhase, Orientation},
    navigation::{NavigationController, NavigationError, NavigationUpdate},
    overlay::ViewOverlay,
    plane::PlanePose,
};

/// What the renderer needs to draw one view.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub pose: PlanePose,
    pub overlay: ViewOverlay,
    pub camera: ViewCamera,
}

impl ViewState {
    pub fn orientation(&self) -> Orientation {
        self.pose.orientation
    }
}

/// The external renderer and transport, injected into the adapter.
pub trait RenderSink {
    /// Receive the new pose, overlay and camera of a view.
    fn push_view(&mut self, view: &ViewState);

    fn request_render(&mut self, orientation: Orientation);

    /// Drop any image already encoded for this view.
    fn invalidate_cache(&mut self, orientation: Orientation);

    fn interaction_started(&mut self) {}

    fn interaction_ended(&mut self) {}
}

/// View reference as sent by clients: a number or a numeric string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ViewRef {
    Id(i64),
    Name(String),
}

impl ViewRef {
    pub fn orientation(&self) -> Result<Orientation, NavigationError> {
        match self {
            ViewRef::Id(id) => Orientation::from_view_id(*id),
            ViewRef::Name(name) => name
                .trim()
                .parse::<i64>()
                .map_err(|_| NavigationError::InvalidViewName(name.clone()))
                .and_then(Orientation::from_view_id),
        }
    }
}

/// Mouse wheel notification, `{ "type": ..., "view": ..., "spinY": ... }`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WheelEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub view: ViewRef,
    #[serde(rename = "spinY", default)]
    pub spin_y: Option<f64>,
}

impl WheelEvent {
    pub fn phase(&self) -> InteractionPhase {
        InteractionPhase::from_event_type(&self.event_type)
    }
}

pub struct ViewSyncAdapter<S: RenderSink> {
    controller: NavigationController,
    views: [ViewState; 3],
    /// Cumulative rotation angle each view's overlay and camera reflect.
    applied_degrees: [f64; 3],
    sink: S,
}

impl<S: RenderSink> ViewSyncAdapter<S> {
    pub fn new(controller: NavigationController, config: &ViewerConfig, sink: S) -> Self {
        let frame = *controller.frame();
        let state = *controller.state();
        let views = Orientation::ALL.map(|orientation| ViewState {
            pose: *controller.planes().get(orientation),
            overlay: ViewOverlay::new(
                orientation,
                &frame,
                &state,
                config.crosshair_handle_radius,
                config.rotation_handle_radius,
            ),
            camera: ViewCamera::for_view(orientation, &frame, config.camera_distance_factor),
        });
        Self {
            applied_degrees: [state.rotation_angle_degrees; 3],
            controller,
            views,
            sink,
        }
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn view(&self, orientation: Orientation) -> &ViewState {
        &self.views[orientation.index()]
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Hand every view to the renderer once.
    pub fn initialize(&mut self) {
        for orientation in Orientation::ALL {
            self.publish(orientation);
        }
    }

    /// A handle widget was dragged to `new_center` in view `view_id`.
    ///
    /// The crosshair handle translates from any view; the rotation handle
    /// exists in the axial view only.
    pub fn on_handle_drag(
        &mut self,
        view_id: i64,
        handle: Handle,
        new_center: DVec3,
    ) -> Result<NavigationUpdate, NavigationError> {
        let orientation = Orientation::from_view_id(view_id).inspect_err(|err| {
            warn!("ignoring {handle:?} drag: {err}");
        })?;
        let update = match (handle, orientation) {
            (Handle::Crosshair, _) => self.controller.translate_in(orientation, new_center)?,
            (Handle::Rotation, Orientation::Axial) => self.controller.rotate_by(new_center)?,
            (Handle::Rotation, _) => {
                return Err(NavigationError::UnsupportedHandle {
                    orientation,
                    handle,
                });
            }
        };
        debug!("{handle:?} drag in {orientation:?} view: {update:?}");
        self.apply(&update, orientation);
        Ok(update)
    }

    /// Step the shared crosshair one slice along the wheel view's camera axis.
    pub fn on_wheel(&mut self, event: &WheelEvent) -> Result<NavigationUpdate, NavigationError> {
        let orientation = event.view.orientation().inspect_err(|err| {
            warn!("ignoring wheel event: {err}");
        })?;
        let camera = self.views[orientation.index()].camera;
        let normal = self.controller.planes().get(orientation).normal();
        let slice_spacing = self.controller.frame().spacing_along(normal);
        let update = self.controller.dolly(
            orientation,
            camera.position,
            camera.focal_point,
            event.spin_y.unwrap_or(0.0),
            slice_spacing,
        )?;

        let phase = event.phase();
        if phase == InteractionPhase::Start {
            self.sink.interaction_started();
        }
        self.apply(&update, orientation);
        if phase == InteractionPhase::End {
            self.sink.interaction_ended();
        }
        Ok(update)
    }

    pub fn on_wheel_json(&mut self, raw: &str) -> Result<NavigationUpdate, NavigationError> {
        let event: WheelEvent = serde_json::from_str(raw)?;
        self.on_wheel(&event)
    }

    fn apply(&mut self, update: &NavigationUpdate, source: Orientation) {
        if update.is_empty() {
            return;
        }
        let state = *self.controller.state();
        for orientation in Orientation::ALL {
            if !update.affects(orientation) && orientation != source {
                continue;
            }
            // a view that skipped rotations catches up on all of them at once
            let applied = &mut self.applied_degrees[orientation.index()];
            let delta = state.rotation_angle_degrees - *applied;
            *applied = state.rotation_angle_degrees;

            let view = &mut self.views[orientation.index()];
            view.pose = *self.controller.planes().get(orientation);
            view.overlay.follow(&state);
            if delta != 0.0 {
                view.overlay.rotate(delta);
                if orientation != Orientation::Axial {
                    view.camera.azimuth(-delta);
                }
            }
            self.publish(orientation);
        }
    }

    fn publish(&mut self, orientation: Orientation) {
        self.sink.push_view(&self.views[orientation.index()]);
        self.sink.request_render(orientation);
        self.sink.invalidate_cache(orientation);
    }
}
