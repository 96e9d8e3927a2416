use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
};

use dicom_mpr::{
    Handle, NavigationController, Orientation, Reslicer, RenderSink, ViewRef, ViewState,
    ViewSyncAdapter, ViewerConfig, Volume, VolumeLoader, WheelEvent, session,
};
use log::{error, info};

/// Writes every redrawn view as a PNG cut through its current pose.
struct SnapshotSink {
    volume: Arc<Volume>,
    snapshot_dir: Option<PathBuf>,
    latest: Vec<ViewState>,
}

impl SnapshotSink {
    fn save(&self, view: &ViewState, dir: &Path) {
        let Some(image) = Reslicer::reslice_isotropic(&self.volume, &view.pose) else {
            error!("could not reslice the {} view", view.orientation().name());
            return;
        };
        let path = dir.join(format!("{}.png", view.orientation().name()));
        if let Err(err) = image.save(&path) {
            error!("could not write {}: {err}", path.display());
        }
    }
}

impl RenderSink for SnapshotSink {
    fn push_view(&mut self, view: &ViewState) {
        info!(
            "{} pose {:?}",
            view.orientation().name(),
            view.pose.to_row_major()
        );
        self.latest.retain(|v| v.orientation() != view.orientation());
        self.latest.push(view.clone());
    }

    fn request_render(&mut self, orientation: Orientation) {
        let Some(dir) = &self.snapshot_dir else {
            return;
        };
        if let Some(view) = self.latest.iter().find(|v| v.orientation() == orientation) {
            self.save(view, dir);
        }
    }

    fn invalidate_cache(&mut self, _orientation: Orientation) {}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let dicom_dir = args.next();
    let mut config = match args.next() {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(dir) = dicom_dir {
        config.dicom_dir = PathBuf::from(dir);
    }

    let volume = Arc::new(VolumeLoader::load_from_directory(
        &config.dicom_dir,
        config.sort_by,
    )?);
    let frame = volume.frame()?;
    info!("volume bounds {:?}, center {}", frame.bounds(), frame.center());

    let sink = SnapshotSink {
        volume: Arc::clone(&volume),
        snapshot_dir: config.snapshot_dir.clone(),
        latest: Vec::new(),
    };
    let controller = NavigationController::new(frame, config.sync);
    let (handle, task) = session::spawn(ViewSyncAdapter::new(controller, &config, sink));

    // Scroll the axial view one slice, then oblique the planes by a quarter turn.
    handle
        .wheel(WheelEvent {
            event_type: "MouseWheel".to_string(),
            view: ViewRef::Id(Orientation::Axial.view_id()),
            spin_y: Some(-1.0),
        })
        .await?;
    let state = handle.state().await?;
    let quarter_turn = state.position
        + glam::DVec3::new(
            state.rotation_handle_position.y - state.position.y,
            0.0,
            0.0,
        );
    let update = handle
        .drag(Orientation::Axial.view_id(), Handle::Rotation, quarter_turn)
        .await?;
    info!("rotated by {:.1} degrees", update.rotation_delta_degrees);

    drop(handle);
    let adapter = task.await?;
    info!(
        "crosshair finished at {}",
        adapter.controller().state().position
    );
    Ok(())
}
