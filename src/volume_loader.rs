use crate::{enums::SortBy, volume::Volume};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use log::{debug, info, warn};
use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use std::{fs, path::Path};
use thiserror::Error;
use web_time::Instant;

/// Largest disagreement between slices still considered the same spacing (mm).
const SPACING_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Missing spacing information")]
    MissingSpacing,

    #[error("Inconsistent spacing between slices")]
    InconsistentSpacing,

    #[error("Voxel spacing must be finite and positive")]
    InvalidSpacing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),
}

struct DecodedSlice {
    order: Option<f32>,
    position: Option<[f32; 3]>,
    image: Array2<u16>,
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a volume from DICOM objects
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - Slice of DICOM file objects
    /// * `sort_by` - Method to sort the slices
    ///
    /// # Errors
    ///
    /// Returns error if no valid images found, dimensions are inconsistent
    /// or the slices disagree on their spacing
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let started = Instant::now();
        let mut slices: Vec<_> = dicom_objects
            .par_iter()
            .filter_map(|dicom_object| Self::decode_slice(dicom_object, &sort_by))
            .collect();

        if slices.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }
        if slices.len() < dicom_objects.len() {
            warn!(
                "skipped {} object(s) without decodable pixel data",
                dicom_objects.len() - slices.len()
            );
        }

        Self::sort_slices(&mut slices, sort_by);
        Self::validate_dimensions(&slices)?;

        let origin = Self::get_origin(&slices);
        let volume_array = Self::build_volume_array(&slices);
        let spacing = Self::get_spacing(dicom_objects)?;

        info!(
            "loaded volume {:?} spacing {:?} in {:?}",
            volume_array.dim(),
            spacing,
            started.elapsed()
        );
        Ok(Volume::new(volume_array, spacing).with_origin(origin))
    }

    /// Load a volume from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let objects: Result<Vec<_>, _> =
            paths.iter().map(|path| open_file(path.as_ref())).collect();

        Self::load_from_dicom_objects(&objects?, sort_by)
    }

    /// Load a volume from a directory containing .dcm files
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"))
            })
            .collect();

        debug!("found {} .dcm file(s) in {}", paths.len(), path.as_ref().display());
        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages);
        }

        Self::load_from_file_paths(&paths, sort_by)
    }

    fn decode_slice(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: &SortBy,
    ) -> Option<DecodedSlice> {
        let order = Self::get_sort_order(dicom_object, sort_by)?;
        let image = Self::decode_image(dicom_object)?;
        Some(DecodedSlice {
            order,
            position: Self::get_position(dicom_object),
            image,
        })
    }

    fn get_position(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<[f32; 3]> {
        let pos = dicom_object
            .element(tags::IMAGE_POSITION_PATIENT)
            .ok()?
            .to_multi_float32()
            .ok()?;
        match pos.as_slice() {
            [x, y, z, ..] => Some([*x, *y, *z]),
            _ => None,
        }
    }

    fn get_sort_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: &SortBy,
    ) -> Option<Option<f32>> {
        match sort_by {
            SortBy::ImagePositionPatient => {
                let pos = dicom_object
                    .element(tags::IMAGE_POSITION_PATIENT)
                    .ok()?
                    .to_multi_float32()
                    .ok()?;
                Some(pos.get(2).copied())
            }
            SortBy::TablePosition => {
                let pos = dicom_object
                    .element(tags::TABLE_POSITION)
                    .ok()?
                    .to_float32()
                    .ok();
                Some(pos)
            }
            SortBy::InstanceNumber => {
                let num = dicom_object
                    .element(tags::INSTANCE_NUMBER)
                    .ok()?
                    .to_int::<i32>()
                    .ok()
                    .map(|n| n as f32);
                Some(num)
            }
            SortBy::None => Some(Some(0.0)),
        }
    }

    fn decode_image(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<u16>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::First);
        pixel_data
            .to_ndarray_with_options::<u16>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    /// Stack order is ascending, so index 0 sits at the origin's z.
    fn sort_slices(slices: &mut [DecodedSlice], sort_by: SortBy) {
        if !matches!(sort_by, SortBy::None) {
            slices.sort_by(|a, b| {
                a.order
                    .partial_cmp(&b.order)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    fn validate_dimensions(slices: &[DecodedSlice]) -> Result<(), VolumeLoaderError> {
        let first_dim = slices[0].image.dim();
        if slices.iter().any(|slice| slice.image.dim() != first_dim) {
            return Err(VolumeLoaderError::InconsistentDimensions);
        }
        Ok(())
    }

    fn build_volume_array(slices: &[DecodedSlice]) -> Array3<u16> {
        let (height, width) = slices[0].image.dim();
        let depth = slices.len();
        let mut volume = Array3::<u16>::zeros((depth, height, width));

        for (i, slice) in slices.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(&slice.image);
        }

        volume
    }

    /// Component-wise minimum of the slice positions, zero when none is known.
    fn get_origin(slices: &[DecodedSlice]) -> (f32, f32, f32) {
        slices
            .iter()
            .filter_map(|slice| slice.position)
            .reduce(|a, b| [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])])
            .map_or((0.0, 0.0, 0.0), |[x, y, z]| (x, y, z))
    }

    fn get_spacing(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
    ) -> Result<(f32, f32, f32), VolumeLoaderError> {
        let spacings: Vec<_> = dicom_objects
            .iter()
            .filter_map(|dicom_object| {
                let pixel_spacing = dicom_object
                    .element(tags::PIXEL_SPACING)
                    .ok()?
                    .to_multi_float32()
                    .ok()?;

                let slice_thickness = dicom_object
                    .element(tags::SLICE_THICKNESS)
                    .ok()?
                    .to_float32()
                    .ok()?;

                Some((*pixel_spacing.first()?, *pixel_spacing.get(1)?, slice_thickness))
            })
            .collect();

        Self::consistent_spacing(&spacings)
    }

    fn consistent_spacing(spacings: &[(f32, f32, f32)]) -> Result<(f32, f32, f32), VolumeLoaderError> {
        let first = *spacings.first().ok_or(VolumeLoaderError::MissingSpacing)?;
        let differs = |a: f32, b: f32| (a - b).abs() > SPACING_TOLERANCE;
        if spacings
            .iter()
            .any(|s| differs(s.0, first.0) || differs(s.1, first.1) || differs(s.2, first.2))
        {
            return Err(VolumeLoaderError::InconsistentSpacing);
        }
        if [first.0, first.1, first.2]
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(VolumeLoaderError::InvalidSpacing);
        }
        Ok(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        enums::Interpolation, navigation::CrosshairState, plane::PlaneSet, reslice::Reslicer,
    };
    use glam::DVec3;
    use ndarray::Array2;

    fn slice(order: f32, position: Option<[f32; 3]>, fill: u16) -> DecodedSlice {
        DecodedSlice {
            order: Some(order),
            position,
            image: Array2::from_elem((2, 3), fill),
        }
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let result = VolumeLoader::load_from_directory(
            "/definitely/not/a/dicom/series",
            SortBy::InstanceNumber,
        );
        assert!(matches!(result, Err(VolumeLoaderError::Io(_))));
    }

    #[test]
    fn directory_without_dcm_files_has_no_images() {
        let dir = std::env::temp_dir().join(format!("dicom-mpr-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("notes.txt"), b"not a slice").unwrap();

        let result = VolumeLoader::load_from_directory(&dir, SortBy::None);
        fs::remove_dir_all(&dir).unwrap();
        assert!(matches!(result, Err(VolumeLoaderError::NoValidImages)));
    }

    #[test]
    fn spacing_must_agree_between_slices() {
        assert_eq!(
            VolumeLoader::consistent_spacing(&[(0.5, 0.5, 1.0), (0.5, 0.5, 1.0005)]).unwrap(),
            (0.5, 0.5, 1.0)
        );
        assert!(matches!(
            VolumeLoader::consistent_spacing(&[(0.5, 0.5, 1.0), (0.7, 0.5, 1.0)]),
            Err(VolumeLoaderError::InconsistentSpacing)
        ));
        assert!(matches!(
            VolumeLoader::consistent_spacing(&[]),
            Err(VolumeLoaderError::MissingSpacing)
        ));
        assert!(matches!(
            VolumeLoader::consistent_spacing(&[(0.0, 0.5, 1.0)]),
            Err(VolumeLoaderError::InvalidSpacing)
        ));
    }

    #[test]
    fn slices_sort_ascending() {
        let mut slices = vec![slice(1.0, None, 1), slice(3.0, None, 3), slice(2.0, None, 2)];
        VolumeLoader::sort_slices(&mut slices, SortBy::ImagePositionPatient);
        let fills: Vec<_> = slices.iter().map(|s| s.image[[0, 0]]).collect();
        assert_eq!(fills, vec![1, 2, 3]);

        let mut slices = vec![slice(2.0, None, 2), slice(1.0, None, 1)];
        VolumeLoader::sort_slices(&mut slices, SortBy::InstanceNumber);
        let fills: Vec<_> = slices.iter().map(|s| s.image[[0, 0]]).collect();
        assert_eq!(fills, vec![1, 2]);
    }

    fn positioned(z: f32, fill: u16) -> DecodedSlice {
        DecodedSlice {
            order: Some(z),
            position: Some([0.0, 0.0, z]),
            image: Array2::from_elem((2, 2), fill),
        }
    }

    fn stacked(mut slices: Vec<DecodedSlice>) -> Volume {
        VolumeLoader::sort_slices(&mut slices, SortBy::ImagePositionPatient);
        let origin = VolumeLoader::get_origin(&slices);
        Volume::new(VolumeLoader::build_volume_array(&slices), (1.0, 1.0, 1.0)).with_origin(origin)
    }

    #[test]
    fn world_z_samples_the_slice_at_that_position() {
        let volume = stacked(vec![positioned(2.0, 300), positioned(0.0, 100), positioned(1.0, 200)]);
        assert_eq!(volume.origin, (0.0, 0.0, 0.0));
        for (z, expected) in [(0.0, 100.0), (1.0, 200.0), (2.0, 300.0)] {
            let at = DVec3::new(0.0, 0.0, z);
            assert_eq!(volume.sample(at, Interpolation::None), Some(expected));
            assert_eq!(volume.sample(at, Interpolation::Linear), Some(expected));
        }
    }

    #[test]
    fn axial_reslice_shows_the_slice_under_the_crosshair() {
        let volume = stacked(vec![
            positioned(-40.0, 60000),
            positioned(-42.0, 20000),
            positioned(-41.0, 40000),
        ]);
        assert_eq!(volume.origin.2, -42.0);

        let frame = volume.frame().unwrap();
        assert_eq!(frame.bounds().z_min, -42.0);
        let state =
            CrosshairState::new(DVec3::new(0.5, 0.5, -42.0), DVec3::new(0.5, 1.0, -42.0));
        let planes = PlaneSet::derive(&state);
        let image =
            Reslicer::reslice(&volume, &planes.axial, 2, 2, 1.0, Interpolation::None).unwrap();
        assert!(image.pixels().all(|p| p.0[0] == Volume::normalize_to_u8(20000.0)));
    }

    #[test]
    fn origin_is_lowest_corner() {
        let slices = vec![
            slice(0.0, Some([-10.0, -20.0, 5.0]), 0),
            slice(1.0, Some([-10.0, -20.0, 2.5]), 0),
            slice(2.0, None, 0),
        ];
        assert_eq!(VolumeLoader::get_origin(&slices), (-10.0, -20.0, 2.5));
        assert_eq!(VolumeLoader::get_origin(&slices[2..]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn stacks_slices_in_order() {
        let slices = vec![slice(0.0, None, 7), slice(1.0, None, 9)];
        VolumeLoader::validate_dimensions(&slices).unwrap();
        let volume = VolumeLoader::build_volume_array(&slices);
        assert_eq!(volume.dim(), (2, 2, 3));
        assert_eq!(volume[[1, 1, 2]], 9);
    }

    #[test]
    fn mismatched_slice_sizes_are_rejected() {
        let mut slices = vec![slice(0.0, None, 0), slice(1.0, None, 0)];
        slices[1].image = Array2::zeros((4, 4));
        assert!(matches!(
            VolumeLoader::validate_dimensions(&slices),
            Err(VolumeLoaderError::InconsistentDimensions)
        ));
    }
}
