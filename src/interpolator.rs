use ndarray::{ArrayView2, ArrayView3, Axis};

pub(crate) struct Interpolator;

// Points this close outside the grid are snapped onto its boundary.
const EDGE_TOLERANCE: f32 = 1e-4;

impl Interpolator {
    pub(crate) fn get_isotropic_dimensions(
        spacing: (f32, f32, f32),
        original_dim: (usize, usize, usize),
    ) -> (u32, u32, u32) {
        let (x_spacing, y_spacing, z_spacing) = spacing;
        let min_spacing = x_spacing.min(y_spacing).min(z_spacing);
        let inv_min_spacing = 1.0 / min_spacing; // Multiply instead of divide

        // original_dim is (depth, height, width) corresponding to (z, y, x)
        let new_x = (original_dim.2 as f32 * x_spacing * inv_min_spacing) as u32;
        let new_y = (original_dim.1 as f32 * y_spacing * inv_min_spacing) as u32;
        let new_z = (original_dim.0 as f32 * z_spacing * inv_min_spacing) as u32;

        (new_z, new_y, new_x)
    }

    /// Clamp a continuous index onto `[0, len - 1]`, `None` if it lies outside.
    #[inline]
    fn in_range(coord: f32, len: usize) -> Option<f32> {
        if len == 0 || !coord.is_finite() {
            return None;
        }
        let max = (len - 1) as f32;
        if coord < -EDGE_TOLERANCE || coord > max + EDGE_TOLERANCE {
            return None;
        }
        Some(coord.clamp(0.0, max))
    }

    #[inline]
    pub(crate) fn bilinear_interpolate(slice: &ArrayView2<u16>, y: f32, x: f32) -> f32 {
        let (height, width) = slice.dim();

        let y0 = y.floor() as usize;
        let x0 = x.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let x1 = (x0 + 1).min(width - 1);

        let dy = y - y0 as f32;
        let dx = x - x0 as f32;
        let one_minus_dx = 1.0 - dx;
        let one_minus_dy = 1.0 - dy;

        let v00 = slice[[y0, x0]] as f32;
        let v01 = slice[[y0, x1]] as f32;
        let v10 = slice[[y1, x0]] as f32;
        let v11 = slice[[y1, x1]] as f32;

        let v0 = v00.mul_add(one_minus_dx, v01 * dx);
        let v1 = v10.mul_add(one_minus_dx, v11 * dx);

        v0.mul_add(one_minus_dy, v1 * dy)
    }

    /// Trilinear sample at continuous index (z, y, x): two bilinear lookups
    /// on the neighbouring slices blended along z.
    pub(crate) fn trilinear_interpolate(
        volume: &ArrayView3<u16>,
        z: f32,
        y: f32,
        x: f32,
    ) -> Option<f32> {
        let (depth, height, width) = volume.dim();
        let z = Self::in_range(z, depth)?;
        let y = Self::in_range(y, height)?;
        let x = Self::in_range(x, width)?;

        let z0 = z.floor() as usize;
        let z1 = (z0 + 1).min(depth - 1);
        let dz = z - z0 as f32;

        let lower = Self::bilinear_interpolate(&volume.index_axis(Axis(0), z0), y, x);
        if dz == 0.0 {
            return Some(lower);
        }
        let upper = Self::bilinear_interpolate(&volume.index_axis(Axis(0), z1), y, x);
        Some(lower.mul_add(1.0 - dz, upper * dz))
    }

    pub(crate) fn nearest(volume: &ArrayView3<u16>, z: f32, y: f32, x: f32) -> Option<f32> {
        let (depth, height, width) = volume.dim();
        let z = Self::in_range(z, depth)?.round() as usize;
        let y = Self::in_range(y, height)?.round() as usize;
        let x = Self::in_range(x, width)?.round() as usize;
        Some(volume[[z, y, x]] as f32)
    }
}
