//! Half-precision depth textures.
//!
//! LiDAR depth frames arrive as a row-major grid of IEEE-754 binary16 values
//! (1 sign bit, 5 exponent bits with bias 15, 10 fraction bits), in meters
//! along the optical axis.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{MeasureError, PinholeIntrinsics, Pt2, Pt3, Real};

/// Decode an IEEE-754 binary16 bit pattern.
///
/// Zero, subnormals, infinities and NaN follow the standard.
pub fn f16_to_real(bits: u16) -> Real {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = ((bits >> 10) & 0x1f) as i32;
    let fraction = (bits & 0x03ff) as Real;

    match exponent {
        0 => sign * fraction * (2.0 as Real).powi(-24),
        0x1f if fraction == 0.0 => sign * Real::INFINITY,
        0x1f => Real::NAN,
        _ => sign * (1.0 + fraction / 1024.0) * (2.0 as Real).powi(exponent - 15),
    }
}

/// Encode a value as IEEE-754 binary16, rounding to nearest even.
///
/// Values beyond the half range saturate to infinity; values below the
/// smallest subnormal flush to a signed zero.
pub fn real_to_f16(value: Real) -> u16 {
    let x = (value as f32).to_bits();
    let sign = ((x >> 16) & 0x8000) as u16;
    let exp = ((x >> 23) & 0xff) as i32;
    let man = x & 0x007f_ffff;

    if exp == 0xff {
        let nan_bit = if man != 0 { 0x0200 } else { 0 };
        return sign | 0x7c00 | nan_bit | (man >> 13) as u16;
    }

    let half_exp = exp - 127 + 15;
    if half_exp >= 0x1f {
        return sign | 0x7c00;
    }

    if half_exp <= 0 {
        if 14 - half_exp > 24 {
            return sign;
        }
        let man = man | 0x0080_0000;
        let shift = (14 - half_exp) as u32;
        let mut half_man = man >> shift;
        let round_bit = 1u32 << (shift - 1);
        if man & round_bit != 0 && man & (3 * round_bit - 1) != 0 {
            half_man += 1;
        }
        return sign | half_man as u16;
    }

    let bits = ((half_exp as u32) << 10) | (man >> 13);
    let round_bit = 0x0000_1000;
    if man & round_bit != 0 && man & (3 * round_bit - 1) != 0 {
        // A carry out of the fraction correctly bumps the exponent.
        sign | (bits + 1) as u16
    } else {
        sign | bits as u16
    }
}

/// Dimensions, in points, of the view that reports taps.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewSize {
    pub width: Real,
    pub height: Real,
}

impl ViewSize {
    pub fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }
}

/// One decoded depth lookup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthSample {
    pub u: usize,
    pub v: usize,
    /// Depth along the optical axis, in meters.
    pub depth: Real,
}

impl DepthSample {
    /// Camera-space point for this sample.
    pub fn backproject(&self, intrinsics: &PinholeIntrinsics) -> Result<Pt3, MeasureError> {
        intrinsics.backproject(self.u as Real, self.v as Real, self.depth)
    }
}

/// A row-major grid of binary16 depth values.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    width: usize,
    height: usize,
    data: Vec<u16>,
}

impl DepthMap {
    /// Wrap raw binary16 bit patterns; `data.len()` must be `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        let len = Self::sample_count(width, height)?;
        ensure!(
            data.len() == len,
            "depth map has {} samples, expected {}x{} = {}",
            data.len(),
            width,
            height,
            len
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    fn sample_count(width: usize, height: usize) -> Result<usize> {
        ensure!(width > 0 && height > 0, "depth map must be non-empty");
        width
            .checked_mul(height)
            .with_context(|| format!("depth map of {width}x{height} samples is too large"))
    }

    /// Build a depth map from depths in meters, encoding each to binary16.
    pub fn from_meters(width: usize, height: usize, depths: &[Real]) -> Result<Self> {
        Self::new(
            width,
            height,
            depths.iter().copied().map(real_to_f16).collect(),
        )
    }

    /// Build a depth map by evaluating `f(u, v)` at every pixel.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> Real) -> Result<Self> {
        let mut data = Vec::with_capacity(Self::sample_count(width, height)?);
        for v in 0..height {
            for u in 0..width {
                data.push(real_to_f16(f(u, v)));
            }
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn out_of_bounds(&self, u: Real, v: Real) -> MeasureError {
        MeasureError::OutOfBounds {
            u,
            v,
            width: self.width,
            height: self.height,
        }
    }

    /// Read and decode the depth at pixel `(u, v)`.
    ///
    /// Fails with [`MeasureError::OutOfBounds`] outside the texture and with
    /// [`MeasureError::InvalidDepth`] when the decoded value is not a
    /// positive finite number.
    pub fn sample(&self, u: usize, v: usize) -> Result<DepthSample, MeasureError> {
        if u >= self.width || v >= self.height {
            return Err(self.out_of_bounds(u as Real, v as Real));
        }
        let depth = f16_to_real(self.data[v * self.width + u]);
        if !(depth.is_finite() && depth > 0.0) {
            return Err(MeasureError::InvalidDepth(depth));
        }
        Ok(DepthSample { u, v, depth })
    }

    /// Overwrite the depth at pixel `(u, v)`.
    pub fn set(&mut self, u: usize, v: usize, depth: Real) -> Result<(), MeasureError> {
        if u >= self.width || v >= self.height {
            return Err(self.out_of_bounds(u as Real, v as Real));
        }
        self.data[v * self.width + u] = real_to_f16(depth);
        Ok(())
    }

    /// Map a tap in view coordinates to texture pixel indices.
    ///
    /// Coordinates are scaled by `texture / view` and truncated, not rounded.
    pub fn view_to_pixel(&self, tap: &Pt2, view: &ViewSize) -> Result<(usize, usize), MeasureError> {
        let u = tap.x / view.width * self.width as Real;
        let v = tap.y / view.height * self.height as Real;
        // Truncation is toward zero, so (-0.5, 0) lands on pixel 0 while
        // (-1, 0) and NaN stay out of bounds.
        let (ut, vt) = (u.trunc(), v.trunc());
        if !(ut >= 0.0 && vt >= 0.0 && ut < self.width as Real && vt < self.height as Real) {
            return Err(self.out_of_bounds(u, v));
        }
        Ok((ut as usize, vt as usize))
    }

    /// Texture pixel containing a continuous pixel coordinate, if any.
    pub fn pixel_at(&self, u: Real, v: Real) -> Result<(usize, usize), MeasureError> {
        let (ut, vt) = (u.floor(), v.floor());
        if !(ut >= 0.0 && vt >= 0.0 && ut < self.width as Real && vt < self.height as Real) {
            return Err(self.out_of_bounds(u, v));
        }
        Ok((ut as usize, vt as usize))
    }
}
