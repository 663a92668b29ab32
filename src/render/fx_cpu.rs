use crate::{
    foundation::core::Size,
    foundation::error::{PixstackError, PixstackResult},
    render::fx::{ColorMatrix, MAX_BLUR_RADIUS_PX},
};

const Q16_ONE: u32 = 1 << 16;

/// Symmetric gaussian taps in Q16 fixed point. The taps always sum to `1 << 16` so flat
/// regions come out unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct GaussianKernel {
    taps: Vec<u32>,
}

impl GaussianKernel {
    pub(crate) fn new(radius_px: u32, sigma: f32) -> PixstackResult<Self> {
        if radius_px > MAX_BLUR_RADIUS_PX {
            return Err(PixstackError::backend(format!(
                "blur radius {radius_px} exceeds {MAX_BLUR_RADIUS_PX}"
            )));
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(PixstackError::validation("blur sigma must be > 0"));
        }

        let r = i64::from(radius_px);
        let two_sigma_sq = 2.0 * f64::from(sigma).powi(2);
        let raw: Vec<f64> = (-r..=r)
            .map(|i| (-((i * i) as f64) / two_sigma_sq).exp())
            .collect();
        let total: f64 = raw.iter().sum();

        let mut taps: Vec<u32> = raw
            .iter()
            .map(|w| (w / total * f64::from(Q16_ONE)).round() as u32)
            .collect();
        let assigned: i64 = taps.iter().map(|&t| i64::from(t)).sum();
        let center = &mut taps[radius_px as usize];
        *center = (i64::from(*center) + i64::from(Q16_ONE) - assigned).max(0) as u32;
        Ok(Self { taps })
    }

    pub(crate) fn radius(&self) -> usize {
        self.taps.len() / 2
    }

    pub(crate) fn taps(&self) -> &[u32] {
        &self.taps
    }
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Blur a premultiplied RGBA8 surface of `size` in place. Samples past the border repeat
/// the edge pixel.
pub(crate) fn blur_premul(
    pixels: &mut [u8],
    size: Size,
    radius_px: u32,
    sigma: f32,
) -> PixstackResult<()> {
    check_len(pixels, size)?;
    if radius_px == 0 {
        return Ok(());
    }
    let kernel = GaussianKernel::new(radius_px, sigma)?;
    let mut scratch = vec![0u8; pixels.len()];
    convolve(pixels, &mut scratch, size, &kernel, Axis::Horizontal);
    convolve(&scratch, pixels, size, &kernel, Axis::Vertical);
    Ok(())
}

fn convolve(src: &[u8], dst: &mut [u8], size: Size, kernel: &GaussianKernel, axis: Axis) {
    let (w, h) = (size.width as usize, size.height as usize);
    // (line count, samples per line, stride between samples, stride between lines)
    let (lines, len, step, line_step) = match axis {
        Axis::Horizontal => (h, w, 1, w),
        Axis::Vertical => (w, h, w, 1),
    };
    let r = kernel.radius();

    for line in 0..lines {
        let base = line * line_step;
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (k, &tap) in kernel.taps().iter().enumerate() {
                let j = (i + k).saturating_sub(r).min(len - 1);
                let p = (base + j * step) * 4;
                for (a, &c) in acc.iter_mut().zip(&src[p..p + 4]) {
                    *a += u64::from(tap) * u64::from(c);
                }
            }
            let o = (base + i * step) * 4;
            for (d, a) in dst[o..o + 4].iter_mut().zip(acc) {
                *d = ((a + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

/// Applies `m` to every pixel of a premultiplied surface, unpremultiplying around the matrix.
pub(crate) fn color_matrix_premul(
    pixels: &mut [u8],
    size: Size,
    m: &ColorMatrix,
) -> PixstackResult<()> {
    check_len(pixels, size)?;
    if m.is_identity() {
        return Ok(());
    }
    for px in pixels.chunks_exact_mut(4) {
        let a = f32::from(px[3]) / 255.0;
        let straight = if a > 0.0 {
            [
                (f32::from(px[0]) / 255.0 / a).min(1.0),
                (f32::from(px[1]) / 255.0 / a).min(1.0),
                (f32::from(px[2]) / 255.0 / a).min(1.0),
                a,
            ]
        } else {
            [0.0; 4]
        };
        let [r, g, b, a] = m.apply(straight);
        px[0] = unit_to_u8(r * a);
        px[1] = unit_to_u8(g * a);
        px[2] = unit_to_u8(b * a);
        px[3] = unit_to_u8(a);
    }
    Ok(())
}

fn check_len(pixels: &[u8], size: Size) -> PixstackResult<()> {
    let expected = size.pixel_count().checked_mul(4);
    if expected != Some(pixels.len()) {
        return Err(PixstackError::backend(format!(
            "pixel buffer of {} bytes does not match {size}",
            pixels.len()
        )));
    }
    Ok(())
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/fx_cpu.rs"]
mod tests;
