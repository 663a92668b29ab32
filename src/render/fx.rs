/// Largest blur radius any backend accepts.
pub const MAX_BLUR_RADIUS_PX: u32 = 256;

/// Pixel effects every backend can apply in place.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelFx {
    /// Separable gaussian blur with clamped edges.
    Blur { radius_px: u32, sigma: f32 },
    /// Affine color transform on straight-alpha color.
    ColorMatrix(ColorMatrix),
}

const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// 4x5 row-major color matrix over straight-alpha `[r, g, b, a]` in `0..=1`.
///
/// Row `i` computes `out[i] = m[i][0]*r + m[i][1]*g + m[i][2]*b + m[i][3]*a + m[i][4]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [[f32; 5]; 4]);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// Adds `amount` (-1..=1) to every color channel.
    pub fn brightness(amount: f32) -> Self {
        let mut m = Self::IDENTITY;
        for row in &mut m.0[..3] {
            row[4] = amount;
        }
        m
    }

    /// Scales distance from mid grey; 1 is identity.
    pub fn contrast(factor: f32) -> Self {
        let mut m = Self::IDENTITY;
        for (i, row) in m.0[..3].iter_mut().enumerate() {
            row[i] = factor;
            row[4] = 0.5 * (1.0 - factor);
        }
        m
    }

    /// Interpolates between luma grey (0) and the input (1); above 1 oversaturates.
    pub fn saturation(factor: f32) -> Self {
        let mut m = Self::IDENTITY;
        for (i, row) in m.0[..3].iter_mut().enumerate() {
            for (j, w) in LUMA.iter().enumerate() {
                let identity = if i == j { 1.0 } else { 0.0 };
                row[j] = (1.0 - factor) * w + factor * identity;
            }
        }
        m
    }

    /// `self` applied first, then `next`.
    pub fn then(&self, next: &Self) -> Self {
        let a = &self.0;
        let b = &next.0;
        let mut out = [[0.0f32; 5]; 4];
        for i in 0..4 {
            for j in 0..5 {
                let mut acc: f32 = (0..4).map(|k| b[i][k] * a[k][j]).sum();
                if j == 4 {
                    acc += b[i][4];
                }
                out[i][j] = acc;
            }
        }
        Self(out)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Apply to one straight-alpha color, clamping to `0..=1`.
    pub fn apply(&self, c: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (o, row) in out.iter_mut().zip(self.0.iter()) {
            let v = row[0] * c[0] + row[1] * c[1] + row[2] * c[2] + row[3] * c[3] + row[4];
            *o = v.clamp(0.0, 1.0);
        }
        out
    }
}
