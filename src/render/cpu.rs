use std::sync::Arc;

use crate::{
    foundation::core::{Affine, Size, SourceImage},
    foundation::error::{PixstackError, PixstackResult},
    render::{
        backend::{BackendKind, Renderer},
        fx::PixelFx,
        fx_cpu::{blur_premul, color_matrix_premul},
        surface::Surface,
    },
};

/// Raster surface backend: one `vello_cpu` pixmap, mutated in place.
///
/// Every geometric primitive draws into a freshly allocated pixmap and then swaps it in, so the
/// previous surface is dropped rather than shared.
pub struct CanvasRenderer {
    size: Size,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CanvasRenderer {
    /// The raster backend has no platform requirements.
    pub fn is_supported() -> bool {
        true
    }

    pub fn new(size: Size) -> PixstackResult<Self> {
        let (w, h) = pixmap_dims(size)?;
        Ok(Self {
            size,
            pixmap: vello_cpu::Pixmap::new(w, h),
            ctx: None,
        })
    }

    /// Render `layers` bottom to top into a new transparent pixmap of `target` size. Each
    /// layer is an image placed by an affine, with an opacity in `0..=1`.
    fn render_layers(
        &mut self,
        target: Size,
        layers: &[(Arc<vello_cpu::Pixmap>, Affine, f32)],
    ) -> PixstackResult<vello_cpu::Pixmap> {
        let (w, h) = pixmap_dims(target)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        for (image, transform, opacity) in layers {
            let opacity = opacity.clamp(0.0, 1.0);
            if opacity <= 0.0 {
                continue;
            }
            let rect = vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(image.width()),
                f64::from(image.height()),
            );
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::clone(image)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            });
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&rect);
            if opacity < 1.0 {
                ctx.pop_layer();
            }
        }
        ctx.flush();

        let mut out = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut out);
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_into_fresh(
        &mut self,
        image: Arc<vello_cpu::Pixmap>,
        transform: Affine,
        target: Size,
    ) -> PixstackResult<vello_cpu::Pixmap> {
        self.render_layers(target, &[(image, transform, 1.0)])
    }

    /// Move the working pixmap out so it can be used as an image paint.
    fn take_pixmap(&mut self) -> Arc<vello_cpu::Pixmap> {
        Arc::new(std::mem::replace(
            &mut self.pixmap,
            vello_cpu::Pixmap::new(1, 1),
        ))
    }
}

impl Renderer for CanvasRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Canvas
    }

    fn draw_image(&mut self, image: &SourceImage) -> PixstackResult<()> {
        let src = pixmap_from_premul_bytes(image.rgba8_premul(), image.width(), image.height())?;
        let stretch = image.size().stretch_to(self.size);
        self.pixmap = self.draw_into_fresh(Arc::new(src), stretch, self.size)?;
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn resize_to(&mut self, target: Size) -> PixstackResult<()> {
        pixmap_dims(target)?;
        let stretch = self.size.stretch_to(target);
        let old = self.take_pixmap();
        self.pixmap = self.draw_into_fresh(old, stretch, target)?;
        tracing::debug!(from = %self.size, to = %target, "canvas resize");
        self.size = target;
        Ok(())
    }

    fn render_final(&mut self) -> PixstackResult<()> {
        // Nothing is deferred on the raster backend.
        Ok(())
    }

    fn surface(&self) -> PixstackResult<Surface> {
        Ok(Surface {
            width: self.size.width,
            height: self.size.height,
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn snapshot(&mut self) -> PixstackResult<Surface> {
        self.surface()
    }

    fn transform(&mut self, transform: Affine, target: Size) -> PixstackResult<()> {
        pixmap_dims(target)?;
        let old = self.take_pixmap();
        self.pixmap = self.draw_into_fresh(old, transform, target)?;
        self.size = target;
        Ok(())
    }

    fn apply_fx(&mut self, fx: &PixelFx) -> PixstackResult<()> {
        match fx {
            PixelFx::Blur { radius_px, sigma } => blur_premul(
                self.pixmap.data_as_u8_slice_mut(),
                self.size,
                *radius_px,
                *sigma,
            )?,
            PixelFx::ColorMatrix(m) => {
                color_matrix_premul(self.pixmap.data_as_u8_slice_mut(), self.size, m)?;
            }
        }
        Ok(())
    }

    fn composite(
        &mut self,
        overlay: &SourceImage,
        transform: Affine,
        opacity: f32,
    ) -> PixstackResult<()> {
        if opacity <= 0.0 {
            return Ok(());
        }
        let src =
            pixmap_from_premul_bytes(overlay.rgba8_premul(), overlay.width(), overlay.height())?;
        let base = self.take_pixmap();
        self.pixmap = self.render_layers(
            self.size,
            &[
                (base, Affine::IDENTITY, 1.0),
                (Arc::new(src), transform, opacity),
            ],
        )?;
        Ok(())
    }
}

fn pixmap_dims(size: Size) -> PixstackResult<(u16, u16)> {
    if size.is_empty() {
        return Err(PixstackError::backend(format!(
            "canvas surface must be non-empty, got {size}"
        )));
    }
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| PixstackError::backend("canvas width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| PixstackError::backend("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PixstackResult<vello_cpu::Pixmap> {
    let (w, h) = pixmap_dims(Size::new(width, height))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(PixstackError::backend("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
