use crate::{
    foundation::core::{Affine, Size, SourceImage},
    foundation::error::{PixstackError, PixstackResult},
    render::{
        backend::{BackendKind, Renderer},
        fx::{ColorMatrix, MAX_BLUR_RADIUS_PX, PixelFx},
        surface::Surface,
    },
};

const PARAMS_BYTES: u64 = 9 * 16;

const MODE_SAMPLE: f32 = 0.0;
const MODE_COLOR_MATRIX: f32 = 1.0;
const MODE_BLUR: f32 = 2.0;

const SHADER: &str = r#"
struct Params {
  inv0: vec4<f32>,
  inv1: vec4<f32>,
  src: vec4<f32>,
  m0: vec4<f32>,
  m1: vec4<f32>,
  m2: vec4<f32>,
  m3: vec4<f32>,
  offset: vec4<f32>,
  blur: vec4<f32>,
};

@group(0) @binding(0) var t_src: texture_2d<f32>;
@group(0) @binding(1) var s_src: sampler;
@group(0) @binding(2) var<uniform> params: Params;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4<f32> {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  return vec4<f32>(p[vi], 0.0, 1.0);
}

fn color_matrix(c: vec4<f32>) -> vec4<f32> {
  var s = vec4<f32>(0.0);
  if (c.a > 0.0) {
    s = vec4<f32>(min(c.rgb / c.a, vec3<f32>(1.0)), c.a);
  }
  let o = clamp(
    vec4<f32>(dot(params.m0, s), dot(params.m1, s), dot(params.m2, s), dot(params.m3, s))
      + params.offset,
    vec4<f32>(0.0),
    vec4<f32>(1.0),
  );
  return vec4<f32>(o.rgb * o.a, o.a);
}

fn blur(uv: vec2<f32>, size: vec2<f32>) -> vec4<f32> {
  let r = i32(params.blur.z);
  let denom = 2.0 * params.blur.w * params.blur.w;
  var acc = vec4<f32>(0.0);
  var total = 0.0;
  for (var i: i32 = -r; i <= r; i = i + 1) {
    let x = f32(i);
    let w = exp(-x * x / denom);
    let off = params.blur.xy * x / size;
    acc = acc + w * textureSampleLevel(t_src, s_src, uv + off, 0.0);
    total = total + w;
  }
  return acc / total;
}

@fragment
fn fs(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
  let sx = dot(params.inv0.xyz, vec3<f32>(frag.xy, 1.0));
  let sy = dot(params.inv1.xyz, vec3<f32>(frag.xy, 1.0));
  let size = params.src.xy;
  if (sx < 0.0 || sy < 0.0 || sx >= size.x || sy >= size.y) {
    return vec4<f32>(0.0);
  }
  let uv = vec2<f32>(sx, sy) / size;
  let mode = u32(params.src.z);
  var c: vec4<f32>;
  if (mode == 2u) {
    c = blur(uv, size);
  } else {
    c = textureSampleLevel(t_src, s_src, uv, 0.0);
  }
  if (mode == 1u) {
    c = color_matrix(c);
  }
  return c * params.src.w;
}
"#;

#[derive(Debug)]
struct GpuTexture {
    size: Size,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

#[derive(Debug)]
struct Pipelines {
    replace: wgpu::RenderPipeline,
    blend: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

/// A recorded, not yet executed, surface mutation.
#[derive(Debug)]
enum GpuPass {
    Transform {
        inverse: Affine,
        target: Size,
    },
    ColorMatrix(ColorMatrix),
    Blur {
        radius_px: u32,
        sigma: f32,
    },
    Composite {
        overlay: SourceImage,
        inverse: Affine,
        opacity: f32,
    },
}

/// Accelerated backend on `wgpu`.
///
/// Primitives are recorded and only executed by [`Renderer::render_final`] or
/// [`Renderer::snapshot`]; [`GpuRenderer::size`] tracks the size the recorded passes will
/// produce. `resize_to` records and flushes immediately.
#[derive(Debug)]
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipelines: Pipelines,
    current: GpuTexture,
    size: Size,
    pending: Vec<GpuPass>,
}

impl GpuRenderer {
    /// Side-effect free adapter probe.
    pub fn is_supported() -> bool {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .is_ok()
    }

    pub fn new(size: Size) -> PixstackResult<Self> {
        if size.is_empty() {
            return Err(PixstackError::backend(format!(
                "gpu surface must be non-empty, got {size}"
            )));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                PixstackError::backend("no gpu adapter available")
            }
            other => PixstackError::backend(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("pixstack_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| PixstackError::backend(format!("wgpu request_device failed: {e:?}")))?;

        check_extent(&device, size)?;
        let pipelines = create_pipelines(&device);
        let current = create_texture(&device, size)?;
        tracing::debug!(%size, "gpu renderer initialized");
        Ok(Self {
            device,
            queue,
            pipelines,
            current,
            size,
            pending: Vec::new(),
        })
    }

    fn upload(&self, image: &SourceImage) -> PixstackResult<GpuTexture> {
        self.check_target(image.size())?;
        let tex = create_texture(&self.device, image.size())?;
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.rgba8_premul(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width() * 4),
                rows_per_image: Some(image.height()),
            },
            extent(image.size()),
        );
        Ok(tex)
    }

    /// One fullscreen draw from `src` into `dst`.
    fn encode_draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        src: &GpuTexture,
        dst: &GpuTexture,
        params: &[u8],
        blend: bool,
    ) {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixstack_pass_params"),
            size: PARAMS_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(&buffer, 0, params);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pixstack_pass_bg"),
            layout: &self.pipelines.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&src.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.pipelines.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
        });

        let load = if blend {
            wgpu::LoadOp::Load
        } else {
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
        };
        let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pixstack_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &dst.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        rp.set_pipeline(if blend {
            &self.pipelines.blend
        } else {
            &self.pipelines.replace
        });
        rp.set_bind_group(0, &bind_group, &[]);
        rp.draw(0..3, 0..1);
    }

    /// Execute every recorded pass in order with a single submission.
    fn flush(&mut self) -> PixstackResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let passes = std::mem::take(&mut self.pending);
        tracing::debug!(passes = passes.len(), "gpu flush");

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixstack_flush_encoder"),
            });
        let mut current = create_texture(&self.device, self.current.size)?;
        encoder.copy_texture_to_texture(
            self.current.texture.as_image_copy(),
            current.texture.as_image_copy(),
            extent(self.current.size),
        );

        for pass in &passes {
            match pass {
                GpuPass::Transform { inverse, target } => {
                    let dst = create_texture(&self.device, *target)?;
                    let params = Params::sample(*inverse, current.size);
                    self.encode_draw(&mut encoder, &current, &dst, &params.to_bytes(), false);
                    current = dst;
                }
                GpuPass::ColorMatrix(m) => {
                    let dst = create_texture(&self.device, current.size)?;
                    let params = Params::color_matrix(m, current.size);
                    self.encode_draw(&mut encoder, &current, &dst, &params.to_bytes(), false);
                    current = dst;
                }
                GpuPass::Blur { radius_px, sigma } => {
                    for dir in [(1.0, 0.0), (0.0, 1.0)] {
                        let dst = create_texture(&self.device, current.size)?;
                        let params = Params::blur(dir, *radius_px, *sigma, current.size);
                        self.encode_draw(&mut encoder, &current, &dst, &params.to_bytes(), false);
                        current = dst;
                    }
                }
                GpuPass::Composite {
                    overlay,
                    inverse,
                    opacity,
                } => {
                    let src = self.upload(overlay)?;
                    let mut params = Params::sample(*inverse, src.size);
                    params.opacity = opacity.clamp(0.0, 1.0);
                    self.encode_draw(&mut encoder, &src, &current, &params.to_bytes(), true);
                }
            }
        }

        self.queue.submit(Some(encoder.finish()));
        self.current = current;
        Ok(())
    }

    fn readback(&self) -> PixstackResult<Surface> {
        let size = self.current.size;
        let bytes_per_row = align_to(
            size.width
                .checked_mul(4)
                .ok_or_else(|| PixstackError::backend("readback width overflow"))?,
            wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        );
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixstack_readback"),
            size: u64::from(bytes_per_row) * u64::from(size.height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixstack_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            self.current.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(size.height),
                },
            },
            extent(size),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| PixstackError::backend(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| PixstackError::backend("readback channel closed"))?
            .map_err(|e| PixstackError::backend(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let row_bytes = (size.width as usize) * 4;
        let mut data = Vec::with_capacity(row_bytes * size.height as usize);
        for row in 0..size.height as usize {
            let start = row * bytes_per_row as usize;
            data.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        readback.unmap();

        Ok(Surface {
            width: size.width,
            height: size.height,
            data,
            premultiplied: true,
        })
    }

    fn check_target(&self, target: Size) -> PixstackResult<()> {
        check_extent(&self.device, target)
    }
}

impl Renderer for GpuRenderer {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn draw_image(&mut self, image: &SourceImage) -> PixstackResult<()> {
        self.check_target(image.size())?;
        self.flush()?;
        let src = self.upload(image)?;
        let dst = create_texture(&self.device, self.size)?;
        let params = Params::sample(image.size().stretch_to(self.size).inverse(), src.size);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pixstack_draw_image_encoder"),
            });
        self.encode_draw(&mut encoder, &src, &dst, &params.to_bytes(), false);
        self.queue.submit(Some(encoder.finish()));
        self.current = dst;
        Ok(())
    }

    fn size(&self) -> Size {
        self.size
    }

    fn resize_to(&mut self, target: Size) -> PixstackResult<()> {
        self.check_target(target)?;
        let inverse = self.size.stretch_to(target).inverse();
        self.pending.push(GpuPass::Transform { inverse, target });
        self.size = target;
        self.flush()
    }

    fn render_final(&mut self) -> PixstackResult<()> {
        self.flush()
    }

    fn surface(&self) -> PixstackResult<Surface> {
        if !self.pending.is_empty() {
            return Err(PixstackError::backend(
                "gpu surface read with unflushed passes; call render_final first",
            ));
        }
        self.readback()
    }

    fn snapshot(&mut self) -> PixstackResult<Surface> {
        self.flush()?;
        self.readback()
    }

    fn transform(&mut self, transform: Affine, target: Size) -> PixstackResult<()> {
        self.check_target(target)?;
        if transform.determinant().abs() < f64::EPSILON {
            return Err(PixstackError::backend("transform is not invertible"));
        }
        self.pending.push(GpuPass::Transform {
            inverse: transform.inverse(),
            target,
        });
        self.size = target;
        Ok(())
    }

    fn apply_fx(&mut self, fx: &PixelFx) -> PixstackResult<()> {
        match fx {
            PixelFx::Blur { radius_px: 0, .. } => {}
            PixelFx::Blur { radius_px, sigma } => {
                if *radius_px > MAX_BLUR_RADIUS_PX {
                    return Err(PixstackError::backend(format!(
                        "blur radius {radius_px} exceeds {MAX_BLUR_RADIUS_PX}"
                    )));
                }
                if !sigma.is_finite() || *sigma <= 0.0 {
                    return Err(PixstackError::validation("blur sigma must be > 0"));
                }
                self.pending.push(GpuPass::Blur {
                    radius_px: *radius_px,
                    sigma: *sigma,
                });
            }
            PixelFx::ColorMatrix(m) if m.is_identity() => {}
            PixelFx::ColorMatrix(m) => self.pending.push(GpuPass::ColorMatrix(*m)),
        }
        Ok(())
    }

    fn composite(
        &mut self,
        overlay: &SourceImage,
        transform: Affine,
        opacity: f32,
    ) -> PixstackResult<()> {
        if transform.determinant().abs() < f64::EPSILON {
            return Err(PixstackError::backend("overlay transform is not invertible"));
        }
        self.check_target(overlay.size())?;
        self.pending.push(GpuPass::Composite {
            overlay: overlay.clone(),
            inverse: transform.inverse(),
            opacity,
        });
        Ok(())
    }
}

/// Uniform block shared by every pass; see `Params` in the shader.
struct Params {
    inverse: Affine,
    src: Size,
    mode: f32,
    opacity: f32,
    matrix: ColorMatrix,
    blur: [f32; 4],
}

impl Params {
    fn sample(inverse: Affine, src: Size) -> Self {
        Self {
            inverse,
            src,
            mode: MODE_SAMPLE,
            opacity: 1.0,
            matrix: ColorMatrix::IDENTITY,
            blur: [0.0; 4],
        }
    }

    fn color_matrix(m: &ColorMatrix, src: Size) -> Self {
        Self {
            mode: MODE_COLOR_MATRIX,
            matrix: *m,
            ..Self::sample(Affine::IDENTITY, src)
        }
    }

    fn blur(dir: (f32, f32), radius_px: u32, sigma: f32, src: Size) -> Self {
        Self {
            mode: MODE_BLUR,
            blur: [dir.0, dir.1, radius_px as f32, sigma],
            ..Self::sample(Affine::IDENTITY, src)
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let [a, b, c, d, e, f] = self.inverse.as_coeffs();
        let m = &self.matrix.0;
        let floats: [f32; 36] = [
            a as f32,
            c as f32,
            e as f32,
            0.0,
            b as f32,
            d as f32,
            f as f32,
            0.0,
            self.src.width as f32,
            self.src.height as f32,
            self.mode,
            self.opacity,
            m[0][0],
            m[0][1],
            m[0][2],
            m[0][3],
            m[1][0],
            m[1][1],
            m[1][2],
            m[1][3],
            m[2][0],
            m[2][1],
            m[2][2],
            m[2][3],
            m[3][0],
            m[3][1],
            m[3][2],
            m[3][3],
            m[0][4],
            m[1][4],
            m[2][4],
            m[3][4],
            self.blur[0],
            self.blur[1],
            self.blur[2],
            self.blur[3],
        ];
        floats.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

fn create_pipelines(device: &wgpu::Device) -> Pipelines {
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("pixstack_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("pixstack_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(PARAMS_BYTES),
                },
                count: None,
            },
        ],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("pixstack_shader"),
        source: wgpu::ShaderSource::Wgsl(SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pixstack_pl"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let make = |label: &str, blend: Option<wgpu::BlendState>| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    };

    Pipelines {
        replace: make("pixstack_replace_pipeline", None),
        blend: make(
            "pixstack_blend_pipeline",
            Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
        ),
        bind_group_layout,
        sampler,
    }
}

fn create_texture(device: &wgpu::Device, size: Size) -> PixstackResult<GpuTexture> {
    if size.is_empty() {
        return Err(PixstackError::backend("gpu texture must be non-empty"));
    }
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pixstack_surface"),
        size: extent(size),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Ok(GpuTexture {
        size,
        texture,
        view,
    })
}

/// Must run before any texture allocation: wgpu reports oversized textures through its
/// uncaptured-error handler, which panics.
fn check_extent(device: &wgpu::Device, size: Size) -> PixstackResult<()> {
    let max = device.limits().max_texture_dimension_2d;
    if size.is_empty() || size.width > max || size.height > max {
        return Err(PixstackError::backend(format!(
            "gpu surface {size} outside 1..={max}"
        )));
    }
    Ok(())
}

fn extent(size: Size) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
#[path = "../../tests/unit/render/gpu.rs"]
mod tests;
