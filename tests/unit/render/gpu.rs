use super::*;

fn renderer_or_skip(size: Size) -> Option<GpuRenderer> {
    match GpuRenderer::new(size) {
        Ok(r) => Some(r),
        Err(e) if e.to_string().contains("no gpu adapter available") => None,
        Err(e) => panic!("gpu init failed: {e}"),
    }
}

#[test]
fn params_pack_into_uniform_block() {
    let p = Params::sample(Affine::translate((3.0, -2.0)), Size::new(8, 4));
    let bytes = p.to_bytes();
    assert_eq!(bytes.len() as u64, PARAMS_BYTES);

    let f = |i: usize| {
        let at = i * 4;
        f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    };
    assert_eq!(f(2), 3.0);
    assert_eq!(f(6), -2.0);
    assert_eq!((f(8), f(9)), (8.0, 4.0));
    assert_eq!(f(10), MODE_SAMPLE);
    assert_eq!(f(11), 1.0);
}

#[test]
fn align_to_rounds_up() {
    assert_eq!(align_to(4, 256), 256);
    assert_eq!(align_to(256, 256), 256);
    assert_eq!(align_to(257, 256), 512);
}

#[test]
fn size_tracks_recorded_transforms() {
    let Some(mut r) = renderer_or_skip(Size::new(6, 2)) else {
        return;
    };
    r.draw_image(&SourceImage::solid(6, 2, [255, 0, 0, 255]).unwrap())
        .unwrap();
    r.transform(Affine::IDENTITY, Size::new(3, 2)).unwrap();
    assert_eq!(r.size(), Size::new(3, 2));
    assert!(r.surface().is_err());

    r.render_final().unwrap();
    let s = r.surface().unwrap();
    assert_eq!(s.size(), Size::new(3, 2));
    assert_eq!(s.pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn resize_flushes_immediately() {
    let Some(mut r) = renderer_or_skip(Size::new(4, 4)) else {
        return;
    };
    r.draw_image(&SourceImage::solid(4, 4, [0, 0, 255, 255]).unwrap())
        .unwrap();
    r.resize_to(Size::new(2, 2)).unwrap();
    let s = r.surface().unwrap();
    assert_eq!(s.size(), Size::new(2, 2));
    assert_eq!(s.pixel(1, 1), Some([0, 0, 255, 255]));
}

#[test]
fn oversized_textures_are_errors_not_panics() {
    let Some(mut r) = renderer_or_skip(Size::new(2, 2)) else {
        return;
    };
    let max = r.device.limits().max_texture_dimension_2d;
    let wide = Size::new(max + 1, 1);

    let err = GpuRenderer::new(wide).unwrap_err();
    assert!(err.to_string().contains("outside"), "{err}");

    let strip = SourceImage::solid(wide.width, 1, [255, 255, 255, 255]).unwrap();
    assert!(r.draw_image(&strip).is_err());
    assert!(r.composite(&strip, Affine::IDENTITY, 1.0).is_err());
    assert!(r.resize_to(wide).is_err());

    assert!(
        r.apply_fx(&PixelFx::Blur {
            radius_px: MAX_BLUR_RADIUS_PX + 1,
            sigma: 1.0,
        })
        .is_err()
    );
    r.render_final().unwrap();
    assert_eq!(r.surface().unwrap().size(), Size::new(2, 2));
}
