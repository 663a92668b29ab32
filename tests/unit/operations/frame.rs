use super::*;
use crate::render::cpu::CanvasRenderer;

fn near(px: Option<[u8; 4]>, want: [u8; 4]) -> bool {
    px.is_some_and(|p| p.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 2))
}

#[test]
fn thickness_must_be_in_half_open_range() {
    let f = |t| Frame {
        thickness: t,
        ..Frame::default()
    };
    assert!(f(0.5).validate_settings().is_ok());
    assert!(f(0.01).validate_settings().is_ok());
    assert!(f(0.0).validate_settings().is_err());
    assert!(f(0.6).validate_settings().is_err());
    assert!(f(f64::NAN).validate_settings().is_err());
}

#[test]
fn strips_tile_the_border_without_overlap() {
    let frame = Frame {
        thickness: 0.1,
        color: [0, 0, 0, 255],
    };
    let size = Size::new(40, 20);
    assert_eq!(frame.thickness_px(size), 2);
    let strips = frame.strips(size);
    assert_eq!(
        strips,
        vec![(0, 0, 40, 2), (0, 18, 40, 2), (0, 2, 2, 16), (38, 2, 2, 16)]
    );
    let area: u32 = strips.iter().map(|&(_, _, w, h)| w * h).sum();
    assert_eq!(area, 40 * 20 - 36 * 16);
}

#[test]
fn render_paints_edges_only() {
    let mut r = CanvasRenderer::new(Size::new(10, 10)).unwrap();
    r.draw_image(&SourceImage::solid(10, 10, [0, 0, 0, 255]).unwrap())
        .unwrap();
    let frame = Frame {
        thickness: 0.2,
        color: [255, 255, 255, 255],
    };
    frame.render(&mut r).unwrap();
    let s = r.surface().unwrap();
    assert!(near(s.pixel(0, 5), [255, 255, 255, 255]));
    assert!(near(s.pixel(9, 9), [255, 255, 255, 255]));
    assert!(near(s.pixel(5, 5), [0, 0, 0, 255]));
}

#[test]
fn from_settings_reads_color() {
    let f = Frame::from_settings(&serde_json::json!({ "thickness": 0.1, "color": [1, 2, 3, 4] }))
        .unwrap();
    assert_eq!(f.color, [1, 2, 3, 4]);
    assert!(Frame::from_settings(&serde_json::json!({ "color": [1, 2, 3] })).is_err());
}

#[test]
fn odd_edge_at_max_thickness_keeps_strips_disjoint() {
    let frame = Frame {
        thickness: 0.5,
        color: [255, 0, 0, 128],
    };
    let size = Size::new(3, 3);
    assert_eq!(frame.thickness_px(size), 1);
    assert_eq!(
        frame.strips(size),
        vec![(0, 0, 3, 1), (0, 2, 3, 1), (0, 1, 1, 1), (2, 1, 1, 1)]
    );
}

#[test]
fn single_row_surface_gets_one_strip() {
    let frame = Frame {
        thickness: 0.5,
        color: [0, 0, 0, 255],
    };
    assert_eq!(frame.strips(Size::new(5, 1)), vec![(0, 0, 5, 1)]);
    assert_eq!(frame.strips(Size::new(1, 4)), vec![(0, 0, 1, 1), (0, 3, 1, 1), (0, 1, 1, 2)]);
}

#[test]
fn translucent_frame_blends_each_border_pixel_once() {
    let mut r = CanvasRenderer::new(Size::new(3, 3)).unwrap();
    r.draw_image(&SourceImage::solid(3, 3, [0, 0, 0, 255]).unwrap())
        .unwrap();
    let frame = Frame {
        thickness: 0.5,
        color: [255, 0, 0, 128],
    };
    frame.render(&mut r).unwrap();
    let s = r.surface().unwrap();
    for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)] {
        assert!(near(s.pixel(x, y), [128, 0, 0, 255]), "({x},{y}) {:?}", s.pixel(x, y));
    }
    assert!(near(s.pixel(1, 1), [0, 0, 0, 255]));
}
