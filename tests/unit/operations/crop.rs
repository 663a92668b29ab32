use super::*;
use crate::foundation::core::SourceImage;
use crate::render::cpu::CanvasRenderer;

fn near(px: Option<[u8; 4]>, want: [u8; 4]) -> bool {
    px.is_some_and(|p| p.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 2))
}

#[test]
fn validate_enforces_ordered_unit_rect() {
    assert!(Crop::new((0.0, 0.0), (1.0, 1.0)).validate_settings().is_ok());
    assert!(Crop::new((0.2, 0.3), (0.8, 0.9)).validate_settings().is_ok());
    assert!(Crop::new((0.5, 0.0), (0.5, 1.0)).validate_settings().is_err());
    assert!(Crop::new((-0.1, 0.0), (1.0, 1.0)).validate_settings().is_err());
    assert!(Crop::new((0.0, 0.0), (1.0, 1.5)).validate_settings().is_err());
    assert!(Crop::new((0.0, f64::NAN), (1.0, 1.0)).validate_settings().is_err());
}

#[test]
fn from_settings_reads_points_and_defaults() {
    let c = Crop::from_settings(&serde_json::json!({ "start": [0.25, 0.5] })).unwrap();
    assert_eq!(c.start, Point::new(0.25, 0.5));
    assert_eq!(c.end, Point::new(1.0, 1.0));
    assert!(Crop::from_settings(&serde_json::json!({ "end": "1,1" })).is_err());
}

#[test]
fn pixel_rect_rounds_and_keeps_one_pixel() {
    let c = Crop::new((0.25, 0.5), (0.75, 1.0));
    assert_eq!(c.pixel_rect(Size::new(100, 50)), (25, 25, Size::new(50, 25)));

    let thin = Crop::new((0.5, 0.5), (0.501, 0.501));
    let (_, _, size) = thin.pixel_rect(Size::new(10, 10));
    assert_eq!(size, Size::new(1, 1));
}

#[test]
fn render_cuts_the_surface() {
    let mut r = CanvasRenderer::new(Size::new(10, 4)).unwrap();
    r.draw_image(&SourceImage::solid(10, 4, [9, 9, 9, 255]).unwrap())
        .unwrap();
    Crop::new((0.5, 0.0), (1.0, 0.5)).render(&mut r).unwrap();
    assert_eq!(r.size(), Size::new(5, 2));
    assert!(near(r.surface().unwrap().pixel(4, 1), [9, 9, 9, 255]));
}
