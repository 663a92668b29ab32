use super::*;
use crate::render::cpu::CanvasRenderer;

fn near(px: Option<[u8; 4]>, want: [u8; 4]) -> bool {
    px.is_some_and(|p| p.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 2))
}

fn store_with_badge() -> AssetStore {
    let mut store = AssetStore::new();
    store.insert("badge", SourceImage::solid(2, 2, [255, 0, 0, 255]).unwrap());
    store
}

#[test]
fn missing_asset_is_a_settings_error_not_a_parse_error() {
    let s = Sticker::from_settings(&serde_json::json!({ "asset": "nope" }), &AssetStore::new())
        .unwrap();
    assert!(s.image.is_none());
    let err = s.validate_settings().unwrap_err();
    assert!(err.to_string().contains("nope"));

    assert!(Sticker::from_settings(&serde_json::json!({}), &AssetStore::new()).is_err());
}

#[test]
fn validate_checks_ranges() {
    let store = store_with_badge();
    let ok = Sticker::from_settings(
        &serde_json::json!({ "asset": "badge", "scale": 0.5, "opacity": 0.3, "rotation": 15 }),
        &store,
    )
    .unwrap();
    assert!(ok.validate_settings().is_ok());

    let mut s = ok.clone();
    s.scale = 0.0;
    assert!(s.validate_settings().is_err());
    let mut s = ok.clone();
    s.opacity = 1.5;
    assert!(s.validate_settings().is_err());
    let mut s = ok;
    s.position = Point::new(f64::NAN, 0.0);
    assert!(s.validate_settings().is_err());
}

#[test]
fn placement_centers_and_scales_to_canvas_width() {
    let mut s = Sticker::new("badge", SourceImage::solid(10, 10, [0; 4]).unwrap());
    s.scale = 0.5;
    s.position = Point::new(0.5, 0.5);
    let t = s.placement(Size::new(10, 10), Size::new(40, 20));
    assert_eq!(t * Point::new(5.0, 5.0), Point::new(20.0, 10.0));
    assert_eq!(t * Point::new(0.0, 0.0), Point::new(10.0, 0.0));
}

#[test]
fn render_composites_without_resizing() {
    let mut r = CanvasRenderer::new(Size::new(8, 8)).unwrap();
    r.draw_image(&SourceImage::solid(8, 8, [0, 0, 0, 255]).unwrap())
        .unwrap();
    let mut s = Sticker::new("badge", SourceImage::solid(2, 2, [255, 0, 0, 255]).unwrap());
    s.scale = 0.5;
    s.render(&mut r).unwrap();
    let out = r.surface().unwrap();
    assert_eq!(r.size(), Size::new(8, 8));
    assert!(near(out.pixel(4, 4), [255, 0, 0, 255]));
    assert!(near(out.pixel(0, 0), [0, 0, 0, 255]));
}
