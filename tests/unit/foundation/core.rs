use super::*;

#[test]
fn size_transposes_and_reports_emptiness() {
    let s = Size::new(40, 10);
    assert_eq!(s.transposed(), Size::new(10, 40));
    assert!(!s.is_empty());
    assert!(Size::new(0, 10).is_empty());
    assert_eq!(s.to_string(), "40x10");
}

#[test]
fn stretch_maps_corners() {
    let a = Size::new(10, 20).stretch_to(Size::new(30, 10));
    let p = a * Point::new(10.0, 20.0);
    assert_eq!((p.x, p.y), (30.0, 10.0));
}

#[test]
fn source_image_rejects_length_mismatch() {
    assert!(SourceImage::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_premul_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn source_image_premultiplies_straight_input() {
    let img = SourceImage::from_rgba8(1, 1, vec![100, 50, 200, 128]).unwrap();
    assert_eq!(
        img.rgba8_premul(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn source_image_clone_shares_pixels() {
    let a = SourceImage::solid(4, 4, [255, 0, 0, 255]).unwrap();
    let b = a.clone();
    assert!(std::ptr::eq(a.rgba8_premul(), b.rgba8_premul()));
}

#[test]
fn unpremultiply_restores_opaque_and_clears_transparent() {
    let mut px = vec![10, 20, 30, 255, 9, 9, 9, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
}

#[test]
fn decoded_image_conversion_rejects_empty_images() {
    let empty = image::RgbaImage::new(0, 0);
    assert!(SourceImage::try_from(&empty).is_err());

    let one = image::RgbaImage::from_raw(1, 1, vec![200, 100, 0, 255]).unwrap();
    let img = SourceImage::try_from(&one).unwrap();
    assert_eq!(img.size(), Size::new(1, 1));
    assert_eq!(img.rgba8_premul(), &[200, 100, 0, 255]);
}
