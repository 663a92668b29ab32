use super::*;

#[test]
fn normalize_rel_path_normalizes_and_rejects_traversal() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path(" ").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn insert_get_and_replace() {
    let mut store = AssetStore::new();
    assert!(store.is_empty());
    let red = SourceImage::solid(1, 1, [255, 0, 0, 255]).unwrap();
    let blue = SourceImage::solid(2, 2, [0, 0, 255, 255]).unwrap();

    assert!(store.insert("badge", red.clone()).is_none());
    assert!(store.contains("badge"));
    assert_eq!(store.get("badge"), Some(&red));

    assert_eq!(store.insert("badge", blue.clone()), Some(red));
    assert_eq!(store.get("badge").map(|i| i.width()), Some(2));
    assert_eq!(store.len(), 1);
    assert_eq!(store.keys().collect::<Vec<_>>(), vec!["badge"]);
    assert!(store.get("missing").is_none());
}

#[test]
fn load_all_reads_relative_to_root() {
    let dir = std::env::temp_dir().join(format!("pixstack_assets_{}", std::process::id()));
    std::fs::create_dir_all(dir.join("stickers")).unwrap();
    image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 255, 0, 255]))
        .save(dir.join("stickers/star.png"))
        .unwrap();

    let entries = [("star".to_string(), "stickers/star.png".to_string())];
    let store = AssetStore::load_all(&dir, entries.iter().map(|(k, v)| (k, v))).unwrap();
    assert_eq!(store.get("star").map(|i| (i.width(), i.height())), Some((3, 2)));

    let bad = [("x".to_string(), "../escape.png".to_string())];
    assert!(AssetStore::load_all(&dir, bad.iter().map(|(k, v)| (k, v))).is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
