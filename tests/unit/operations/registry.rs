use serde_json::json;

use super::*;

#[test]
fn builtin_registry_knows_every_operation() {
    let r = OperationRegistry::with_builtin();
    assert_eq!(
        r.identifiers().collect::<Vec<_>>(),
        vec![
            "adjustments",
            "blur",
            "crop",
            "flip",
            "frame",
            "rotation",
            "sticker"
        ]
    );
    assert!(OperationRegistry::new().identifiers().next().is_none());
}

#[test]
fn build_resolves_identifier_and_settings() {
    let r = OperationRegistry::with_builtin();
    let op = r
        .build("blur", &json!({ "radius_px": 4 }), &AssetStore::new())
        .unwrap();
    assert_eq!(op.identifier(), "blur");
    assert!(op.validate_settings().is_ok());

    let err = r.build("sharpen", &json!({}), &AssetStore::new()).unwrap_err();
    assert!(err.to_string().contains("unknown operation 'sharpen'"));
}

#[test]
fn parse_accepts_out_of_range_values_for_later_validation() {
    let r = OperationRegistry::with_builtin();
    let op = r
        .build("adjustments", &json!({ "brightness": 3.0 }), &AssetStore::new())
        .unwrap();
    assert!(matches!(
        op.validate_settings(),
        Err(PixstackError::InvalidOperationSettings { .. })
    ));
}

#[test]
fn build_stack_preserves_order() {
    let r = OperationRegistry::with_builtin();
    let specs = vec![
        OperationSpec::new("rotation", json!({ "degrees": 90 })),
        OperationSpec::new("crop", json!({ "start": [0.0, 0.0], "end": [0.5, 0.5] })),
        OperationSpec::new("flip", serde_json::Value::Null),
    ];
    let ops = r.build_stack(&specs, &AssetStore::new()).unwrap();
    let ids: Vec<_> = ops.iter().map(|o| o.identifier()).collect();
    assert_eq!(ids, vec!["rotation", "crop", "flip"]);
}

#[test]
fn register_rejects_duplicates() {
    let mut r = OperationRegistry::with_builtin();
    let custom: OperationFactory = |v, _| Ok(Box::new(Flip::from_settings(v)?));
    assert!(r.register("crop", custom).is_err());
    assert!(r.register("", custom).is_err());
    r.register("mirror", custom).unwrap();
    assert!(r.contains("mirror"));
}
