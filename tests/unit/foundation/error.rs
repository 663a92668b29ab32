use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PixstackError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PixstackError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(
        PixstackError::invalid_dimensions("x")
            .to_string()
            .contains("invalid dimension spec:")
    );
    assert!(
        PixstackError::NoRendererAvailable
            .to_string()
            .contains("no renderer available")
    );
}

#[test]
fn invalid_settings_names_the_operation() {
    let err = PixstackError::invalid_settings("crop", "start must be < end");
    let msg = err.to_string();
    assert!(msg.contains("'crop'"));
    assert!(msg.contains("start must be < end"));
    assert!(matches!(
        err,
        PixstackError::InvalidOperationSettings { ref identifier, .. } if identifier == "crop"
    ));
}

#[test]
fn render_failure_keeps_index_and_source() {
    let err = PixstackError::render_failure(1, "blur", PixstackError::backend("device lost"));
    assert!(err.to_string().contains("#1 'blur'"));
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("device lost"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PixstackError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
