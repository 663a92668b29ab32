use super::*;

struct StubFactory {
    kind: BackendKind,
    supported: bool,
}

impl RendererFactory for StubFactory {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, size: Size) -> PixstackResult<Box<dyn Renderer>> {
        CanvasFactory.create(size)
    }
}

fn backends(gpu: bool, canvas: bool) -> Backends {
    Backends {
        accelerated: Box::new(StubFactory {
            kind: BackendKind::Gpu,
            supported: gpu,
        }),
        raster: Box::new(StubFactory {
            kind: BackendKind::Canvas,
            supported: canvas,
        }),
    }
}

#[test]
fn auto_prefers_accelerated_when_supported() {
    let b = backends(true, true);
    assert_eq!(
        b.select(BackendPreference::Auto).unwrap().kind(),
        BackendKind::Gpu
    );
}

#[test]
fn canvas_preference_skips_accelerated() {
    let b = backends(true, true);
    assert_eq!(
        b.select(BackendPreference::Canvas).unwrap().kind(),
        BackendKind::Canvas
    );
}

#[test]
fn auto_falls_back_to_canvas() {
    let b = backends(false, true);
    assert_eq!(
        b.select(BackendPreference::Auto).unwrap().kind(),
        BackendKind::Canvas
    );
}

#[test]
fn nothing_supported_is_fatal() {
    let b = backends(false, false);
    assert!(matches!(
        b.select(BackendPreference::Auto),
        Err(PixstackError::NoRendererAvailable)
    ));
    assert!(matches!(
        b.select(BackendPreference::Canvas),
        Err(PixstackError::NoRendererAvailable)
    ));
}

#[test]
fn preference_parses_from_strings() {
    assert_eq!(
        "canvas".parse::<BackendPreference>().unwrap(),
        BackendPreference::Canvas
    );
    assert_eq!(
        " AUTO ".parse::<BackendPreference>().unwrap(),
        BackendPreference::Auto
    );
    assert!("webgl2".parse::<BackendPreference>().is_err());
}

#[test]
fn canvas_factory_is_always_supported() {
    assert!(CanvasFactory.is_supported());
    let r = create_backend(BackendKind::Canvas, Size::new(3, 2)).unwrap();
    assert_eq!(r.kind(), BackendKind::Canvas);
    assert_eq!(r.size(), Size::new(3, 2));
}

#[cfg(not(feature = "gpu"))]
#[test]
fn gpu_factory_without_feature_reports_unsupported() {
    assert!(!GpuFactory.is_supported());
    assert!(GpuFactory.create(Size::new(1, 1)).is_err());
}
