//! Writing composites to disk.

use abi_reader::synthetic_scene;
use compositor::presets::{airmass, dust, true_color};
use compositor::{CompositeRecipe, LayerRecipe, SourceExpression};
use pipeline::{Pipeline, PipelineError};
use renderer::{GeoreferenceSidecar, PngSink, RenderError};
use sat_common::{BandArray, BandSet};

#[test]
fn test_png_sink_writes_image_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let sink = PngSink::new(dir.path().join("out")).unwrap();
    let scene = synthetic_scene(12, 20).unwrap();

    let report = Pipeline::default()
        .run(&scene, &[true_color(), dust(), airmass()], &sink)
        .unwrap();
    assert!(report.is_complete_success(), "{:?}", report.outcomes);

    for name in ["true_color", "dust", "airmass"] {
        let png = std::fs::read(sink.png_path(name)).unwrap();
        assert_eq!(&png[0..8], &renderer::png::PNG_SIGNATURE);
        // IHDR width and height
        assert_eq!(u32::from_be_bytes(png[16..20].try_into().unwrap()), 20);
        assert_eq!(u32::from_be_bytes(png[20..24].try_into().unwrap()), 12);

        let json = std::fs::read_to_string(sink.sidecar_path(name)).unwrap();
        let sidecar: GeoreferenceSidecar = serde_json::from_str(&json).unwrap();
        assert_eq!(sidecar.recipe, name);
        assert_eq!((sidecar.width, sidecar.height), (20, 12));
        assert_eq!(sidecar.extent, report.extent);
        assert_eq!(sidecar.projection, report.projection);
        assert!(sidecar.proj_string.starts_with("+proj=geos"));
        assert_eq!(sidecar.platform_id.as_deref(), Some("G16"));
        assert!(sidecar.observation.is_some());
    }
}

#[test]
fn test_sidecar_describes_recipe() {
    let dir = tempfile::tempdir().unwrap();
    let sink = PngSink::new(dir.path()).unwrap();
    let scene = synthetic_scene(4, 4).unwrap();

    Pipeline::new(false).run(&scene, &[dust()], &sink).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(sink.sidecar_path("dust")).unwrap())
            .unwrap();
    assert_eq!(
        json["description"],
        "Dust RGB: R = C15 - C13, G = C14 - C11, B = C13"
    );
    assert_eq!(json["projection"]["sweep_axis"], "x");
    assert_eq!(json["projection"]["central_latitude"], 0.0);
    assert!(json["extent"]["west"].as_f64().unwrap() < json["extent"]["east"].as_f64().unwrap());
}

#[test]
fn test_missing_pixels_are_transparent() {
    let mut c02 = vec![0.5; 4];
    c02[3] = f64::NAN;
    let bands: BandSet = [BandArray::new(2, 2, 2, c02).unwrap()].into_iter().collect();
    let recipe = CompositeRecipe::new(
        "gray",
        "",
        LayerRecipe::new(SourceExpression::band(2)).with_clip(0.0, 1.0),
        LayerRecipe::new(SourceExpression::band(2)).with_clip(0.0, 1.0),
        LayerRecipe::new(SourceExpression::band(2)).with_clip(0.0, 1.0),
    );
    let image = compositor::compose(&recipe, &bands).unwrap();
    let rgba = renderer::rgba::composite_to_rgba(&image);

    assert_eq!(&rgba[0..4], &[128, 128, 128, 255]);
    assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
}

#[test]
fn test_unwritable_directory_fails_per_composite() {
    let dir = tempfile::tempdir().unwrap();
    let sink = PngSink::new(dir.path()).unwrap();
    // A directory where the PNG should go makes the write fail
    std::fs::create_dir(sink.png_path("dust")).unwrap();

    let scene = synthetic_scene(4, 4).unwrap();
    let report = Pipeline::default()
        .run(&scene, &[dust(), airmass()], &sink)
        .unwrap();

    match &report.outcomes[0].result {
        Err(PipelineError::Sink { recipe, source }) => {
            assert_eq!(recipe, "dust");
            assert!(source.downcast_ref::<RenderError>().is_some());
        }
        other => panic!("expected sink failure, got {:?}", other),
    }
    assert!(report.outcomes[1].is_success());
    assert!(sink.png_path("airmass").exists());
}

#[test]
fn test_colliding_file_names_fail_one_composite() {
    let dir = tempfile::tempdir().unwrap();
    let sink = PngSink::new(dir.path()).unwrap();
    let scene = synthetic_scene(4, 4).unwrap();

    let mut spaced = dust();
    spaced.name = "dust rgb".to_string();
    let mut underscored = airmass();
    underscored.name = "dust_rgb".to_string();

    let report = Pipeline::new(false)
        .run(&scene, &[spaced, underscored], &sink)
        .unwrap();

    assert!(report.outcomes[0].is_success());
    match &report.outcomes[1].result {
        Err(PipelineError::Sink { recipe, source }) => {
            assert_eq!(recipe, "dust_rgb");
            assert!(matches!(
                source.downcast_ref::<RenderError>(),
                Some(RenderError::NameCollision { .. })
            ));
        }
        other => panic!("expected name collision, got {:?}", other),
    }

    // The first recipe's output is left intact
    let json = std::fs::read_to_string(sink.sidecar_path("dust rgb")).unwrap();
    let sidecar: GeoreferenceSidecar = serde_json::from_str(&json).unwrap();
    assert_eq!(sidecar.recipe, "dust rgb");
}
