#![allow(clippy::float_cmp)]

use super::*;
use crate::color::ColorError;
use crate::layer::TextLayer;

fn rect() -> Layer {
    Layer::rectangle(0.0, 0.0, 10.0, 10.0)
}

// =============================================================
// LayerUpdate -> LayerPatch
// =============================================================

#[test]
fn empty_update_yields_empty_patch() {
    let patch = LayerUpdate::default().into_patch().unwrap();
    assert!(patch.is_empty());
    assert!(patch.fields().is_empty());
}

#[test]
fn hex_colors_are_decoded() {
    let update = LayerUpdate { fill: Some("#1e1e1e".into()), stroke: Some("ff0000".into()), ..Default::default() };
    let patch = update.into_patch().unwrap();
    assert_eq!(patch.fill, Some(Rgb::new(30, 30, 30)));
    assert_eq!(patch.stroke, Some(Rgb::new(255, 0, 0)));
}

#[test]
fn malformed_hex_is_rejected() {
    let update = LayerUpdate { fill: Some("#12".into()), ..Default::default() };
    let err = update.into_patch().unwrap_err();
    assert_eq!(err, MutationError::Color(ColorError::InvalidFormat("#12".into())));
}

#[test]
fn opacity_is_clamped_and_rounded() {
    let cases = [(-5.0, 0), (0.0, 0), (49.6, 50), (100.0, 100), (250.0, 100)];
    for (input, expected) in cases {
        let update = LayerUpdate { opacity: Some(input), ..Default::default() };
        assert_eq!(update.into_patch().unwrap().opacity, Some(expected), "input {input}");
    }
}

#[test]
fn corner_radius_is_clamped() {
    let cases = [(-1.0, 0.0), (20.0, 20.0), (150.0, 100.0)];
    for (input, expected) in cases {
        let update = LayerUpdate { corner_radius: Some(input), ..Default::default() };
        assert_eq!(update.into_patch().unwrap().corner_radius, Some(expected));
    }
}

#[test]
fn non_finite_opacity_is_rejected() {
    let update = LayerUpdate { opacity: Some(f64::NAN), ..Default::default() };
    assert!(matches!(
        update.into_patch(),
        Err(MutationError::Patch(PatchError::InvalidValue { field: "opacity", .. }))
    ));
}

#[test]
fn typography_values_are_resolved() {
    let update = LayerUpdate {
        font_weight: Some(700),
        font_family: Some("Times New Roman".into()),
        font_size: Some(24.0),
        ..Default::default()
    };
    let patch = update.into_patch().unwrap();
    assert_eq!(patch.font_weight, Some(FontWeight::Bold));
    assert_eq!(patch.font_family, Some(FontFamily::TimesNewRoman));
    assert_eq!(patch.fields(), vec!["fontSize", "fontWeight", "fontFamily"]);
}

#[test]
fn unknown_font_weight_is_rejected() {
    let update = LayerUpdate { font_weight: Some(450), ..Default::default() };
    assert!(matches!(
        update.into_patch(),
        Err(MutationError::Patch(PatchError::InvalidValue { field: "fontWeight", .. }))
    ));
}

#[test]
fn update_deserializes_camel_case() {
    let update: LayerUpdate = serde_json::from_str(r##"{"cornerRadius": 20, "fontSize": 12, "fill": "#000000"}"##).unwrap();
    assert_eq!(update.corner_radius, Some(20.0));
    assert_eq!(update.font_size, Some(12.0));
    assert_eq!(update.fill.as_deref(), Some("#000000"));
}

// =============================================================
// validate
// =============================================================

#[test]
fn corner_radius_on_text_is_a_variant_mismatch() {
    let layer = Layer::text(0.0, 0.0, 10.0, 10.0, "t");
    let patch = LayerPatch { corner_radius: Some(4.0), ..Default::default() };
    assert_eq!(
        patch.validate(&layer),
        Err(PatchError::VariantFieldMismatch { field: "cornerRadius", kind: "text" })
    );
}

#[test]
fn text_fields_on_shapes_are_variant_mismatches() {
    let ellipse = Layer::ellipse(0.0, 0.0, 1.0, 1.0);
    let patch = LayerPatch { font_weight: Some(FontWeight::Bold), ..Default::default() };
    assert_eq!(
        patch.validate(&ellipse),
        Err(PatchError::VariantFieldMismatch { field: "fontWeight", kind: "ellipse" })
    );

    let patch = LayerPatch { text: Some("x".into()), ..Default::default() };
    assert!(matches!(patch.validate(&rect()), Err(PatchError::VariantFieldMismatch { field: "text", .. })));
}

#[test]
fn path_size_is_not_editable() {
    let path = Layer::path(0.0, 0.0, vec![[4.0, 4.0]]);
    let patch = LayerPatch { height: Some(3.0), ..Default::default() };
    assert_eq!(patch.validate(&path), Err(PatchError::VariantFieldMismatch { field: "height", kind: "path" }));

    let patch = LayerPatch { x: Some(3.0), opacity: Some(40), ..Default::default() };
    assert!(patch.validate(&path).is_ok());
}

#[test]
fn out_of_domain_values_are_rejected() {
    let layer = rect();
    let cases = [
        LayerPatch { opacity: Some(101), ..Default::default() },
        LayerPatch { width: Some(-1.0), ..Default::default() },
        LayerPatch { corner_radius: Some(-0.5), ..Default::default() },
        LayerPatch { corner_radius: Some(500.0), ..Default::default() },
        LayerPatch { corner_radius: Some(f64::NAN), ..Default::default() },
        LayerPatch { x: Some(f64::INFINITY), ..Default::default() },
    ];
    for patch in cases {
        assert!(matches!(patch.validate(&layer), Err(PatchError::InvalidValue { .. })), "{patch:?}");
    }

    let at_limit = LayerPatch { corner_radius: Some(100.0), opacity: Some(100), ..Default::default() };
    assert_eq!(at_limit.validate(&layer), Ok(()));

    let text = Layer::text(0.0, 0.0, 1.0, 1.0, "");
    let patch = LayerPatch { font_size: Some(0.0), ..Default::default() };
    assert!(matches!(patch.validate(&text), Err(PatchError::InvalidValue { field: "fontSize", .. })));
}

// =============================================================
// apply
// =============================================================

#[test]
fn apply_writes_only_present_fields() {
    let mut layer = rect();
    let patch = LayerPatch { corner_radius: Some(20.0), ..Default::default() };
    patch.validate(&layer).unwrap();
    patch.apply(&mut layer);

    let mut expected = rect();
    if let LayerKind::Rectangle(r) = &mut expected.kind {
        r.corner_radius = 20.0;
    }
    assert_eq!(layer, expected);
}

#[test]
fn apply_is_idempotent() {
    let patch = LayerPatch {
        x: Some(3.0),
        fill: Some(Rgb::new(1, 1, 1)),
        width: Some(50.0),
        ..Default::default()
    };
    let mut once = rect();
    patch.apply(&mut once);
    let mut twice = once.clone();
    patch.apply(&mut twice);
    assert_eq!(once, twice);
}

#[test]
fn apply_updates_text_variant_fields() {
    let mut layer = Layer::text(0.0, 0.0, 10.0, 10.0, "old");
    let patch = LayerPatch {
        text: Some("new".into()),
        font_size: Some(32.0),
        font_family: Some(FontFamily::Arial),
        height: Some(40.0),
        ..Default::default()
    };
    patch.validate(&layer).unwrap();
    patch.apply(&mut layer);

    let LayerKind::Text(TextLayer { text, font_size, font_family, height, width, font_weight }) = &layer.kind else {
        panic!("expected text");
    };
    assert_eq!(text, "new");
    assert_eq!(*font_size, 32.0);
    assert_eq!(*font_family, FontFamily::Arial);
    assert_eq!(*height, 40.0);
    assert_eq!(*width, 10.0);
    assert_eq!(*font_weight, FontWeight::Regular);
}
