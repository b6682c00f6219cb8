#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

// =============================================================
// LayerType
// =============================================================

#[test]
fn layer_type_matches_variant() {
    assert_eq!(Layer::rectangle(0.0, 0.0, 1.0, 1.0).layer_type(), LayerType::Rectangle);
    assert_eq!(Layer::ellipse(0.0, 0.0, 1.0, 1.0).layer_type(), LayerType::Ellipse);
    assert_eq!(Layer::path(0.0, 0.0, vec![[1.0, 1.0]]).layer_type(), LayerType::Path);
    assert_eq!(Layer::text(0.0, 0.0, 1.0, 1.0, "hi").layer_type(), LayerType::Text);
}

#[test]
fn layer_type_display_is_lowercase() {
    assert_eq!(LayerType::Rectangle.to_string(), "rectangle");
    assert_eq!(LayerType::Text.as_str(), "text");
}

// =============================================================
// Constructors
// =============================================================

#[test]
fn rectangle_defaults() {
    let layer = Layer::rectangle(1.0, 2.0, 10.0, 20.0);
    assert_eq!(layer.opacity, 100);
    assert!(layer.fill.is_none());
    assert!(layer.stroke.is_none());
    let LayerKind::Rectangle(rect) = &layer.kind else {
        panic!("expected rectangle");
    };
    assert_eq!(rect.corner_radius, 0.0);
}

#[test]
fn text_defaults() {
    let layer = Layer::text(0.0, 0.0, 100.0, 24.0, "Title");
    let LayerKind::Text(text) = &layer.kind else {
        panic!("expected text");
    };
    assert_eq!(text.text, "Title");
    assert_eq!(text.font_size, DEFAULT_FONT_SIZE);
    assert_eq!(text.font_weight, FontWeight::Regular);
    assert_eq!(text.font_family, FontFamily::Inter);
}

#[test]
fn path_extent_follows_points() {
    let layer = Layer::path(5.0, 5.0, vec![[0.0, 0.0], [30.0, 4.0], [12.0, 18.0]]);
    let LayerKind::Path(path) = &layer.kind else {
        panic!("expected path");
    };
    assert_eq!((path.width, path.height), (30.0, 18.0));
    assert_eq!(layer.editable_size(), None);
}

#[test]
fn path_extent_spans_negative_points() {
    let layer = Layer::path(0.0, 0.0, vec![[-5.0, -5.0], [5.0, 5.0]]);
    let LayerKind::Path(path) = &layer.kind else {
        panic!("expected path");
    };
    assert_eq!((path.width, path.height), (10.0, 10.0));

    let empty = Layer::path(0.0, 0.0, Vec::new());
    let LayerKind::Path(path) = &empty.kind else {
        panic!("expected path");
    };
    assert_eq!((path.width, path.height), (0.0, 0.0));
}

#[test]
fn sync_extent_overrides_deserialized_path_size() {
    let mut layer: Layer = serde_json::from_value(serde_json::json!({
        "type": "path", "x": 0, "y": 0, "opacity": 100,
        "width": 999, "height": 1, "points": [[2, 3], [8, -1]]
    }))
    .unwrap();
    layer.sync_extent();
    let LayerKind::Path(path) = &layer.kind else {
        panic!("expected path");
    };
    assert_eq!((path.width, path.height), (6.0, 4.0));
}

#[test]
fn path_size_is_optional_on_the_wire() {
    let layer: Layer =
        serde_json::from_value(serde_json::json!({"type": "path", "x": 0, "y": 0, "opacity": 50, "points": []}))
            .unwrap();
    assert_eq!(layer.layer_type(), LayerType::Path);
}

#[test]
fn validate_accepts_constructed_layers() {
    assert_eq!(Layer::rectangle(0.0, 0.0, 10.0, 10.0).validate(), Ok(()));
    assert_eq!(Layer::ellipse(-4.0, 2.0, 0.0, 1.0).validate(), Ok(()));
    assert_eq!(Layer::path(0.0, 0.0, vec![[1.0, 2.0]]).validate(), Ok(()));
    assert_eq!(Layer::text(0.0, 0.0, 10.0, 10.0, "t").validate(), Ok(()));
}

#[test]
fn validate_rejects_out_of_domain_fields() {
    let mut opaque = Layer::ellipse(0.0, 0.0, 1.0, 1.0);
    opaque.opacity = 250;

    let mut rounded = Layer::rectangle(0.0, 0.0, 1.0, 1.0);
    if let LayerKind::Rectangle(r) = &mut rounded.kind {
        r.corner_radius = -7.0;
    }

    let mut tiny = Layer::text(0.0, 0.0, 1.0, 1.0, "t");
    if let LayerKind::Text(t) = &mut tiny.kind {
        t.font_size = -3.0;
    }

    let cases = [
        (opaque, "opacity"),
        (Layer::rectangle(0.0, 0.0, -5.0, 1.0), "width"),
        (Layer::text(0.0, 0.0, 1.0, f64::NAN, "t"), "height"),
        (rounded, "cornerRadius"),
        (tiny, "fontSize"),
        (Layer::path(f64::INFINITY, 0.0, Vec::new()), "x"),
        (Layer::path(0.0, 0.0, vec![[f64::NAN, 0.0]]), "points"),
    ];
    for (layer, expected) in cases {
        match layer.validate() {
            Err(PatchError::InvalidValue { field, .. }) => assert_eq!(field, expected),
            other => panic!("{expected}: expected InvalidValue, got {other:?}"),
        }
    }
}

#[test]
fn editable_size_for_boxed_variants() {
    assert_eq!(Layer::ellipse(0.0, 0.0, 3.0, 4.0).editable_size(), Some((3.0, 4.0)));
    assert_eq!(Layer::text(0.0, 0.0, 5.0, 6.0, "").editable_size(), Some((5.0, 6.0)));
}

#[test]
fn builders_set_colors() {
    let layer = Layer::ellipse(0.0, 0.0, 1.0, 1.0)
        .with_fill(Rgb::new(1, 2, 3))
        .with_stroke(Rgb::new(4, 5, 6));
    assert_eq!(layer.fill, Some(Rgb::new(1, 2, 3)));
    assert_eq!(layer.stroke, Some(Rgb::new(4, 5, 6)));
}

// =============================================================
// Typography
// =============================================================

#[test]
fn font_weight_accepts_only_standard_steps() {
    for (raw, weight) in (1..=9u16).map(|i| i * 100).zip(FontWeight::ALL) {
        assert_eq!(FontWeight::try_from(raw).unwrap(), weight);
        assert_eq!(u16::from(weight), raw);
    }
    for raw in [0, 50, 150, 450, 1000] {
        assert!(matches!(FontWeight::try_from(raw), Err(PatchError::InvalidValue { field: "fontWeight", .. })));
    }
}

#[test]
fn font_weight_serializes_as_number() {
    assert_eq!(serde_json::to_value(FontWeight::Bold).unwrap(), json!(700));
    assert!(serde_json::from_value::<FontWeight>(json!(750)).is_err());
}

#[test]
fn font_family_parses_panel_options() {
    assert_eq!("Inter".parse::<FontFamily>().unwrap(), FontFamily::Inter);
    assert_eq!("Arial".parse::<FontFamily>().unwrap(), FontFamily::Arial);
    assert_eq!("Ariel".parse::<FontFamily>().unwrap(), FontFamily::Arial);
    assert_eq!("Times New Roman".parse::<FontFamily>().unwrap(), FontFamily::TimesNewRoman);
    assert!("Comic Sans".parse::<FontFamily>().is_err());
}

#[test]
fn font_family_serde_uses_display_names() {
    assert_eq!(serde_json::to_value(FontFamily::TimesNewRoman).unwrap(), json!("Times New Roman"));
    assert_eq!(serde_json::from_value::<FontFamily>(json!("Ariel")).unwrap(), FontFamily::Arial);
}

// =============================================================
// Serde
// =============================================================

#[test]
fn rectangle_json_shape() {
    let layer = Layer::rectangle(0.0, 0.0, 10.0, 10.0).with_fill(Rgb::new(30, 30, 30));
    let value = serde_json::to_value(&layer).unwrap();
    assert_eq!(value["type"], "rectangle");
    assert_eq!(value["cornerRadius"], 0.0);
    assert_eq!(value["fill"], json!({"r": 30, "g": 30, "b": 30}));
    assert!(value.get("stroke").is_none());
}

#[test]
fn text_layer_serde_roundtrip() {
    let layer = Layer::text(1.5, 2.5, 80.0, 20.0, "hello").with_stroke(Rgb::new(9, 9, 9));
    let json = serde_json::to_string(&layer).unwrap();
    let back: Layer = serde_json::from_str(&json).unwrap();
    assert_eq!(back, layer);
}

#[test]
fn deserialize_rectangle_without_corner_radius_defaults_to_zero() {
    let value = json!({"type": "rectangle", "x": 0.5, "y": 0.5, "width": 4.5, "height": 2.5, "opacity": 50});
    let layer: Layer = serde_json::from_value(value).unwrap();
    assert_eq!(layer.opacity, 50);
    let LayerKind::Rectangle(rect) = layer.kind else {
        panic!("expected rectangle");
    };
    assert_eq!(rect.corner_radius, 0.0);
}

#[test]
fn deserialize_unknown_type_rejects() {
    let value = json!({"type": "hexagon", "x": 0.5, "y": 0.5, "opacity": 100});
    assert!(serde_json::from_value::<Layer>(value).is_err());
}
