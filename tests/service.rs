use barforge::advanced::AdvancedQrBuilder;
use barforge::types::{self, Category};
use barforge::validate::{check_digit, validate};
use barforge::{BarcodeService, BatchItem, Error, RenderOptions, ValidationFailure};

#[test]
fn every_registered_type_has_sane_config() {
    for id in types::list_all() {
        assert!(types::is_valid(id));
        let config = types::config_for(id);
        assert!(config.min_length <= config.max_length, "{id}");
    }
    assert!(!types::is_valid("made-up"));
    let fallback = types::config_for("made-up");
    assert_eq!((fallback.min_length, fallback.max_length, fallback.charset), (1, 100, "Unknown"));
}

#[test]
fn categories_partition_the_registry() {
    let total: usize = Category::ALL
        .iter()
        .map(|c| types::list_by_category(*c).len())
        .sum();
    assert_eq!(total, types::list_all().len());
}

#[test]
fn validation_examples() {
    assert!(validate("1234567890128", "ean13").valid);

    let wrong = validate("1234567890120", "ean13");
    assert!(!wrong.valid);
    assert!(matches!(wrong.error, Some(ValidationFailure::Checksum { .. })));

    assert_eq!(validate("", "code128").error, Some(ValidationFailure::InvalidInput));
    assert!(matches!(
        validate("123", "ean13").error,
        Some(ValidationFailure::Length { length: 3, min: 12, .. })
    ));
    assert_eq!(check_digit("123456789012"), Some(8));
}

#[test]
fn every_backend_is_deterministic() {
    let service = BarcodeService::new();
    let options = RenderOptions::new().extra("id", "fixed-id");
    for symbology in ["code128", "ean13", "qrcode"] {
        for format in service.render_formats() {
            let a = service.generate("590123412345", symbology, format, &options).unwrap();
            let b = service.generate("590123412345", symbology, format, &options).unwrap();
            assert_eq!(a, b, "{symbology} as {format}");
        }
    }
}

#[test]
fn markup_backends_fall_back_for_unencodable_types() {
    let service = BarcodeService::new();
    let options = RenderOptions::new().extra("id", "fixed-id");
    for format in ["svg", "html", "pdf"] {
        let a = service.generate("HELLO", "datamatrix", format, &options).unwrap();
        let b = service.generate("HELLO", "datamatrix", format, &options).unwrap();
        assert_eq!(a, b, "datamatrix as {format}");
    }
    let svg = service.svg("HELLO", "datamatrix", &options).unwrap();
    assert!(svg.as_text().unwrap().contains("data-placeholder=\"true\""));
}

#[test]
fn raster_backend_rejects_unencodable_types() {
    let err = BarcodeService::new()
        .png("HELLO", "code93", &RenderOptions::new())
        .unwrap_err();
    assert!(matches!(err, Error::Render { backend: "png", .. }));
    assert!(err.to_string().starts_with("png rendering failed: "));
}

#[test]
fn batch_keeps_order_and_isolates_failures() {
    let items = vec![
        BatchItem::new("1234567890", "code128", "png"),
        BatchItem::new("", "code128", "png"),
        BatchItem::new("HELLO", "code39", "svg"),
    ];
    let results = BarcodeService::new().batch(&items);
    let summary: Vec<(usize, bool)> = results.iter().map(|r| (r.index, r.is_success())).collect();
    assert_eq!(summary, vec![(0, true), (1, false), (2, true)]);
}

#[test]
fn advanced_builder_survives_missing_logo() {
    let qr = AdvancedQrBuilder::new("https://example.com")
        .size(180)
        .logo("does/not/exist.png")
        .watermark("missing/mark.png")
        .build();
    let img = image::load_from_memory(qr.generate().unwrap()).unwrap();
    assert_eq!((img.width(), img.height()), (180, 180));
}

#[test]
fn non_ascii_digits_never_reach_a_backend() {
    let service = BarcodeService::new();
    let arabic = "\u{0661}".repeat(13);
    assert!(!validate(&arabic, "ean13").valid);
    assert!(matches!(
        service.png(&arabic, "ean13", &RenderOptions::new()),
        Err(Error::Validation(ValidationFailure::Charset { .. }))
    ));
    assert!(!validate("12345678901\u{0662}", "ean13").valid);
}

#[test]
fn mixed_code128_payload_renders_genuinely() {
    let service = BarcodeService::new();
    assert!(validate("ab\tc", "code128").valid);
    assert!(service.png("ab\tc", "code128", &RenderOptions::new()).is_ok());
    let svg = service.svg("ab\tc", "code128", &RenderOptions::new()).unwrap();
    assert!(!svg.as_text().unwrap().contains("data-placeholder"));
}

#[test]
fn batch_with_extreme_options_reports_errors() {
    let items: Vec<BatchItem> = serde_json::from_str(
        r#"[{"data": "HELLO", "type": "code128", "format": "png", "options": {"margin": 4294967295}},
            {"data": "HELLO", "type": "code128", "format": "pdf", "options": {"width": 4294967295}},
            {"data": "HELLO", "type": "code128", "format": "svg"}]"#,
    )
    .unwrap();
    let results = BarcodeService::new().batch(&items);
    assert!(matches!(results[0].error(), Some(Error::Render { backend: "png", .. })));
    assert!(matches!(results[1].error(), Some(Error::Render { backend: "pdf", .. })));
    assert!(results[2].is_success());
}
