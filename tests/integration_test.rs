//! End-to-end quoting tests
//!
//! These tests generate model files in memory and run the complete pipeline:
//! decoding, volume, estimate, price and rounding.

mod common;

use common::{ascii_stl, binary_stl, cube_mesh, cube_model_xml, cube_obj, threemf_package};
use printquote::{
    DeliveryMode, Error, Material, PreparedModel, PrintSettings, QuoteConfig, SpeedClass, Vertex,
    VolumeSource, compute_volume, estimate_file, estimate_print, estimate_print_with_config,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn scenario_settings() -> PrintSettings {
    PrintSettings::new()
        .with_material(Material::Pla)
        .with_infill_percent(25.0)
        .with_layer_height(0.2)
        .with_quantity(1)
        .with_speed(SpeedClass::Regular)
        .with_delivery(DeliveryMode::Pickup)
}

#[test]
fn test_cube_stl_scenario() {
    let stl = binary_stl(&cube_mesh(10.0, Vertex::default()));
    let quote = estimate_print("cube.stl", &stl, &scenario_settings()).unwrap();

    assert_eq!(quote.volume_cm3, 1.0);
    assert_eq!(quote.volume_source, VolumeSource::Mesh);
    assert!(quote.filament_grams > 0.0);
    assert!(quote.filament_meters > 0.0);
    assert!(quote.estimated_minutes >= 1.0);
    assert!(quote.price.manufacturing >= 10.0);
    assert_eq!(quote.price.delivery, 0.0);
    assert_eq!(quote.price.total, quote.price.manufacturing);
}

#[test]
fn test_all_formats_agree_on_cube_volume() {
    let mesh = cube_mesh(10.0, Vertex::default());
    let files: Vec<(&str, Vec<u8>)> = vec![
        ("cube.stl", binary_stl(&mesh)),
        ("cube_ascii.stl", ascii_stl(&mesh)),
        ("cube.obj", cube_obj(10.0)),
        (
            "cube.3mf",
            threemf_package(&cube_model_xml(10.0, "millimeter", 1.0, "")),
        ),
    ];

    for (name, data) in &files {
        let volume = compute_volume(name, data).unwrap();
        assert!((volume - 1.0).abs() < 1e-9, "{}: {}", name, volume);
    }

    let quotes: Vec<_> = files
        .iter()
        .map(|(name, data)| estimate_print(name, data, &scenario_settings()).unwrap())
        .collect();
    for quote in &quotes[1..] {
        assert_eq!(quote, &quotes[0]);
    }
}

#[test]
fn test_far_from_origin_cube() {
    let mesh = cube_mesh(10.0, Vertex::new(1.0e5, -2.0e5, 3.0e5));
    let stl = ascii_stl(&mesh);
    let volume = compute_volume("far.stl", &stl).unwrap();
    assert!((volume - 1.0).abs() < 1e-6);
}

#[test]
fn test_quantity_ten_discount() {
    // A 40 mm cube is well above the minimum charge
    let stl = binary_stl(&cube_mesh(40.0, Vertex::default()));
    let one = estimate_print("big.stl", &stl, &scenario_settings()).unwrap();
    let ten = estimate_print("big.stl", &stl, &scenario_settings().with_quantity(10)).unwrap();

    assert!(one.price.manufacturing > 10.0);
    let expected = one.price.manufacturing * 10.0 * 0.85;
    assert!((ten.price.manufacturing - expected).abs() < 0.06);
    assert!((ten.filament_grams - one.filament_grams * 10.0).abs() < 0.6);
}

#[test]
fn test_speed_classes_order_prices() {
    let stl = binary_stl(&cube_mesh(40.0, Vertex::default()));
    let price = |speed| {
        estimate_print("big.stl", &stl, &scenario_settings().with_speed(speed))
            .unwrap()
            .price
            .manufacturing
    };
    let regular = price(SpeedClass::Regular);
    let fast = price(SpeedClass::Fast);
    let instant = price(SpeedClass::Instant);
    assert!(regular < fast && fast < instant);
}

#[test]
fn test_delivery_twenty_km() {
    let stl = binary_stl(&cube_mesh(10.0, Vertex::default()));
    let settings = scenario_settings().with_delivery(DeliveryMode::delivery(20.0));
    let quote = estimate_print("cube.stl", &stl, &settings).unwrap();
    assert_eq!(quote.price.delivery, 25.0);
    assert!((quote.price.total - (quote.price.manufacturing + 25.0)).abs() < 1e-9);
}

#[test]
fn test_corrupt_files_still_quote() {
    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("short.stl", vec![1, 2, 3]),
        ("empty.obj", b"# no vertices\n".to_vec()),
        ("notzip.3mf", b"PK but not really a zip".to_vec()),
    ];

    for (name, data) in &cases {
        let quote = estimate_print(name, data, &scenario_settings()).unwrap();
        assert!(quote.is_fallback(), "{} should use the fallback", name);
        assert_eq!(quote.volume_cm3, 0.1);
        assert!(quote.price.total >= 10.0);
    }
}

#[test]
fn test_strict_volume_reports_parse_errors() {
    assert!(matches!(
        compute_volume("short.stl", &[0u8; 10]),
        Err(Error::InvalidFormat(_))
    ));
    assert!(matches!(
        compute_volume("empty.obj", b""),
        Err(Error::NoGeometryData(_))
    ));
    assert!(matches!(
        compute_volume("part.iges", b"anything"),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn test_caller_errors_are_not_masked() {
    let stl = binary_stl(&cube_mesh(10.0, Vertex::default()));

    let err = estimate_print("cube.dwg", &stl, &scenario_settings()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));

    let err = estimate_print("cube.stl", &stl, &scenario_settings().with_infill_percent(120.0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSettings(_)));

    let err = estimate_print(
        "cube.stl",
        &stl,
        &scenario_settings().with_delivery(DeliveryMode::delivery(-3.0)),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidSettings(_)));
}

#[test]
fn test_custom_config() {
    let stl = binary_stl(&cube_mesh(10.0, Vertex::default()));
    let config = QuoteConfig::new().with_minimum_charge(25.0);
    let quote = estimate_print_with_config("cube.stl", &stl, &scenario_settings(), &config).unwrap();
    assert_eq!(quote.price.manufacturing, 25.0);
}

#[test]
fn test_prepared_model_reuse() {
    let stl = binary_stl(&cube_mesh(20.0, Vertex::default()));
    let model = PreparedModel::from_bytes("cube.stl", &stl).unwrap();
    assert_eq!(model.triangle_count(), 12);
    assert_eq!(model.volume_source(), VolumeSource::Mesh);

    for quantity in [1, 3, 5, 10, 25] {
        let settings = scenario_settings().with_quantity(quantity);
        assert_eq!(
            model.estimate(&settings).unwrap(),
            estimate_print("cube.stl", &stl, &settings).unwrap()
        );
    }
}

#[test]
fn test_estimate_file_reads_path() {
    let mut file = NamedTempFile::with_suffix(".stl").unwrap();
    file.write_all(&binary_stl(&cube_mesh(10.0, Vertex::default())))
        .unwrap();
    file.flush().unwrap();

    let quote = estimate_file(file.path(), &scenario_settings()).unwrap();
    assert_eq!(quote.volume_cm3, 1.0);

    let err = estimate_file("/nonexistent/dir/part.stl", &scenario_settings()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
