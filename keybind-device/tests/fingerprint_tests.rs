use keybind_device::{DeviceAttributes, DeviceFingerprint, FINGERPRINT_HEX_LEN};
use proptest::prelude::*;

fn pixel() -> DeviceAttributes {
    DeviceAttributes {
        os_name: "linux".into(),
        os_arch: "aarch64".into(),
        os_version: "5.10.198-android13".into(),
        cpu_count: 8,
        board: "oriole".into(),
        brand: "google".into(),
        device: "oriole".into(),
        hardware: "oriole".into(),
        model: "Pixel 6".into(),
        product: "oriole".into(),
    }
}

#[test]
fn fingerprint_is_32_uppercase_hex() {
    let fp = DeviceFingerprint::from_attributes(&pixel());
    assert_eq!(fp.id().len(), FINGERPRINT_HEX_LEN);
    assert!(fp.id().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    assert!(fp.id().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn identical_attributes_identical_fingerprint() {
    let a = DeviceFingerprint::from_attributes(&pixel());
    let b = DeviceFingerprint::from_attributes(&pixel());
    assert_eq!(a, b);
}

#[test]
fn each_attribute_contributes() {
    let base = DeviceFingerprint::from_attributes(&pixel());
    let variants: Vec<DeviceAttributes> = vec![
        DeviceAttributes { os_name: "android".into(), ..pixel() },
        DeviceAttributes { os_arch: "x86_64".into(), ..pixel() },
        DeviceAttributes { os_version: "6.1".into(), ..pixel() },
        DeviceAttributes { cpu_count: 4, ..pixel() },
        DeviceAttributes { board: "raven".into(), ..pixel() },
        DeviceAttributes { brand: "samsung".into(), ..pixel() },
        DeviceAttributes { device: "raven".into(), ..pixel() },
        DeviceAttributes { hardware: "tensor".into(), ..pixel() },
        DeviceAttributes { model: "Pixel 6 Pro".into(), ..pixel() },
        DeviceAttributes { product: "raven".into(), ..pixel() },
    ];
    for v in variants {
        assert_ne!(DeviceFingerprint::from_attributes(&v), base, "{v:?}");
    }
}

#[test]
fn field_boundaries_are_not_ambiguous() {
    let a = DeviceAttributes { board: "ab".into(), brand: "c".into(), ..pixel() };
    let b = DeviceAttributes { board: "a".into(), brand: "bc".into(), ..pixel() };
    assert_ne!(
        DeviceFingerprint::from_attributes(&a),
        DeviceFingerprint::from_attributes(&b)
    );
}

#[test]
fn missing_attributes_still_produce_fingerprint() {
    let bare = DeviceAttributes {
        os_name: String::new(),
        os_arch: String::new(),
        os_version: String::new(),
        cpu_count: 0,
        board: String::new(),
        brand: String::new(),
        device: String::new(),
        hardware: String::new(),
        model: String::new(),
        product: String::new(),
    };
    assert_eq!(bare.hardware_fields_present(), 0);
    let fp = DeviceFingerprint::from_attributes(&bare);
    assert_eq!(fp.id().len(), FINGERPRINT_HEX_LEN);
}

#[test]
fn components_follow_documented_order() {
    let c = pixel().components();
    assert_eq!(c[0], "linux");
    assert_eq!(c[1], "aarch64");
    assert_eq!(c[2], "5.10.198-android13");
    assert_eq!(c[3], "8");
    assert_eq!(c[4], "oriole");
    assert_eq!(c[5], "google");
    assert_eq!(c[8], "Pixel 6");
}

#[test]
fn generate_is_stable_on_this_host() {
    let fp1 = DeviceFingerprint::generate();
    let fp2 = DeviceFingerprint::generate();
    assert_eq!(fp1, fp2);
    assert!(fp1.matches_current());
}

#[test]
fn collect_reports_os_and_arch() {
    let info = DeviceAttributes::collect();
    assert_eq!(info.os_name, std::env::consts::OS);
    assert_eq!(info.os_arch, std::env::consts::ARCH);
}

// ── parse / encoding ─────────────────────────────────────────────

#[test]
fn parse_roundtrip() {
    let fp = DeviceFingerprint::from_attributes(&pixel());
    assert_eq!(DeviceFingerprint::parse(fp.id()), Some(fp.clone()));
    assert_eq!(DeviceFingerprint::parse(&fp.id().to_lowercase()), Some(fp));
}

#[test]
fn parse_rejects_bad_input() {
    assert!(DeviceFingerprint::parse("").is_none());
    assert!(DeviceFingerprint::parse("ABC").is_none());
    assert!(DeviceFingerprint::parse(&"G".repeat(32)).is_none());
    assert!(DeviceFingerprint::parse(&"A".repeat(33)).is_none());
}

#[test]
fn to_bytes_matches_hex() {
    let fp = DeviceFingerprint::parse("00112233445566778899AABBCCDDEEFF").unwrap();
    assert_eq!(
        fp.to_bytes(),
        [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
    );
    assert_eq!(fp.short(), "00112233");
    assert_eq!(fp.to_string(), "00112233445566778899AABBCCDDEEFF");
}

#[test]
fn serde_uses_plain_string() {
    let fp = DeviceFingerprint::from_attributes(&pixel());
    let json = serde_json::to_string(&fp).unwrap();
    assert_eq!(json, format!("\"{}\"", fp.id()));
    let parsed: DeviceFingerprint = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, fp);
    assert!(serde_json::from_str::<DeviceFingerprint>("\"nope\"").is_err());
}

proptest! {
    #[test]
    fn deterministic_for_any_attributes(
        os in ".{0,16}", board in ".{0,16}", model in ".{0,32}", cpus in 0usize..256,
    ) {
        let attrs = DeviceAttributes {
            os_name: os,
            board,
            model,
            cpu_count: cpus,
            ..pixel()
        };
        let a = DeviceFingerprint::from_attributes(&attrs);
        let b = DeviceFingerprint::from_attributes(&attrs.clone());
        prop_assert_eq!(a.id().len(), FINGERPRINT_HEX_LEN);
        prop_assert_eq!(a, b);
    }
}
