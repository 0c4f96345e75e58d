use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ColorWalkError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        ColorWalkError::invalid_image("x")
            .to_string()
            .contains("invalid image:")
    );
    assert!(
        ColorWalkError::composition("x")
            .to_string()
            .contains("composition error:")
    );
    assert!(
        ColorWalkError::export("x")
            .to_string()
            .contains("export error:")
    );
    assert!(
        ColorWalkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn file_too_large_reports_size_and_limit() {
    let err = ColorWalkError::FileTooLarge {
        size: 20,
        limit: 10,
    };
    let msg = err.to_string();
    assert!(msg.contains("20 bytes"));
    assert!(msg.contains("10 byte limit"));
}

#[test]
fn only_decode_and_geometry_errors_are_recovered_per_cell() {
    assert!(ColorWalkError::decode("x").is_recoverable_in_cell());
    assert!(ColorWalkError::invalid_image("x").is_recoverable_in_cell());
    assert!(!ColorWalkError::EmptyGrid.is_recoverable_in_cell());
    assert!(!ColorWalkError::composition("x").is_recoverable_in_cell());
    assert!(!ColorWalkError::export("x").is_recoverable_in_cell());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ColorWalkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
