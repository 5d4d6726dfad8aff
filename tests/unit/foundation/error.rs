use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PosterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PosterError::qr_code("x").to_string().contains("qr code error:"));
    assert!(PosterError::export("x").to_string().contains("export error:"));
    assert!(PosterError::plugin("x").to_string().contains("plugin error:"));
    assert!(
        PosterError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn unknown_template_names_the_template() {
    let err = PosterError::UnknownTemplate("badge".to_owned());
    assert_eq!(err.to_string(), "template \"badge\" is not registered");
}

#[test]
fn image_load_carries_source_and_reason() {
    let err = PosterError::image_load("logo.png", "not found");
    assert_eq!(err.to_string(), "failed to load image \"logo.png\": not found");
}

#[test]
fn json_errors_become_serde_errors() {
    let err: PosterError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, PosterError::Serde(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PosterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
