use std::io::Write;

use rust_carousel::config::{CarouselOptions, Configuration, KeyboardScope, TransitionKind};

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
defaults:
  autoplay: false
  autoplay-interval-ms: 2500
  transition-duration-ms: 250
  transition: fade
  show-indicators: false
  keyboard-scope: hovered
containers:
  - name: hero
    slides: ["Welcome", "Features"]
    counter: true
    attributes:
      carousel: ""
      transition: zoom
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let d = &cfg.defaults;
    assert!(!d.autoplay);
    assert_eq!(d.autoplay_interval_ms, 2500);
    assert_eq!(d.transition_duration_ms, 250);
    assert_eq!(d.transition, TransitionKind::Fade);
    assert!(!d.show_indicators);
    assert!(d.show_controls);
    assert_eq!(d.keyboard_scope, KeyboardScope::Hovered);

    let hero = &cfg.containers[0];
    assert_eq!(hero.name, "hero");
    assert_eq!(hero.slides.as_deref().map(<[String]>::len), Some(2));
    assert!(hero.counter);
    assert_eq!(hero.attributes.get("transition").map(String::as_str), Some("zoom"));
}

#[test]
fn empty_document_uses_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.defaults, CarouselOptions::default());
    assert!(cfg.containers.is_empty());
}

#[test]
fn container_without_slides_has_no_root() {
    let yaml = r#"
containers:
  - name: ghost
    attributes: { carousel: "" }
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.containers[0].slides.is_none());
    assert!(!cfg.containers[0].counter);
}

#[test]
fn unknown_transition_is_rejected() {
    let yaml = r#"
defaults:
  transition: spin
"#;
    let err = serde_yaml::from_str::<Configuration>(yaml).unwrap_err();
    assert!(err.to_string().contains("spin"));
}

#[test]
fn unknown_keyboard_scope_is_rejected() {
    let yaml = r#"
defaults:
  keyboard-scope: focused
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn validation_rejects_zero_autoplay_interval() {
    let yaml = r#"
defaults:
  autoplay-interval-ms: 0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("autoplay-interval-ms"));
}

#[test]
fn validation_rejects_duplicate_names() {
    let yaml = r#"
containers:
  - name: hero
    slides: ["a"]
  - name: hero
    slides: ["b"]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("duplicate container name 'hero'"));
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "containers:\n  - name: gallery\n    slides: [one, two, three]\n    attributes: {{ carousel: \"\" }}"
    )
    .unwrap();
    let cfg = Configuration::from_yaml_file(file.path())
        .unwrap()
        .validated()
        .unwrap();
    assert_eq!(cfg.containers.len(), 1);
    assert_eq!(cfg.containers[0].slides.as_ref().unwrap()[2], "three");
}
