//! Public API tests for settings snapshots and the render pipeline.

use std::sync::Arc;

use qrbolt_business::{
    EMPTY_MESSAGE, ErrorLevel, MARGIN_RANGE, QrCodeEncoder, RenderPipeline, RenderResult,
    SIZE_RANGE, SettingChange, Settings, SettingsStore, TEXT_MAX_CHARS, normalize_text,
};

mod settings_store_tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let store = SettingsStore::default();
        let settings = store.snapshot();

        assert_eq!(settings.text, "");
        assert_eq!(settings.size, 320);
        assert_eq!(settings.margin, 2);
        assert_eq!(settings.level, ErrorLevel::M);
        assert!(!settings.inverted);
        assert!(!settings.has_content());
    }

    #[test]
    fn test_update_replaces_only_named_field() {
        let mut store = SettingsStore::default();
        let before = store.snapshot();

        let after = store.update(SettingChange::Level(ErrorLevel::H));

        assert_eq!(after.level, ErrorLevel::H);
        assert_eq!(after.size, before.size);
        assert_eq!(after.margin, before.margin);
        assert_eq!(before.level, ErrorLevel::M);
        assert!(store.version() > 0);
    }

    #[test]
    fn test_numeric_fields_clamp_into_range() {
        let mut store = SettingsStore::default();

        assert_eq!(store.update(SettingChange::Size(1000)).size, *SIZE_RANGE.end());
        assert_eq!(store.update(SettingChange::Size(0)).size, *SIZE_RANGE.start());
        assert_eq!(store.update(SettingChange::Margin(-5)).margin, 0);
        assert_eq!(
            store.update(SettingChange::Margin(i64::MAX)).margin,
            *MARGIN_RANGE.end()
        );
    }

    #[test]
    fn test_retyped_prefix_is_stripped_again() {
        let mut store = SettingsStore::default();
        let stored = store.update(SettingChange::Text("https://example.com".to_owned()));
        assert_eq!(stored.text, "example.com");

        // The user types the protocol back in front of the stored text.
        let retyped = format!("https://{}", stored.text);
        let after = store.update(SettingChange::Text(retyped));

        assert_eq!(after.text, "example.com");
        assert_eq!(store.snapshot().text, "example.com");
    }

    #[test]
    fn test_subscriber_sees_latest_snapshot() {
        let mut store = SettingsStore::default();
        let mut reader = store.subscribe();

        store.update(SettingChange::Text("one".to_owned()));
        store.update(SettingChange::Text("two".to_owned()));

        assert_eq!(reader.read().map(|s| s.text.clone()), Some("two".to_owned()));
    }
}

mod text_normalization_tests {
    use super::*;

    #[test]
    fn test_strips_single_leading_protocol() {
        assert_eq!(normalize_text("https://example.com"), "example.com");
        assert_eq!(normalize_text("HTTP://example.com"), "example.com");
        assert_eq!(normalize_text("  https://a.b"), "a.b");
        assert_eq!(normalize_text("https://https://x"), "https://x");
    }

    #[test]
    fn test_keeps_text_without_protocol() {
        assert_eq!(normalize_text("mailto:me@example.com"), "mailto:me@example.com");
        assert_eq!(normalize_text("see https://x"), "see https://x");
    }

    #[test]
    fn test_limits_length_in_characters() {
        let long = "é".repeat(TEXT_MAX_CHARS + 10);
        assert_eq!(normalize_text(&long).chars().count(), TEXT_MAX_CHARS);
    }
}

mod error_level_tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("q".parse::<ErrorLevel>(), Ok(ErrorLevel::Q));
        assert_eq!(" H ".parse::<ErrorLevel>(), Ok(ErrorLevel::H));
        assert!("X".parse::<ErrorLevel>().is_err());
    }

    #[test]
    fn test_levels_are_ordered_by_redundancy() {
        assert!(ErrorLevel::L < ErrorLevel::M);
        assert!(ErrorLevel::M < ErrorLevel::Q);
        assert!(ErrorLevel::Q < ErrorLevel::H);
    }
}

mod render_pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_text_is_empty_without_encoding() {
        let mut pipeline = RenderPipeline::new(Arc::new(QrCodeEncoder));
        let settings = Settings::default().apply(SettingChange::Text("   ".to_owned()));

        pipeline.schedule(&settings);

        assert_eq!(*pipeline.result(), RenderResult::Empty);
        assert_eq!(pipeline.result().message(), Some(EMPTY_MESSAGE));
        assert!(!pipeline.is_busy());
    }

    #[tokio::test]
    async fn test_real_encoder_produces_sized_png() {
        let mut pipeline = RenderPipeline::new(Arc::new(QrCodeEncoder));
        let settings = Settings::default()
            .apply(SettingChange::Text("hello".to_owned()))
            .apply(SettingChange::Size(400));

        pipeline.schedule(&settings);
        assert!(pipeline.result().is_pending());
        pipeline.settle().await;

        let result = pipeline.result();
        let artifact = result.artifact().expect("artifact is ready");
        assert_eq!((artifact.width(), artifact.height()), (400, 400));
        assert!(artifact.data_url().starts_with("data:image/png;base64,"));
        assert!(artifact.png().starts_with(b"\x89PNG"));
    }
}
