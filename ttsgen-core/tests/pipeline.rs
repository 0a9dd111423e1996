use std::time::Duration;

use ttsgen_core::{
    ai::mock::MockBehavior,
    catalog::VoiceCatalog,
    credentials::ExhaustionPolicy,
    error::DatagenError,
    labeling::{Gender, GenderStrategy, MismatchPolicy},
    pipeline::{SamplePipeline, SampleRequest},
    settings::Settings,
};


use fixture::{caption_mentions, Fixture, KEYS};

const PLANTS: &str = "How do plants eat sunlight?";

#[tokio::test]
async fn test_generates_one_complete_sample() {
    let mut fixture = Fixture::new();

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap()
        .expect("sample should be produced");

    assert_eq!(record.topic, PLANTS);
    assert_eq!(
        record.text,
        "Plants catch sunlight in their leaves and turn it into sugar."
    );
    assert!(record.audio_file.starts_with("audio/sample_"));
    assert!(record.audio_file.ends_with(".wav"));
    assert!(fixture.output_path().join(&record.audio_file).is_file());

    let voice = VoiceCatalog::builtin()
        .find_voice(&record.voice_name)
        .cloned()
        .expect("voice comes from the catalog");
    assert_eq!(Some(record.gender), voice.gender);
    assert!(caption_mentions(&record.description, record.gender.as_str()));
    assert!(record.description.contains(&record.style));

    assert_eq!(fixture.records(), vec![record]);
    assert_eq!(fixture.audio_files().len(), 1);
    assert!(fixture.sleeper.get_slept().is_empty());
}

#[tokio::test]
async fn test_prompts_carry_topic_caption_and_text() {
    let mut fixture = Fixture::new();

    let record = fixture
        .pipeline
        .generate(
            SampleRequest::new(PLANTS)
                .with_voice("Kore")
                .with_style("cheerful"),
        )
        .await
        .unwrap()
        .unwrap();

    let prompts = fixture.text.get_captured_prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(PLANTS));
    assert!(prompts[0].contains("cheerful"));

    let synthesis = fixture.speech.get_captured();
    assert_eq!(synthesis.len(), 1);
    assert_eq!(synthesis[0].voice, "Kore");
    assert_eq!(
        synthesis[0].prompt,
        format!("{}: {}", record.description, record.text)
    );
    assert_eq!(record.gender, Gender::Female);
}

#[tokio::test]
async fn test_quota_failures_rotate_and_back_off() {
    let mut fixture = Fixture::new();
    fixture.text.set_behavior(MockBehavior::AlwaysQuotaError);

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.pipeline.rotator().cursor(), 3);
    assert_eq!(
        fixture.sleeper.get_slept(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );
    // One client per credential, the initial one plus one per rotation
    assert_eq!(fixture.services.get_issued_credentials(), KEYS[..4].to_vec());
    assert!(fixture.records().is_empty());
    assert!(fixture.audio_files().is_empty());
}

#[tokio::test]
async fn test_speech_quota_failure_also_rotates() {
    let mut fixture = Fixture::new();
    fixture
        .speech
        .set_behavior(MockBehavior::QuotaErrorThenSuccess { remaining_errors: 1 });

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(record.is_some());
    assert_eq!(fixture.pipeline.rotator().cursor(), 1);
    assert_eq!(fixture.sleeper.get_slept(), vec![Duration::from_secs(1)]);
    assert_eq!(fixture.records().len(), 1);
}

#[tokio::test]
async fn test_retryable_errors_keep_the_credential() {
    let mut fixture = Fixture::new();
    fixture
        .text
        .set_behavior(MockBehavior::RetryableErrorThenSuccess { remaining_errors: 2 });

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(record.is_some());
    assert_eq!(fixture.text.get_call_count(), 3);
    assert_eq!(fixture.pipeline.rotator().cursor(), 0);
    assert_eq!(fixture.pipeline.rotator().rotations(), 0);
    assert_eq!(
        fixture.sleeper.get_slept(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn test_fatal_exhaustion_aborts_generation() {
    let mut fixture =
        Fixture::with_settings_and_keys(Fixture::default_settings(), &KEYS[..2]);
    fixture.text.set_behavior(MockBehavior::AlwaysQuotaError);

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await;

    assert!(matches!(
        result,
        Err(DatagenError::CredentialsExhausted { tried: 2 })
    ));
    assert!(fixture.pipeline.rotator().is_exhausted());
    assert_eq!(fixture.sleeper.get_slept(), vec![Duration::from_secs(1)]);
    assert!(fixture.records().is_empty());
}

#[tokio::test]
async fn test_wrap_around_reuses_credentials() {
    let settings = Settings {
        exhaustion_policy: ExhaustionPolicy::WrapAround,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_settings_and_keys(settings, &KEYS[..2]);
    fixture.text.set_behavior(MockBehavior::AlwaysQuotaError);

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.pipeline.rotator().cursor(), 1);
    assert_eq!(
        fixture.services.get_issued_credentials(),
        vec![KEYS[0], KEYS[1], KEYS[0], KEYS[1]]
    );
}

#[tokio::test]
async fn test_terminal_errors_exhaust_attempts_without_rotation() {
    let mut fixture = Fixture::new();
    fixture
        .speech
        .set_behavior(MockBehavior::AlwaysNonRetryableError);

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.speech.get_call_count(), 3);
    assert_eq!(fixture.pipeline.rotator().rotations(), 0);
    assert!(fixture.audio_files().is_empty());
}

#[tokio::test]
async fn test_local_write_failure_is_retried_without_rotation() {
    let mut fixture = Fixture::with_output_dir_name("quota_429_run");
    let metadata_path = fixture.pipeline.store().path().to_path_buf();
    let _ = std::fs::remove_file(&metadata_path);
    std::fs::create_dir_all(&metadata_path).unwrap();

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.pipeline.rotator().rotations(), 0);
    assert_eq!(fixture.pipeline.rotator().cursor(), 0);
    assert_eq!(fixture.services.get_issued_credentials(), vec![KEYS[0]]);
    assert_eq!(fixture.text.get_call_count(), 3);
    assert_eq!(
        fixture.sleeper.get_slept(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4)
        ]
    );
}

#[tokio::test]
async fn test_non_canonical_sample_rate_is_rejected() {
    let mut fixture = Fixture::new();
    fixture.speech.set_sample_rate(16_000);

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.speech.get_call_count(), 3);
    assert_eq!(fixture.pipeline.rotator().rotations(), 0);
    assert!(fixture.audio_files().is_empty());
    assert!(fixture.records().is_empty());
}

#[tokio::test]
async fn test_unlisted_voice_is_skipped_under_static_label() {
    let mut fixture = Fixture::new();

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS).with_voice("Nobody"))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.text.get_call_count(), 0);
    assert!(fixture.sleeper.get_slept().is_empty());
}

#[tokio::test]
async fn test_static_label_never_consults_classifier() {
    let mut fixture = Fixture::new();

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS).with_voice("Kore"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.gender, Gender::Female);
    assert_eq!(fixture.classifier.get_call_count(), 0);
}

#[tokio::test]
async fn test_validated_mismatch_keeps_catalog_label_by_default() {
    let settings = Settings {
        gender_strategy: GenderStrategy::ValidatedStaticLabel,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_settings(settings);

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS).with_voice("Kore"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(fixture.classifier.get_call_count(), 1);
    assert_eq!(record.gender, Gender::Female);
    assert!(caption_mentions(&record.description, "female"));
}

#[tokio::test]
async fn test_validated_mismatch_can_prefer_classifier() {
    let settings = Settings {
        gender_strategy: GenderStrategy::ValidatedStaticLabel,
        mismatch_policy: MismatchPolicy::PreferClassifier,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_settings(settings);

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS).with_voice("Kore"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.gender, Gender::Male);
    assert!(caption_mentions(&record.description, "male"));
    assert!(!caption_mentions(&record.description, "female"));
}

#[tokio::test]
async fn test_validated_classifier_failure_keeps_catalog_label() {
    let settings = Settings {
        gender_strategy: GenderStrategy::ValidatedStaticLabel,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_settings(settings);
    fixture.classifier.set_label(None);

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS).with_voice("Puck"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.gender, Gender::Male);
    assert!(fixture.sleeper.get_slept().is_empty());
}

#[tokio::test]
async fn test_classifier_label_replaces_placeholder_caption() {
    let settings = Settings {
        gender_strategy: GenderStrategy::ClassifierDerivedLabel,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_settings(settings);
    fixture.classifier.set_label(Some(Gender::Female));

    let record = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS).with_voice("Puck"))
        .await
        .unwrap()
        .unwrap();

    let synthesis = fixture.speech.get_captured();
    assert!(caption_mentions(&synthesis[0].prompt, "person"));
    assert_eq!(record.gender, Gender::Female);
    assert!(caption_mentions(&record.description, "female"));
    assert!(!caption_mentions(&record.description, "person"));
}

#[tokio::test]
async fn test_classifier_failure_fails_attempts_but_keeps_audio() {
    let settings = Settings {
        gender_strategy: GenderStrategy::ClassifierDerivedLabel,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_settings(settings);
    fixture.classifier.set_label(None);

    let result = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(fixture.classifier.get_call_count(), 3);
    assert!(fixture.records().is_empty());
    // Audio from failed attempts is left in place
    assert_eq!(fixture.audio_files().len(), 3);
}

#[tokio::test]
async fn test_pitch_classifier_labels_synthesized_audio() {
    let settings = Settings {
        gender_strategy: GenderStrategy::ClassifierDerivedLabel,
        ..Fixture::default_settings()
    };
    let mut fixture = Fixture::with_pitch_classifier(settings);

    fixture.speech.set_tone_hz(220.0);
    let high = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(high.gender, Gender::Female);

    fixture.speech.set_tone_hz(110.0);
    let low = fixture
        .pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(low.gender, Gender::Male);
}

#[tokio::test]
async fn test_raw_audio_payload_is_persisted() {
    let output_dir = tempfile::tempdir().unwrap();
    let text = ttsgen_core::ai::mock::MockTextGenerator::new(MockBehavior::Success);
    let speech =
        ttsgen_core::voice::tts::mock::MockSpeechSynthesizer::new(MockBehavior::Success)
            .with_raw_payload();
    let mut pipeline = SamplePipeline::builder()
        .output_dir(output_dir.path())
        .settings(Fixture::default_settings())
        .credentials(KEYS)
        .services(ttsgen_core::services::MockServiceFactory::new(text, speech))
        .sleeper(ttsgen_core::pipeline::RecordingSleeper::new())
        .build()
        .unwrap();

    let record = pipeline
        .generate(SampleRequest::new(PLANTS))
        .await
        .unwrap()
        .unwrap();

    let reader = hound::WavReader::open(output_dir.path().join(&record.audio_file)).unwrap();
    assert_eq!(reader.spec().sample_rate, 24_000);
    assert_eq!(reader.spec().channels, 1);
    assert!(reader.duration() > 0);
}

#[tokio::test]
async fn test_seeded_pipelines_make_identical_choices() {
    async fn choices() -> Vec<(String, String, String)> {
        let mut fixture = Fixture::new();
        let mut out = Vec::new();
        for _ in 0..4 {
            let record = fixture
                .pipeline
                .generate(SampleRequest::new(PLANTS))
                .await
                .unwrap()
                .unwrap();
            out.push((record.voice_name, record.style, record.description));
        }
        out
    }

    assert_eq!(choices().await, choices().await);
}

#[tokio::test]
async fn test_records_accumulate_in_order() {
    let mut fixture = Fixture::new();
    let topics = ["Tides", "Rainbows", "Volcanoes"];

    for topic in topics {
        fixture
            .pipeline
            .generate(SampleRequest::new(topic))
            .await
            .unwrap()
            .unwrap();
    }

    let recorded: Vec<String> = fixture.records().into_iter().map(|r| r.topic).collect();
    assert_eq!(recorded, topics);
    assert_eq!(fixture.audio_files().len(), 3);
}

#[test]
fn test_build_rejects_zero_attempts() {
    let output_dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        max_attempts: 0,
        ..Default::default()
    };
    let result = SamplePipeline::builder()
        .output_dir(output_dir.path())
        .settings(settings)
        .credentials(KEYS)
        .build();
    assert!(matches!(result, Err(DatagenError::Configuration(_))));
}

#[test]
fn test_build_rejects_empty_credentials() {
    let output_dir = tempfile::tempdir().unwrap();
    let result = SamplePipeline::builder()
        .output_dir(output_dir.path())
        .credentials(Vec::<String>::new())
        .build();
    assert!(matches!(result, Err(DatagenError::Configuration(_))));
}
