//! End-to-end rubric behaviour through the public API.

use notegrade_core::{evaluate, CriterionType, Evaluator, ProfileRecord, Tone};

fn test_profile() -> ProfileRecord {
    ProfileRecord::from_json(
        r#"{
            "name": "Test User",
            "headline": "Software Engineer",
            "summary": "Experienced developer.",
            "experience": ["Developer"],
            "education": ["Test University"],
            "skills": ["Python"]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_all_criteria_pass() {
    let note = "Hello, your Developer work with Python caught my eye and I would love to connect!";
    let verdict = evaluate(note, &test_profile());

    assert!(verdict.all_passed(), "unexpected failures: {:?}", verdict.failed());
    assert_eq!(verdict.length_ok.evidence, note.chars().count());
    assert_eq!(verdict.specific_details_ok.evidence, vec!["Developer", "Python"]);
    assert_eq!(verdict.tone.evidence, Tone::Positive);
    assert!(verdict.professional_text.evidence.is_empty());
}

#[test]
fn test_three_details_exceed_cap() {
    let note = "Hi Test, loved your Developer role at Test University \u{2014} would love to connect!";
    let verdict = evaluate(note, &test_profile());

    assert!(verdict.length_ok.passed);
    assert!(!verdict.specific_details_ok.passed);
    assert_eq!(
        verdict.specific_details_ok.evidence,
        vec!["Developer", "Test", "University"]
    );
    assert!(verdict.tone.passed);
    // An em dash is punctuation, not a pictographic symbol
    assert!(verdict.professional_text.passed);
    assert_eq!(verdict.failed(), vec![CriterionType::SpecificDetails]);
}

#[test]
fn test_emoji_fails_only_professional_text() {
    let note = "Your Python work is impressive, I would love to connect \u{1F600}";
    let verdict = evaluate(note, &test_profile());

    assert!(verdict.length_ok.passed);
    assert!(verdict.specific_details_ok.passed);
    assert!(verdict.tone.passed);
    assert!(!verdict.professional_text.passed);
    assert_eq!(verdict.professional_text.evidence, vec!["\u{1F600}"]);
}

#[test]
fn test_hashtag_fails_only_professional_text() {
    let note = "Your Python work is impressive, I would love to connect #networking";
    let verdict = evaluate(note, &test_profile());

    assert_eq!(verdict.failed(), vec![CriterionType::ProfessionalText]);
    assert!(verdict.professional_text.evidence.is_empty());
}

#[test]
fn test_partial_failure() {
    let verdict = evaluate("Hi! \u{1F60A} Let's connect.", &test_profile());

    assert!(verdict.length_ok.passed);
    assert!(!verdict.specific_details_ok.passed);
    assert!(!verdict.professional_text.passed);
}

#[test]
fn test_negative_note_fails_tone() {
    let verdict = evaluate(
        "This is the worst experience I've ever had with a Developer.",
        &test_profile(),
    );
    assert!(!verdict.tone.passed);
    assert_eq!(verdict.tone.evidence, Tone::Negative);
}

#[test]
fn test_empty_profile_never_passes_details() {
    let verdict = evaluate("Loved your work as a Developer.", &ProfileRecord::default());
    assert!(!verdict.specific_details_ok.passed);
    assert!(verdict.specific_details_ok.evidence.is_empty());
}

#[test]
fn test_overlong_note_fails_length() {
    let note = format!("Your Python work is great. {}", "a".repeat(300));
    let verdict = evaluate(&note, &test_profile());
    assert!(!verdict.length_ok.passed);
    assert_eq!(verdict.length_ok.evidence, note.chars().count());
}

#[test]
fn test_determinism_same_input_same_output() {
    let note = "Your Developer role stood out, I would love to connect!";
    let profile = test_profile();

    let first = evaluate(note, &profile);
    let second = evaluate(note, &profile);
    let shared = Evaluator::new();
    let third = shared.evaluate(note, &profile);
    let fourth = shared.evaluate(note, &profile);

    assert_eq!(first, second);
    assert_eq!(second, third);
    assert_eq!(third, fourth);
}

#[test]
fn test_verdict_json_round_trip_shape() {
    let verdict = evaluate("Your Developer role stood out!", &test_profile());
    let value = serde_json::to_value(&verdict).unwrap();

    let keys: Vec<&str> = CriterionType::ALL.iter().map(|c| c.key()).collect();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 4);
    for key in keys {
        let pair = object[key].as_array().unwrap();
        assert_eq!(pair.len(), 2);
        assert!(pair[0].is_boolean());
    }
}
