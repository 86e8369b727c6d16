/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use credit_risk_api::artifacts::{Preprocessor, TreeEnsemble};
use credit_risk_api::features::parse_application;
use credit_risk_api::models::{RiskLevel, RiskThresholds};
use credit_risk_api::scoring::RiskScorer;
use proptest::prelude::*;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_scorer() -> RiskScorer {
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    RiskScorer::new(
        Arc::new(Preprocessor::load(&fixtures.join("preprocessor.json")).unwrap()),
        Arc::new(TreeEnsemble::load(&fixtures.join("model.json")).unwrap()),
        RiskThresholds::default(),
    )
}

fn valid_application_strategy() -> impl Strategy<Value = serde_json::Value> {
    (
        (18.0..100.0f64, 1000.0..500_000.0f64, 0.0..40.0f64),
        (500.0..50_000.0f64, 0.0..30.0f64, 0.0..1.5f64, 0.0..30.0f64),
        prop::sample::select(vec!["RENT", "OWN", "MORTGAGE", "OTHER"]),
        prop::sample::select(vec![
            "DEBTCONSOLIDATION",
            "EDUCATION",
            "HOMEIMPROVEMENT",
            "MEDICAL",
            "PERSONAL",
            "VENTURE",
        ]),
        prop::sample::select(vec!["A", "B", "C", "D", "E", "F", "G"]),
        prop::sample::select(vec!["Y", "N"]),
    )
        .prop_map(
            |((age, income, emp), (amnt, rate, ratio, hist), home, intent, grade, default)| {
                json!({
                    "person_age": age,
                    "person_income": income,
                    "person_emp_length": emp,
                    "loan_amnt": amnt,
                    "loan_int_rate": rate,
                    "loan_percent_income": ratio,
                    "cb_person_cred_hist_length": hist,
                    "person_home_ownership": home,
                    "loan_intent": intent,
                    "loan_grade": grade,
                    "cb_person_default_on_file": default
                })
            },
        )
}

// Property: parsing should never panic, whatever shows up in the fields
proptest! {
    #[test]
    fn parse_never_panics_on_arbitrary_field_values(
        age in "\\PC*",
        home in "\\PC*",
        amount in proptest::num::f64::ANY
    ) {
        let payload = json!({
            "person_age": age,
            "person_home_ownership": home,
            "loan_amnt": amount,
        });
        let _ = parse_application(&payload);
    }

    #[test]
    fn unknown_home_ownership_rejected(category in "[A-Z]{3,12}") {
        prop_assume!(!["RENT", "OWN", "MORTGAGE", "OTHER"].contains(&category.as_str()));
        let mut payload = json!({
            "person_age": 30, "person_income": 50000, "person_emp_length": 4,
            "loan_amnt": 10000, "loan_int_rate": 10.0, "loan_percent_income": 0.2,
            "cb_person_cred_hist_length": 5, "loan_intent": "PERSONAL",
            "loan_grade": "B", "cb_person_default_on_file": "N"
        });
        payload["person_home_ownership"] = json!(category);
        let err = parse_application(&payload).unwrap_err();
        prop_assert!(err.issues.iter().any(|i| i.contains("person_home_ownership")));
    }
}

// Property: scoring invariants over all valid applications
proptest! {
    #[test]
    fn probability_in_unit_interval_and_decision_consistent(payload in valid_application_strategy()) {
        let scorer = fixture_scorer();
        let application = parse_application(&payload).expect("strategy emits valid payloads");
        let assessment = scorer.assess(&application).expect("fixture artifacts accept all valid inputs");

        prop_assert!((0.0..=1.0).contains(&assessment.probability));
        prop_assert!(assessment.prediction == 0 || assessment.prediction == 1);
        prop_assert_eq!(assessment.prediction == 1, assessment.probability >= 0.5);
    }

    #[test]
    fn scoring_is_deterministic(payload in valid_application_strategy()) {
        let scorer = fixture_scorer();
        let application = parse_application(&payload).unwrap();
        let first = scorer.assess(&application).unwrap();
        let second = scorer.assess(&application).unwrap();
        prop_assert_eq!(first.probability.to_bits(), second.probability.to_bits());
    }

    #[test]
    fn risk_level_matches_bucket_definition(probability in 0.0..=1.0f64) {
        let thresholds = RiskThresholds::default();
        let level = RiskLevel::from_probability(probability, &thresholds);
        let expected = if probability < 0.3 {
            RiskLevel::Low
        } else if probability < 0.7 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };
        prop_assert_eq!(level, expected);
    }

    #[test]
    fn message_embeds_level_and_recommendation(probability in 0.0..=1.0f64) {
        let scorer = fixture_scorer();
        let assessment = scorer.assessment_for(probability);
        prop_assert!(assessment.message.starts_with(assessment.risk_level.as_str()));
        prop_assert!(assessment.message.ends_with(assessment.risk_level.recommendation()));
        prop_assert!(assessment.message.contains("probability of default"));
    }
}
