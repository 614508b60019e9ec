use super::*;

#[test]
fn test_parse_missing_markers() {
    for raw in ["", "  ", "NA", "N/A", "NaN", "null", "None", "#N/A"] {
        assert_eq!(FeatureValue::parse(raw), FeatureValue::Missing, "{raw:?}");
    }
}

#[test]
fn test_parse_numeric_and_text() {
    assert_eq!(FeatureValue::parse(" 3.5 "), FeatureValue::Numeric(3.5));
    assert_eq!(FeatureValue::parse("-2"), FeatureValue::Numeric(-2.0));
    assert_eq!(
        FeatureValue::parse("Female"),
        FeatureValue::Categorical("Female".to_string())
    );
    assert!(matches!(FeatureValue::parse("inf"), FeatureValue::Numeric(v) if v.is_infinite()));
    assert_eq!(FeatureValue::parse("inf").as_finite(), None);
}

#[test]
fn test_respondent_vector_fills_missing() {
    let features = vec!["Q1".to_string(), "Q2".to_string(), "Q3".to_string()];
    let mut supplied = BTreeMap::new();
    supplied.insert("Q2".to_string(), FeatureValue::Numeric(4.0));
    supplied.insert("Q9".to_string(), FeatureValue::Numeric(1.0));

    let v = RespondentVector::new(&features, supplied);
    assert_eq!(v.get("Q1"), &FeatureValue::Missing);
    assert_eq!(v.get("Q2"), &FeatureValue::Numeric(4.0));
    assert_eq!(v.get("Q9"), &FeatureValue::Missing);
    assert_eq!(v.n_missing(), 2);
    let order: Vec<&str> = v.iter().map(|(name, _)| name).collect();
    assert_eq!(order, vec!["Q1", "Q2", "Q3"]);
}
