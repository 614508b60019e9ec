use super::*;

fn col(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn one_to_hundred() -> Vec<Option<String>> {
    (1..=100).map(|i| Some(i.to_string())).collect()
}

#[test]
fn test_numeric_baseline_one_to_hundred() {
    let table = ReferenceTable::from_columns(vec![("Q1".to_string(), one_to_hundred())]);
    let set = build_baselines(&table, &names(&["Q1"]), &Stage1Params::default());
    let b = set.numeric("Q1").unwrap();
    assert!((b.mean - 50.5).abs() < 1e-9);
    assert!((b.std - 28.866070047722118).abs() < 1e-9);
    assert_eq!(b.n_finite, 100);
    assert!((b.quantiles.get(1).unwrap() - 1.99).abs() < 1e-9);
    assert!((b.quantiles.get(50).unwrap() - 50.5).abs() < 1e-9);
    assert!((b.quantiles.get(99).unwrap() - 99.01).abs() < 1e-9);
}

#[test]
fn test_quantile_table_has_ranks_1_to_99_non_decreasing() {
    let values = col(&["5", "1", "1", "7", "3", "3", "3", "NA", "2", "inf", "10"]);
    let table = ReferenceTable::from_columns(vec![("Q1".to_string(), values)]);
    let set = build_baselines(&table, &names(&["Q1"]), &Stage1Params::default());
    let b = set.numeric("Q1").unwrap();
    assert_eq!(b.n_finite, 9);
    assert_eq!(b.quantiles.iter().count(), 99);
    let ranks: Vec<u32> = b.quantiles.iter().map(|(r, _)| r).collect();
    assert_eq!(ranks, (1..=99).collect::<Vec<_>>());
    let mut prev = f64::NEG_INFINITY;
    for (_, v) in b.quantiles.iter() {
        assert!(v >= prev);
        prev = v;
    }
}

#[test]
fn test_categorical_choices_ordered_by_frequency_then_first_seen() {
    let values = col(&["b", "a", "c", "a", "b", "", "NA", "d"]);
    let table = ReferenceTable::from_columns(vec![("Q2".to_string(), values)]);
    let set = build_baselines(&table, &names(&["Q2"]), &Stage1Params::default());
    match set.get("Q2").unwrap() {
        FeatureBaseline::Categorical(c) => assert_eq!(c.choices, vec!["b", "a", "c", "d"]),
        other => panic!("expected categorical, got {other:?}"),
    }
}

#[test]
fn test_categorical_choices_truncated() {
    let values: Vec<Option<String>> = (0..80).map(|i| Some(format!("v{i}"))).collect();
    let table = ReferenceTable::from_columns(vec![("Q2".to_string(), values)]);
    let set = build_baselines(&table, &names(&["Q2"]), &Stage1Params::default());
    match set.get("Q2").unwrap() {
        FeatureBaseline::Categorical(c) => {
            assert_eq!(c.choices.len(), 50);
            assert_eq!(c.choices[0], "v0");
        }
        other => panic!("expected categorical, got {other:?}"),
    }
}

#[test]
fn test_mixed_column_is_categorical() {
    let values = col(&["1", "2", "often"]);
    let table = ReferenceTable::from_columns(vec![("Q3".to_string(), values)]);
    let set = build_baselines(&table, &names(&["Q3"]), &Stage1Params::default());
    assert!(!set.get("Q3").unwrap().is_numeric());
}

#[test]
fn test_missing_and_unavailable_features_reported() {
    let table = ReferenceTable::from_columns(vec![
        ("Q1".to_string(), col(&["1", "2"])),
        ("Q4".to_string(), col(&["NA", "inf", ""])),
    ]);
    let set = build_baselines(&table, &names(&["Q1", "Q4", "Q5"]), &Stage1Params::default());
    assert_eq!(set.present, vec!["Q1"]);
    assert_eq!(set.missing, vec!["Q5"]);
    assert_eq!(set.unavailable, vec!["Q4"]);
    assert!(set.get("Q4").is_none());
}

#[test]
fn test_constant_column_has_zero_std() {
    let table = ReferenceTable::from_columns(vec![("Q1".to_string(), col(&["3", "3", "3"]))]);
    let set = build_baselines(&table, &names(&["Q1"]), &Stage1Params::default());
    let b = set.numeric("Q1").unwrap();
    assert_eq!(b.std, 0.0);
    assert_eq!(b.bounds.lo, 3.0);
    assert_eq!(b.bounds.hi, 3.0);
    assert_eq!(b.bounds.step, 0.1);
}

#[test]
fn test_input_bounds() {
    let table = ReferenceTable::from_columns(vec![("Q1".to_string(), one_to_hundred())]);
    let set = build_baselines(&table, &names(&["Q1"]), &Stage1Params::default());
    let bounds = set.numeric("Q1").unwrap().bounds;
    assert_eq!(bounds.slider_min, 1.0);
    assert_eq!(bounds.slider_max, 100.0);
    assert_eq!(bounds.step, 1.0);
    assert!((bounds.default - 50.5).abs() < 1e-9);
    assert!(bounds.contains(50.0));
    assert!(!bounds.contains(150.0));
}

#[test]
fn test_build_is_deterministic() {
    let table = ReferenceTable::from_columns(vec![
        ("Q1".to_string(), one_to_hundred()),
        ("Q2".to_string(), (0..100).map(|i| Some(format!("c{}", i % 7))).collect()),
    ]);
    let features = names(&["Q2", "Q1"]);
    let a = build_baselines(&table, &features, &Stage1Params::default());
    let b = build_baselines(&table, &features, &Stage1Params::default());
    assert_eq!(a.present, b.present);
    assert_eq!(a.baselines, b.baselines);
    assert_eq!(a.present, features);
}

#[test]
fn test_percentile_linear_edges() {
    assert!(percentile_linear(&[], 50.0).is_nan());
    assert_eq!(percentile_linear(&[4.0], 1.0), 4.0);
    assert_eq!(percentile_linear(&[0.0, 10.0], 25.0), 2.5);
    let (mean, std) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    assert_eq!(mean, 5.0);
    assert_eq!(std, 2.0);
}

#[test]
fn test_default_params_follow_decision_profile() {
    let profile = DecisionProfile::default_v1();
    assert_eq!(
        Stage1Params::default().categorical_limit,
        profile.categorical_limit
    );

    let mut narrow = DecisionProfile::default_v1();
    narrow.categorical_limit = 3;
    assert_eq!(Stage1Params::from(&narrow).categorical_limit, 3);
}
