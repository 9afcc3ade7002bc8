use drug_eval_studio::aggregator::{
    find_high_performance_low_reviews, find_low_performance_high_reviews, rank_by_disease_class,
    recommend_by_condition, HighPerformanceQuery, LowPerformanceQuery, RankQuery, RecommendQuery,
};
use drug_eval_studio::parser::{Column, Dataset, PerformanceField, ReviewRecord};
use drug_eval_studio::utils::EngineError;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn record(
    drug: &str,
    condition: Option<&str>,
    class: &str,
    kind: &str,
    performance: f64,
    reviews: u64,
) -> ReviewRecord {
    ReviewRecord {
        drug: drug.to_string(),
        condition: condition.map(str::to_string),
        disease_class: Some(class.to_string()),
        drug_type: Some(kind.to_string()),
        performance: Some(performance),
        weighted_performance: Some(performance),
        reviews: Some(reviews),
    }
}

fn types(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn respiratory_dataset() -> Dataset {
    let mut records = Vec::new();
    for i in 0..15 {
        records.push(record(
            &format!("Drug{:02}", i),
            Some("Asthma"),
            "Respiratory",
            "Rx",
            1.0 + (i % 5) as f64 * 0.5,
            10 + i,
        ));
    }
    records.push(record("Drug00", Some("Asthma"), "Respiratory", "Rx", 5.0, 40));
    records.push(record("Other", Some("Angina"), "Cardio", "Rx", 5.0, 1000));
    Dataset::from_records(records)
}

#[test]
fn test_exact_duplicate_returns_single_row() {
    let dataset = Dataset::from_records(vec![
        record("A", Some("Flu"), "Respiratory", "OTC", 5.0, 3),
        record("A", Some("Flu"), "Respiratory", "OTC", 5.0, 3),
    ]);

    let result = find_high_performance_low_reviews(
        &dataset,
        &HighPerformanceQuery {
            performance_threshold: 4.5,
            max_reviews: 5,
        },
    )
    .unwrap();

    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0].drug, "A");
    assert_eq!(result.matched, 2);
}

#[test]
fn test_rank_min_reviews_excludes_drug_entirely() {
    let dataset = Dataset::from_records(vec![
        record("Few", Some("Asthma"), "Respiratory", "Rx", 5.0, 10),
        record("Many", Some("Asthma"), "Respiratory", "Rx", 3.0, 100),
    ]);

    let result = rank_by_disease_class(
        &dataset,
        &RankQuery {
            disease_class: "Respiratory".to_string(),
            min_reviews: 50,
            field: PerformanceField::Unweighted,
        },
    )
    .unwrap();

    let drugs: Vec<&str> = result.rows.iter().map(|r| r.drug.as_str()).collect();
    assert_eq!(drugs, vec!["Many"]);
}

#[test]
fn test_recommend_influenza_example() {
    let dataset = Dataset::from_records(vec![
        record("Otc", Some("Influenza"), "Respiratory", "OTC", 4.0, 10),
        record("Presc", Some("Influenza"), "Respiratory", "Prescription", 4.8, 10),
    ]);

    let result = recommend_by_condition(
        &dataset,
        &RecommendQuery {
            condition_substring: "flu".to_string(),
            allowed_types: types(&["OTC"]),
            field: PerformanceField::Unweighted,
            limit: 10,
        },
    )
    .unwrap();

    let drugs: Vec<&str> = result.rows.iter().map(|r| r.drug.as_str()).collect();
    assert_eq!(drugs, vec!["Otc"]);
}

#[test]
fn test_rank_filter_and_aggregate_correctness() {
    let dataset = respiratory_dataset();
    let query = RankQuery {
        disease_class: "Respiratory".to_string(),
        min_reviews: 12,
        field: PerformanceField::Unweighted,
    };

    let result = rank_by_disease_class(&dataset, &query).unwrap();

    for row in &result.rows {
        let sources: Vec<&ReviewRecord> = dataset
            .records()
            .iter()
            .filter(|r| r.drug == row.drug && r.condition == row.condition)
            .filter(|r| r.reviews.unwrap() >= query.min_reviews)
            .collect();

        assert!(sources
            .iter()
            .all(|r| r.disease_class.as_deref() == Some("Respiratory")));

        let mean = sources.iter().map(|r| r.performance.unwrap()).sum::<f64>()
            / sources.len() as f64;
        assert!((row.avg_performance - mean).abs() < 1e-9);

        let reviews: u64 = sources.iter().map(|r| r.reviews.unwrap()).sum();
        assert_eq!(row.reviews, reviews);
    }

    // Only the 40-review Drug00 record clears min_reviews
    let drug00 = result.rows.iter().find(|r| r.drug == "Drug00").unwrap();
    assert_eq!(drug00.records, 1);
    assert_eq!(drug00.reviews, 40);
    assert_eq!(result.rows[0].drug, "Drug00");
}

#[test]
fn test_rank_top_k_bound_and_order() {
    let dataset = respiratory_dataset();
    let result = rank_by_disease_class(
        &dataset,
        &RankQuery {
            disease_class: "Respiratory".to_string(),
            min_reviews: 0,
            field: PerformanceField::Unweighted,
        },
    )
    .unwrap();

    assert_eq!(result.rows.len(), 10);
    assert!(result
        .rows
        .windows(2)
        .all(|w| w[0].avg_performance >= w[1].avg_performance));
}

#[test]
fn test_stable_ties_follow_encounter_order() {
    let dataset = Dataset::from_records(vec![
        record("Later", Some("Cough"), "Respiratory", "OTC", 3.0, 10),
        record("Earlier", Some("Cough"), "Respiratory", "OTC", 4.0, 10),
        record("Later", Some("Cough"), "Respiratory", "OTC", 5.0, 10),
        record("Third", Some("Cough"), "Respiratory", "OTC", 4.0, 10),
    ]);

    let result = recommend_by_condition(
        &dataset,
        &RecommendQuery {
            condition_substring: "COUGH".to_string(),
            allowed_types: types(&["OTC"]),
            field: PerformanceField::Unweighted,
            limit: 10,
        },
    )
    .unwrap();

    // All three groups average 4.0; "Later" was encountered first
    let drugs: Vec<&str> = result.rows.iter().map(|r| r.drug.as_str()).collect();
    assert_eq!(drugs, vec!["Later", "Earlier", "Third"]);
}

#[test]
fn test_recommend_limit_and_no_padding() {
    let dataset = respiratory_dataset();
    let query = RecommendQuery {
        condition_substring: "asth".to_string(),
        allowed_types: types(&["Rx"]),
        field: PerformanceField::Weighted,
        limit: 5,
    };

    let limited = recommend_by_condition(&dataset, &query).unwrap();
    assert_eq!(limited.rows.len(), 5);

    let wide = recommend_by_condition(
        &dataset,
        &RecommendQuery {
            limit: 100,
            ..query
        },
    )
    .unwrap();
    assert_eq!(wide.rows.len(), 15);
}

#[test]
fn test_missing_condition_never_matches() {
    let dataset = Dataset::from_records(vec![
        record("NoCondition", None, "Respiratory", "OTC", 5.0, 3),
        record("WithCondition", Some("Flu"), "Respiratory", "OTC", 4.0, 3),
    ]);

    for search in ["flu", ""] {
        let result = recommend_by_condition(
            &dataset,
            &RecommendQuery {
                condition_substring: search.to_string(),
                allowed_types: types(&["OTC"]),
                field: PerformanceField::Unweighted,
                limit: 10,
            },
        )
        .unwrap();

        assert!(result.rows.iter().all(|r| r.drug != "NoCondition"));
        assert_eq!(result.rows.len(), 1);
    }
}

#[test]
fn test_low_performance_sorted_by_reviews_and_deduped() {
    let dataset = Dataset::from_records(vec![
        record("A", Some("Pain"), "Musculoskeletal", "OTC", 1.0, 6000),
        record("B", Some("Pain"), "Musculoskeletal", "OTC", 2.0, 9000),
        record("A", Some("Pain"), "Musculoskeletal", "OTC", 1.0, 6000),
        record("C", Some("Pain"), "Musculoskeletal", "OTC", 2.5, 20000),
    ]);

    let result = find_low_performance_high_reviews(&dataset, &LowPerformanceQuery::default())
        .unwrap();

    let drugs: Vec<&str> = result.rows.iter().map(|r| r.drug.as_str()).collect();
    assert_eq!(drugs, vec!["B", "A"]);

    let mut seen = std::collections::HashSet::new();
    for row in &result.rows {
        assert!(seen.insert((
            row.drug.clone(),
            row.condition.clone(),
            row.performance.to_bits(),
            row.reviews
        )));
    }
}

#[test]
fn test_operations_are_deterministic() {
    let dataset = respiratory_dataset();
    let query = RankQuery {
        disease_class: "Respiratory".to_string(),
        min_reviews: 0,
        field: PerformanceField::Unweighted,
    };

    let first = rank_by_disease_class(&dataset, &query).unwrap();
    let second = rank_by_disease_class(&dataset, &query).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_schema_error_names_missing_field() {
    let dataset = Dataset::new(
        vec![record("A", Some("Flu"), "Respiratory", "OTC", 4.0, 3)],
        [Column::Drug, Column::Condition, Column::Performance],
    );

    let err = find_high_performance_low_reviews(&dataset, &HighPerformanceQuery::default())
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Schema {
            field: "reviews".to_string()
        }
    );
    assert!(err.to_string().contains("reviews"));
}

#[test]
fn test_raw_outlier_ties_keep_dataset_order() {
    let dataset = Dataset::from_records(vec![
        record("Zeta", Some("Acne"), "Dermatology", "OTC", 4.8, 2),
        record("Alpha", Some("Acne"), "Dermatology", "OTC", 4.9, 1),
        record("Mid", Some("Acne"), "Dermatology", "OTC", 4.8, 4),
        record("Beta", Some("Acne"), "Dermatology", "OTC", 4.8, 3),
    ]);

    let result = find_high_performance_low_reviews(&dataset, &HighPerformanceQuery::default())
        .unwrap();

    let drugs: Vec<&str> = result.rows.iter().map(|r| r.drug.as_str()).collect();
    assert_eq!(drugs, vec!["Alpha", "Zeta", "Mid", "Beta"]);
}
