use drug_eval_studio::parser::{load_dataset, load_dataset_from_reader, Column};
use drug_eval_studio::utils::LoadError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE_CSV: &str = "\
Drug,Condition,Disease_Class,Type,Performance,Weighted_Performance,Reviews
Albuterol,Asthma,Respiratory,Rx,4.2,4.0,120
Tamiflu,Influenza,Respiratory,OTC,3.9,3.7,85.0
Ibuprofen,Pain,Musculoskeletal,OTC,n/a,2.5,9000
,Cough,Respiratory,OTC,4.0,4.0,10
Montelukast,,Respiratory,Rx,4.5,4.4,abc
";

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_csv(SAMPLE_CSV);

    let dataset = load_dataset(file.path()).unwrap();

    // The row with an empty drug name is rejected
    assert_eq!(dataset.len(), 4);
    assert_eq!(dataset.rejected_rows(), 1);
    for column in Column::ALL {
        assert!(dataset.has_column(column), "missing {}", column);
    }
}

#[test]
fn test_lenient_numeric_parsing() {
    let dataset = load_dataset_from_reader(SAMPLE_CSV.as_bytes()).unwrap();
    let records = dataset.records();

    assert_eq!(records[0].reviews, Some(120));
    assert_eq!(records[1].reviews, Some(85));
    assert_eq!(records[2].performance, None);
    assert_eq!(records[2].weighted_performance, Some(2.5));
    assert_eq!(records[3].condition, None);
    assert_eq!(records[3].reviews, None);
}

#[test]
fn test_optional_columns_tracked() {
    let csv = "drug,condition,performance,reviews\nA,Flu,4.0,3\n";

    let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();

    assert!(dataset.has_column(Column::Performance));
    assert!(!dataset.has_column(Column::WeightedPerformance));
    assert!(!dataset.has_column(Column::DiseaseClass));
    assert_eq!(dataset.records()[0].disease_class, None);
}

#[test]
fn test_missing_drug_column_fails() {
    let csv = "name,condition\nA,Flu\n";

    let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();

    assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "drug"));
}

#[test]
fn test_header_only_file_is_empty_dataset() {
    let csv = "drug,condition,disease_class,type,performance,weighted_performance,reviews\n";

    let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();

    assert!(dataset.is_empty());
    assert_eq!(dataset.rejected_rows(), 0);
}

#[test]
fn test_all_rows_rejected_is_invalid_format() {
    let csv = "drug,condition\n,Flu\n,Cold\n";

    let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();

    assert!(matches!(err, LoadError::InvalidFormat(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = load_dataset(dir.path().join("absent.csv")).unwrap_err();

    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_huge_review_count_is_malformed() {
    let csv = "drug,reviews\nA,1e30\nB,7\n";

    let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(dataset.records()[0].reviews, None);
    assert_eq!(dataset.records()[1].reviews, Some(7));
}
