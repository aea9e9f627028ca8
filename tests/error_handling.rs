use std::fs;
use std::path::{Path, PathBuf};

use rse::{
    Dataset, DatasetSpec, EncodeError, EncoderConfig, GeneratorConfig, PipelineError, QGramSet,
    Record, RefSetError, ReferenceSetPool, RseConfig, encode_datasets, generate_reference_sets,
};

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn spec(path: PathBuf) -> DatasetSpec {
    DatasetSpec {
        path,
        id_column: 0,
        attributes: vec![1, 2],
    }
}

fn config(dir: &Path, a_text: &str, b_text: &str) -> RseConfig {
    let yaml = r#"
version: "1.0"
generator:
  r_length: 20
  k: 2
dataset_a: { path: "a.csv", id_column: 0, attributes: [1, 2] }
dataset_b: { path: "b.csv", id_column: 0, attributes: [1, 2] }
"#;
    let mut cfg = RseConfig::from_yaml(yaml).unwrap();
    cfg.dataset_a = spec(write(dir, "a.csv", a_text));
    cfg.dataset_b = spec(write(dir, "b.csv", b_text));
    cfg
}

fn set(items: &[&str]) -> QGramSet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn differing_attribute_headers_fail_before_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,surname,first\n1,lee,ann\n",
    );
    let out = dir.path().join("a_out.csv");
    cfg.output.dataset_a = Some(out.clone());

    let err = rse::run(&cfg).unwrap_err();
    assert_eq!(
        err,
        PipelineError::AttributeMismatch {
            left: vec!["first".into(), "last".into()],
            right: vec!["surname".into(), "first".into()],
        }
    );
    assert!(!out.exists());
}

#[test]
fn non_integer_frequency_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,first,last\n1,ann,lee\n",
    );
    cfg.reference_sets.frequency_table = Some(write(dir.path(), "freq.csv", "an,12\nle,many\n"));

    match rse::run(&cfg).unwrap_err() {
        PipelineError::RefSet(RefSetError::Format { line, message }) => {
            assert_eq!(line, 2);
            assert!(message.contains("many"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn uneven_reference_set_file_is_an_invariant_violation() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,first,last\n1,ann,lee\n",
    );
    cfg.reference_sets.path = Some(write(dir.path(), "refs.csv", "an,nn\nle,ee,lo\n"));

    assert_eq!(
        rse::run(&cfg).unwrap_err(),
        PipelineError::RefSet(RefSetError::CardinalityMismatch {
            index: 1,
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn missing_dataset_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,first,last\n1,ann,lee\n",
    );
    cfg.dataset_b.path = dir.path().join("absent.csv");

    match rse::run(&cfg).unwrap_err() {
        PipelineError::Io { path, .. } => assert!(path.ends_with("absent.csv")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn attribute_column_out_of_range_is_table_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,first,last\n1,ann,lee\n",
    );
    cfg.dataset_a.attributes = vec![1, 5];

    assert!(matches!(
        rse::run(&cfg).unwrap_err(),
        PipelineError::Table { line: 1, .. }
    ));
}

#[test]
fn two_symbol_alphabet_cannot_reach_coverage_two() {
    let alphabet = vec!["ab".to_string(), "ba".to_string()];
    let cfg = GeneratorConfig::new()
        .with_r_length(1)
        .with_k(2)
        .with_max_attempts(25);

    assert_eq!(
        generate_reference_sets(&alphabet, &cfg).unwrap_err(),
        RefSetError::CoverageExhausted {
            bucket: 1,
            attempts: 25,
            generated: 2
        }
    );
}

#[test]
fn record_outside_every_reference_set_fails_encoding() {
    let pool = ReferenceSetPool::from_sets(vec![set(&["00", "01"]), set(&["10", "11"])]).unwrap();
    let left = Dataset::new("a", vec![Record::new("n1", set(&["00", "12"]))]);
    let right = Dataset::new("b", vec![Record::new("ann", set(&["an", "nn"]))]);

    assert_eq!(
        encode_datasets(&left, &right, &pool, &EncoderConfig::default()).unwrap_err(),
        PipelineError::Encode(EncodeError::EmptySignature {
            dataset: "b".into(),
            record_id: "ann".into()
        })
    );
}

#[test]
fn failed_output_write_leaves_no_partial_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,first,last\n1,ann,lee\n",
    );
    let out_pool = dir.path().join("pool.csv");
    let out_a = dir.path().join("a_out.csv");
    cfg.output.reference_sets = Some(out_pool.clone());
    cfg.output.dataset_a = Some(out_a.clone());
    cfg.output.dataset_b = Some(dir.path().join("no-such-dir").join("b_out.csv"));

    match rse::run(&cfg).unwrap_err() {
        PipelineError::Io { path, .. } => assert!(path.ends_with("b_out.csv")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!out_pool.exists());
    assert!(!out_a.exists());

    let mut left: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    left.sort();
    assert_eq!(left, vec!["a.csv", "b.csv"]);
}

#[test]
fn missing_frequency_table_names_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(
        dir.path(),
        "id,first,last\n1,ann,lee\n",
        "id,first,last\n1,ann,lee\n",
    );
    let missing = dir.path().join("freq.csv");
    cfg.reference_sets.frequency_table = Some(missing.clone());

    match rse::run(&cfg).unwrap_err() {
        PipelineError::RefSet(RefSetError::Io { path, .. }) => {
            assert_eq!(path, Some(missing));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
