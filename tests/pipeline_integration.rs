use std::fs;
use std::path::{Path, PathBuf};

use rse::output::read_signatures;
use rse::{
    DatasetSpec, EncodedDatasets, PipelineError, RseConfig, RunSummary, read_reference_sets_path,
};

const PEOPLE_A: &str = "\
rec_id,first,last
p01,John,Smith
p02,Mary,Jones
p03,Peter,Taylor
p04,Anna,Brown
p05,William,Davies
p06,Elizabeth,Evans
";

const PEOPLE_B: &str = "\
id,first,last
P01,Jon,Smith
p02 ,Mary,Jones
p04,Ann,Browne
p07,George,Wilson
p08,,Hughes
";

const FREQUENCIES: &str = "\
an,900
er,850
th,800
on,700
es,650
zq,2
";

struct Fixture {
    _dir: tempfile::TempDir,
    cfg: RseConfig,
    out_a: PathBuf,
    out_b: PathBuf,
    out_pool: PathBuf,
}

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let a = write(dir.path(), "a.csv", PEOPLE_A);
    let b = write(dir.path(), "b.csv", PEOPLE_B);
    let freq = write(dir.path(), "freq.csv", FREQUENCIES);
    let out_a = dir.path().join("a_signatures.csv");
    let out_b = dir.path().join("b_signatures.csv");
    let out_pool = dir.path().join("pool.csv");

    let mut cfg = RseConfig::from_yaml(&format!(
        r#"
version: "1.0"
seed: "linkage-test"
generator:
  r_length: 20
  k: 2
dataset_a:
  path: "{a}"
  id_column: 0
  attributes: [1, 2]
dataset_b:
  path: "{b}"
  id_column: 0
  attributes: [1, 2]
"#,
        a = a.display(),
        b = b.display()
    ))
    .unwrap();
    cfg.reference_sets.frequency_table = Some(freq);
    cfg.output.dataset_a = Some(out_a.clone());
    cfg.output.dataset_b = Some(out_b.clone());
    cfg.output.reference_sets = Some(out_pool.clone());

    Fixture {
        _dir: dir,
        cfg,
        out_a,
        out_b,
        out_pool,
    }
}

fn run(fx: &Fixture) -> Result<(EncodedDatasets, RunSummary), PipelineError> {
    rse::run(&fx.cfg)
}

#[test]
fn full_run_writes_uniform_weight_signatures() {
    let fx = fixture();
    let (encoded, summary) = run(&fx).unwrap();
    let report = &summary.encode;

    assert_eq!(report.left_encoded, 6);
    assert_eq!(report.right_encoded, 4);
    assert_eq!(summary.dropped_b, 1);
    assert_eq!(report.shared_ids, 3);
    assert!(report.excluded.is_empty());
    // Every record q-gram sits in at least k = 2 sets.
    assert!(report.num_1_bits >= 2);

    for path in [&fx.out_a, &fx.out_b] {
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("rec_id,signature\n"));
        let written = read_signatures(text.as_bytes(), path).unwrap();
        for signature in written.values() {
            assert_eq!(signature.len(), report.pool_size);
            assert_eq!(signature.count_ones(), report.num_1_bits);
        }
    }

    let a = read_signatures(fs::read(&fx.out_a).unwrap().as_slice(), &fx.out_a).unwrap();
    assert_eq!(a, encoded.left);
    assert_eq!(
        a.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["p01", "p02", "p03", "p04", "p05", "p06"]
    );
}

#[test]
fn identical_records_get_identical_signatures() {
    let fx = fixture();
    let (encoded, _) = run(&fx).unwrap();
    // "p02" is Mary Jones on both sides.
    assert_eq!(encoded.left["p02"], encoded.right["p02"]);
}

#[test]
fn frozen_pool_keeps_coverage_and_shape() {
    let fx = fixture();
    let (_, summary) = run(&fx).unwrap();
    let pool = read_reference_sets_path(&fx.out_pool).unwrap();

    assert_eq!(pool.len(), summary.encode.pool_size);
    assert_eq!(pool.r_length(), 20);
    let coverage = pool.coverage();
    assert_eq!(coverage.len(), 26 * 26);
    assert!(coverage.values().all(|&c| c >= 2));

    let prep = &summary.preparation;
    let (initial, last) = (prep.initial.unwrap(), prep.final_extremes.unwrap());
    assert!(last.range() <= initial.range());
    assert!(prep.swap.is_some());
}

#[test]
fn pre_generated_reference_sets_are_used_verbatim() {
    let fx = fixture();
    run(&fx).unwrap();

    let mut cfg = fx.cfg.clone();
    cfg.reference_sets.path = Some(fx.out_pool.clone());
    cfg.reference_sets.frequency_table = None;
    cfg.output = Default::default();
    let (_, summary) = rse::run(&cfg).unwrap();

    // Uniform weights leave nothing to swap.
    let swap = summary.preparation.swap.unwrap();
    assert_eq!(swap.modifications, 0);
    assert_eq!(summary.encode.pool_size, read_reference_sets_path(&fx.out_pool).unwrap().len());
}

#[test]
fn gzip_dataset_matches_plain_dataset() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let fx = fixture();
    let (plain, _) = run(&fx).unwrap();

    let gz_path = fx.out_pool.with_file_name("a.csv.gz");
    let mut gz = GzEncoder::new(fs::File::create(&gz_path).unwrap(), Compression::default());
    gz.write_all(PEOPLE_A.as_bytes()).unwrap();
    gz.finish().unwrap();

    let mut cfg = fx.cfg.clone();
    cfg.dataset_a = DatasetSpec {
        path: gz_path,
        id_column: 0,
        attributes: vec![1, 2],
    };
    cfg.output = Default::default();
    let (compressed, _) = rse::run(&cfg).unwrap();
    assert_eq!(compressed, plain);
}
