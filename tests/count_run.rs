use flate2::write::GzEncoder;
use flate2::Compression;
use sgrna_count::commands::count::{execute, RunOptions};
use sgrna_count::counting::Strategy;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LIBRARY: &str = "id,gRNA.sequence,Gene\n\
                       1,ACGT,g1\n\
                       2,GGGG,g2\n\
                       3,ACGT,g3\n\
                       4,CCCCCC,g4\n";

fn write_library(dir: &Path) -> PathBuf {
    let path = dir.join("library.csv");
    fs::write(&path, LIBRARY).unwrap();
    path
}

fn write_fastq_gz(path: &Path, records: &str) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(records.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn fastq(reads: &[&str]) -> String {
    reads
        .iter()
        .enumerate()
        .map(|(i, read)| format!("@read{}\n{}\n+\n{}\n", i, read, "I".repeat(read.len())))
        .collect()
}

fn options(dir: &Path, library: PathBuf, fastq: Vec<PathBuf>, names: Option<Vec<&str>>) -> RunOptions {
    RunOptions {
        library,
        fastq,
        names: names.map(|n| n.into_iter().map(String::from).collect()),
        threads: 3,
        output_prefix: dir.join("counts").display().to_string(),
        strategy: Strategy::PerTarget,
        sample_suffixes: vec!["_R1.fq.gz".to_string(), ".fq.gz".to_string()],
        show_progress: false,
    }
}

#[test]
fn two_samples_produce_per_sample_and_merged_tables() {
    let dir = TempDir::new().unwrap();
    let library = write_library(dir.path());
    let day0 = dir.path().join("day0_R1.fq.gz");
    let day14 = dir.path().join("day14.fq.gz");
    write_fastq_gz(&day0, &fastq(&["ACGTTT", "TTTT", "ACGTACGT"]));
    write_fastq_gz(&day14, &fastq(&["GGGGA", "AGGGG", "TTTT"]));

    let summary = execute(&options(dir.path(), library, vec![day0, day14], None)).unwrap();

    let names: Vec<_> = summary.sample_tables.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["day0", "day14"]);

    assert_eq!(
        fs::read_to_string(&summary.sample_tables[0].1).unwrap(),
        "id,gRNA.sequence,Gene,day0\n\
         1,ACGT,g1,2\n\
         2,GGGG,g2,0\n\
         3,ACGT,g3,2\n\
         4,CCCCCC,g4,0\n"
    );
    assert_eq!(
        fs::read_to_string(&summary.merged_table).unwrap(),
        "id,gRNA.sequence,Gene,day0,day14\n\
         1,ACGT,g1,2,0\n\
         2,GGGG,g2,0,2\n\
         3,ACGT,g3,2,0\n\
         4,CCCCCC,g4,0,0\n"
    );
    assert_eq!(
        summary.merged_table,
        dir.path().join("counts_merged_all_samples.csv")
    );
}

#[test]
fn malformed_records_mid_file_are_skipped() {
    let dir = TempDir::new().unwrap();
    let library = write_library(dir.path());
    let reads = dir.path().join("s.fq.gz");
    let records = format!(
        "{}@broken\nACGTACGT\n+\nII\n@noplus\nCCCCCC\nIIIIII\n{}",
        fastq(&["ACGTAA"]),
        fastq(&["GGGGACGT"])
    );
    write_fastq_gz(&reads, &records);

    for strategy in [Strategy::PerTarget, Strategy::SinglePass] {
        let mut opts = options(dir.path(), library.clone(), vec![reads.clone()], Some(vec!["s"]));
        opts.strategy = strategy;
        let summary = execute(&opts).unwrap();

        assert_eq!(
            fs::read_to_string(&summary.sample_tables[0].1).unwrap(),
            "id,gRNA.sequence,Gene,s\n\
             1,ACGT,g1,2\n\
             2,GGGG,g2,1\n\
             3,ACGT,g3,2\n\
             4,CCCCCC,g4,0\n"
        );
    }
}

#[test]
fn rerun_gives_identical_tables() {
    let dir = TempDir::new().unwrap();
    let library = write_library(dir.path());
    let reads = dir.path().join("rep.fq.gz");
    let many: Vec<String> = (0..400)
        .map(|i| ["ACGTG", "CCCCCCA", "GGGGT", "TTTTT"][i % 4].repeat(1 + i % 3))
        .collect();
    let many: Vec<&str> = many.iter().map(String::as_str).collect();
    write_fastq_gz(&reads, &fastq(&many));

    let mut first = options(dir.path(), library.clone(), vec![reads.clone()], None);
    first.threads = 1;
    let summary = execute(&first).unwrap();
    let expected = fs::read_to_string(&summary.merged_table).unwrap();

    let mut second = options(dir.path(), library, vec![reads], None);
    second.threads = 8;
    second.strategy = Strategy::SinglePass;
    let summary = execute(&second).unwrap();

    assert_eq!(fs::read_to_string(&summary.merged_table).unwrap(), expected);
}

#[test]
fn corrupt_second_sample_keeps_first_output() {
    let dir = TempDir::new().unwrap();
    let library = write_library(dir.path());
    let good = dir.path().join("good.fq.gz");
    let bad = dir.path().join("bad.fq.gz");
    write_fastq_gz(&good, &fastq(&["ACGT"]));
    fs::write(&bad, [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff]).unwrap();

    let opts = options(dir.path(), library, vec![good, bad], None);
    let err = execute(&opts).unwrap_err();

    assert!(format!("{:#}", err).contains("bad"));
    assert!(dir.path().join("counts_good.csv").exists());
    assert!(!dir.path().join("counts_bad.csv").exists());
    assert!(!dir.path().join("counts_merged_all_samples.csv").exists());
}

#[test]
fn malformed_library_fails_before_counting() {
    let dir = TempDir::new().unwrap();
    let library = dir.path().join("library.csv");
    fs::write(&library, "id,sequence,Gene\n1,ACGT,g1\n").unwrap();
    let reads = dir.path().join("s.fq.gz");
    write_fastq_gz(&reads, &fastq(&["ACGT"]));

    let err = execute(&options(dir.path(), library, vec![reads], None)).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<sgrna_count::Error>(),
        Some(sgrna_count::Error::MalformedLibrary { .. })
    ));
    assert!(!dir.path().join("counts_s.csv").exists());
}

#[test]
fn mismatched_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let library = write_library(dir.path());
    let reads = dir.path().join("s.fq.gz");
    write_fastq_gz(&reads, &fastq(&["ACGT"]));

    let err = execute(&options(dir.path(), library, vec![reads], Some(vec!["a", "b"]))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<sgrna_count::Error>(),
        Some(sgrna_count::Error::InvalidInput(_))
    ));
}
