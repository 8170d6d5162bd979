use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use pubstore_core::ProgressContext;
use pubstore_ingest::{IngestConfig, run};
use pubstore_store::{DimensionPolicy, PaperStore, Table};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn article(pmid: &str, author: &str, term: &str) -> String {
    format!(
        "<PubmedArticle><MedlineCitation><PMID>{pmid}</PMID><Article>\
         <ArticleTitle>Paper {pmid}</ArticleTitle>\
         <AuthorList><Author><LastName>{author}</LastName></Author></AuthorList>\
         </Article><MeshHeadingList><MeshHeading>\
         <DescriptorName>{term}</DescriptorName>\
         </MeshHeading></MeshHeadingList></MedlineCitation></PubmedArticle>"
    )
}

fn write_set(dir: &Path, name: &str, articles: &[String]) -> PathBuf {
    let path = dir.join(name);
    let xml = format!("<PubmedArticleSet>{}</PubmedArticleSet>", articles.concat());
    std::fs::write(&path, xml).unwrap();
    path
}

fn config(dir: &TempDir, inputs: Vec<PathBuf>, policy: DimensionPolicy) -> IngestConfig {
    IngestConfig {
        db_path: dir.path().join("db").join("papers.duckdb"),
        inputs,
        workers: 2,
        policy,
        max_files: None,
    }
}

fn count(config: &IngestConfig, table: Table) -> u64 {
    PaperStore::open(&config.db_path, config.policy)
        .unwrap()
        .count(table)
        .unwrap()
}

#[test]
fn ingest_files_in_order() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_set(dir.path(), "a.xml", &[article("1", "Smith", "Humans")]),
        write_set(
            dir.path(),
            "b.xml",
            &[article("2", "Brown", "Mice"), article("3", "Green", "Rats")],
        ),
        write_set(dir.path(), "c.xml", &[article("4", "White", "Dogs")]),
    ];
    let config = config(&dir, inputs, DimensionPolicy::Strict);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.completed_files, 3);
    assert_eq!(summary.failed_files, 0);
    assert_eq!(summary.total_papers, 4);
    assert!(!summary.interrupted);
    assert_eq!(count(&config, Table::Paper), 4);
    assert_eq!(count(&config, Table::AuthorPaper), 4);
}

#[test]
fn malformed_file_is_counted_and_skipped() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.xml");
    std::fs::write(
        &bad,
        "<PubmedArticleSet><PubmedArticle><MedlineCitation><PMID>9</PMID></Broken>",
    )
    .unwrap();
    let inputs = vec![
        write_set(dir.path(), "a.xml", &[article("1", "Smith", "Humans")]),
        bad.clone(),
        write_set(dir.path(), "c.xml", &[article("2", "Brown", "Mice")]),
    ];
    let config = config(&dir, inputs, DimensionPolicy::Strict);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.completed_files, 2);
    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.failures, vec![bad]);
    assert_eq!(count(&config, Table::Paper), 2);
}

#[test]
fn strict_rejects_shared_author_file() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_set(dir.path(), "a.xml", &[article("1", "Smith", "Humans")]),
        write_set(dir.path(), "b.xml", &[article("2", "Smith", "Mice")]),
    ];
    let config = config(&dir, inputs, DimensionPolicy::Strict);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.completed_files, 1);
    assert_eq!(summary.failed_files, 1);
    assert_eq!(count(&config, Table::Paper), 1);
    assert_eq!(count(&config, Table::MeshTerm), 1);
}

#[test]
fn merge_accepts_shared_author_file() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_set(dir.path(), "a.xml", &[article("1", "Smith", "Humans")]),
        write_set(dir.path(), "b.xml", &[article("2", "Smith", "Humans")]),
    ];
    let config = config(&dir, inputs, DimensionPolicy::Merge);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.failed_files, 0);
    assert_eq!(count(&config, Table::Paper), 2);
    assert_eq!(count(&config, Table::Author), 1);
    assert_eq!(count(&config, Table::AuthorPaper), 2);
    assert_eq!(count(&config, Table::MeshTerm), 1);
}

#[test]
fn rerun_fails_every_file_and_keeps_store() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let inputs = vec![write_set(
        dir.path(),
        "a.xml",
        &[article("1", "Smith", "Humans")],
    )];
    let config = config(&dir, inputs, DimensionPolicy::Merge);

    run(&config, &ProgressContext::hidden()).unwrap();
    let again = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(again.failed_files, 1);
    assert_eq!(count(&config, Table::Paper), 1);
}

#[test]
fn gzip_input_and_skipped_records() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("set.xml.gz");
    let xml = format!(
        "<PubmedArticleSet>{}<PubmedArticle><MedlineCitation/></PubmedArticle></PubmedArticleSet>",
        article("1", "Smith", "Humans")
    );
    let mut enc = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    enc.write_all(xml.as_bytes()).unwrap();
    enc.finish().unwrap();
    let config = config(&dir, vec![path], DimensionPolicy::Strict);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.completed_files, 1);
    assert_eq!(summary.total_papers, 1);
    assert_eq!(summary.skipped_records, 1);
}

#[test]
fn max_files_limits_input() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write_set(dir.path(), "a.xml", &[article("1", "Smith", "Humans")]),
        write_set(dir.path(), "b.xml", &[article("2", "Brown", "Mice")]),
    ];
    let mut config = config(&dir, inputs, DimensionPolicy::Strict);
    config.max_files = Some(1);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.total_files, 1);
    assert_eq!(count(&config, Table::Paper), 1);
}

#[test]
fn no_inputs_creates_empty_store() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let config = config(&dir, Vec::new(), DimensionPolicy::Strict);

    let summary = run(&config, &ProgressContext::hidden()).unwrap();

    assert_eq!(summary.total_files, 0);
    assert!(config.db_path.exists());
    assert_eq!(count(&config, Table::Paper), 0);
}
