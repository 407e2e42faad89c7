use std::fs;
use std::path::Path;

use coi_recon::ingest::{load_paper_db, load_reviewers, load_roster, load_submissions};
use coi_recon::report::{
    assignments_from_report, read_report, report_rows, write_assignments_file, write_report_file,
};
use coi_recon::{ConflictCategory, DeclarationParser, ParseErrorPolicy, ReconcileConfig, Reconciler};

const ROSTER: &str = "\
key,alias,alias
MIT,Massachusetts Institute of Technology,
ETHZ,ETH Zurich,ETH Zuerich
";

const SUBMISSIONS: &str = r#"[
    {
        "pid": 1,
        "title": "Fast Caches",
        "authors": [
            {"first": "John", "last": "Smith", "affiliation": "Massachusetts Institute of Technology"}
        ],
        "pc_conflicts": {"ada@example.org": "pinned"},
        "collaborators": "Jane Doe, Stanford",
        "topics": ["Caches"]
    },
    {
        "pid": 2,
        "title": "Broken Declaration",
        "authors": [{"first": "Eve", "last": "Adams"}],
        "collaborators": "Institution, Advisor, Students"
    },
    {
        "pid": 3,
        "title": "Compilers Again",
        "authors": [{"first": "Mary", "last": "Major", "affiliation": "ETH Zuerich"}]
    }
]"#;

const COMMITTEE: &str = "\
first,last,email,roles,tags,affiliation,collaborators,follow,topic
Ada,Lovelace,ada@example.org,pc,,Oxford,,,Caches
Jane,Doe,jane@example.org,pc,,Berkeley,,,
Grace,Hopper,grace@example.org,pc,,Navy,,,Compilers
Niklaus,Wirth,niklaus@example.org,pc,,ETH Zurich,,,Compilers
";

const PAPER_DB: &str = "\
email,id,first,last,keys,valid,pub_key,pub_title,pub_year,pub_authors
grace@example.org,3,Grace,Hopper,h/GraceHopper,x,conf/x/HS16,Ships,2016,Grace Hopper;John Smith
grace@example.org,3,Grace,Hopper,h/GraceHopper,x,conf/x/H01,Old Ships,2001,Grace Hopper;Mary Major
";

const CONFIG: &str = "\
on_parse_error = \"skip\"

[bibliography]
min_year = 2010
";

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_batch_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReconcileConfig::load(write(dir.path(), "coi.toml", CONFIG)).unwrap();
    assert_eq!(config.on_parse_error, ParseErrorPolicy::Skip);

    let parser = DeclarationParser::new(&config.parser).unwrap();
    let roster = load_roster(write(dir.path(), "institutions.csv", ROSTER)).unwrap();
    assert_eq!(roster.len(), 2);

    let mut submissions = load_submissions(
        write(dir.path(), "submissions.json", SUBMISSIONS),
        &parser,
        &roster,
        config.on_parse_error,
    )
    .unwrap();
    // Paper 2 has a pasted header in its declaration and is skipped.
    assert_eq!(submissions.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 3]);

    let mut reviewers = load_reviewers(
        write(dir.path(), "pc.csv", COMMITTEE),
        &parser,
        &roster,
        config.on_parse_error,
    )
    .unwrap();
    assert_eq!(reviewers.len(), 4);

    let accepted = load_paper_db(
        write(dir.path(), "papers.csv", PAPER_DB),
        &mut reviewers,
        &config.bibliography,
    )
    .unwrap();
    assert_eq!(accepted, 1);

    let summary = Reconciler::new(&reviewers).run(&mut submissions);
    assert_eq!(summary.submissions, 2);
    assert_eq!(summary.reviewers, 4);

    let first = submissions[0].classification();
    assert!(first.contains(ConflictCategory::ProperlyDeclared, "ada@example.org"));
    assert_eq!(first.unverifiable.len(), 2);
    assert!(first.contains(ConflictCategory::DeclaredInFreeText, "jane@example.org"));
    assert!(first.contains(ConflictCategory::FoundInBibliography, "grace@example.org"));
    assert!(first.categories_of("niklaus@example.org").is_empty());

    let third = submissions[1].classification();
    // Same institution under two spellings.
    assert!(third.contains(ConflictCategory::DeclaredByReviewer, "niklaus@example.org"));
    // The shared paper predates the cutoff.
    assert!(!third.contains(ConflictCategory::FoundInBibliography, "grace@example.org"));

    for category in ConflictCategory::ALL {
        let path = dir.path().join(format!("{category}.csv"));
        write_report_file(&path, &report_rows(&submissions, category)).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("valid,pid,email,reasons\n"));
    }

    let fake = read_report(fs::File::open(dir.path().join("fake_conflicts.csv")).unwrap()).unwrap();
    assert_eq!(fake.len(), 2);
    let upload = dir.path().join("upload.csv");
    write_assignments_file(&upload, &assignments_from_report(&fake)).unwrap();
    assert_eq!(
        fs::read_to_string(&upload).unwrap(),
        "paper,assignment,email\n1,conflict,ada@example.org\n1,conflict,jane@example.org\n"
    );
}

#[test]
fn abort_policy_fails_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let config = ReconcileConfig::default();
    let parser = DeclarationParser::new(&config.parser).unwrap();
    let roster = load_roster(write(dir.path(), "institutions.csv", ROSTER)).unwrap();

    let err = load_submissions(
        write(dir.path(), "submissions.json", SUBMISSIONS),
        &parser,
        &roster,
        config.on_parse_error,
    )
    .unwrap_err();
    assert!(err.is_parse());
    assert!(err.is_record_local());
}
