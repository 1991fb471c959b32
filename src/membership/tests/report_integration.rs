//! End-to-end report tests: snapshot in, CSV out

use groupscope_membership::directory::InMemoryDirectory;
use groupscope_membership::input::read_principals_csv;
use groupscope_membership::{
    group_info_table, user_info_table, CompareConfig, CsvSink, Depth, DifferenceEngine,
    InfoLookup, MembershipError, OverwritePolicy, Principal, ResultSink,
};
use groupscope_core::SinkError;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/corp.json")
}

async fn corp_directory() -> InMemoryDirectory {
    InMemoryDirectory::from_snapshot_file(fixture()).await.unwrap()
}

#[tokio::test]
async fn test_direct_comparison_to_csv() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("diff.csv");

    let engine = DifferenceEngine::new(corp_directory().await, CompareConfig::default());
    let diff = engine
        .compare(&[Principal::new("alice"), Principal::new("bob")])
        .await
        .unwrap();

    let mut sink = CsvSink::new(&out, OverwritePolicy::Refuse);
    sink.write_table(&diff.to_table()).await.unwrap();

    let written = tokio::fs::read_to_string(&out).await.unwrap();
    assert_eq!(
        written,
        "Group,alice,bob\ndbas,,bob\nvpn-users,alice,\n"
    );
}

#[tokio::test]
async fn test_transitive_comparison() {
    let config = CompareConfig {
        depth: Depth::Transitive,
        ..Default::default()
    };
    let engine = DifferenceEngine::new(corp_directory().await, config);
    let diff = engine
        .compare(&[Principal::new("alice"), Principal::new("bob"), Principal::new("carol")])
        .await
        .unwrap();

    // all-staff and engineering reach everyone through the cycle
    assert!(diff.row("all-staff").is_none());
    assert!(diff.row("engineering").is_none());
    assert_eq!(
        diff.group_names(),
        vec!["dbas", "developers", "legacy-app", "remote-access", "vpn-users"]
    );
    assert_eq!(diff.row("developers").unwrap().membership, vec![true, true, false]);
    assert_eq!(diff.row("legacy-app").unwrap().membership, vec![false, false, true]);
}

#[tokio::test]
async fn test_refuses_to_clobber_existing_output() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("report.csv");
    tokio::fs::write(&out, "keep me\n").await.unwrap();

    let lookup = InfoLookup::new(corp_directory().await, 4);
    let rows = lookup.groups(&[Principal::new("developers")], false).await.unwrap();

    let mut sink = CsvSink::new(&out, OverwritePolicy::Refuse);
    let err = sink.write_table(&group_info_table(&rows, false)).await.unwrap_err();
    assert!(matches!(err, SinkError::Exists(_)));
    assert_eq!(tokio::fs::read_to_string(&out).await.unwrap(), "keep me\n");

    let mut sink = CsvSink::new(&out, OverwritePolicy::Replace);
    sink.write_table(&group_info_table(&rows, false)).await.unwrap();
    let written = tokio::fs::read_to_string(&out).await.unwrap();
    assert!(written.starts_with("Group,Creation Date,Description,Category,Scope\n"));
    assert!(written.contains("developers,2018-01-15 09:00:00,Software developers,Security,Global"));
}

#[tokio::test]
async fn test_group_info_from_input_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("groups.csv");
    tokio::fs::write(&input, "Group\nengineering\nno-such-group\nall-staff\n")
        .await
        .unwrap();

    let names = read_principals_csv(&input, true).await.unwrap();
    let lookup = InfoLookup::new(corp_directory().await, 2);
    let rows = lookup.groups(&names, true).await.unwrap();
    let table = group_info_table(&rows, true);

    assert_eq!(table.len(), 3);
    assert_eq!(table.column("Group").unwrap(), vec!["engineering", "no-such-group", "all-staff"]);
    // developers, dbas and all-staff are direct members of engineering
    assert_eq!(table.rows[0][5], "3");
    assert!(table.rows[1][1..].iter().all(|cell| cell == "Not Found"));
    assert_eq!(table.rows[2][3], "Distribution");
}

#[tokio::test]
async fn test_user_info() {
    let lookup = InfoLookup::new(corp_directory().await, 2);
    let rows = lookup
        .users(&[Principal::new("carol"), Principal::new("developers")])
        .await
        .unwrap();
    let table = user_info_table(&rows);

    assert_eq!(table.rows[0][1], "Carol Danvers");
    assert_eq!(table.rows[0][5], "false");
    assert_eq!(table.rows[1][1], "Not Found");
}

#[tokio::test]
async fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let err = read_principals_csv(dir.path().join("absent.csv"), true)
        .await
        .unwrap_err();
    assert!(matches!(err, MembershipError::Input(_)));
}
