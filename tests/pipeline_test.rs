use std::fs;
use std::path::{Path, PathBuf};

use mca_reconcile::config::{PipelineConfig, SourceSpec};
use mca_reconcile::schema::ColumnAliasRegistry;
use mca_reconcile::{Pipeline, PipelineError};

fn setup(name: &str) -> (PathBuf, PathBuf) {
    let root = std::env::temp_dir().join(format!("mca_reconcile_it_{}", name));
    let _ = fs::remove_dir_all(&root);
    let raw = root.join("raw");
    let out = root.join("processed");
    fs::create_dir_all(&raw).unwrap();
    (raw, out)
}

fn write_csv(dir: &Path, filename: &str, content: &str) {
    fs::write(dir.join(filename), content).unwrap();
}

fn config_with(raw: &Path, out: &Path, sources: &[(&str, &str)]) -> PipelineConfig {
    let mut config = PipelineConfig::new(raw, out);
    config.sources = sources
        .iter()
        .map(|(id, filename)| SourceSpec::new(*id, *filename))
        .collect();
    config
}

/// Read the canonical dataset back as (header, rows of strings).
fn read_dataset(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

fn column<'a>(header: &[String], rows: &'a [Vec<String>], name: &str) -> Vec<&'a str> {
    let idx = header.iter().position(|h| h == name).unwrap();
    rows.iter().map(|r| r[idx].as_str()).collect()
}

#[tokio::test]
async fn cin_collision_across_sources_keeps_first_processed() {
    // Scenario A: same CIN in two sources; the first-processed source wins.
    let (raw, out) = setup("scenario_a");
    write_csv(&raw, "one.csv", "CIN,Company Name\nU1,Acme\n");
    write_csv(&raw, "two.csv", "CIN,Company Name\nU1,Acme Ltd\n");

    let config = config_with(&raw, &out, &[("source_one", "one.csv"), ("source_two", "two.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.total_records, 1);
    assert_eq!(outcome.duplicates_removed, 1);

    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    assert_eq!(column(&header, &rows, "CompanyName"), vec!["Acme"]);
    assert_eq!(column(&header, &rows, "SourceIdentifier"), vec!["Source_One"]);
}

#[tokio::test]
async fn missing_source_is_skipped_not_fatal() {
    // Scenario B: one configured file absent; the run completes on the rest.
    let (raw, out) = setup("scenario_b");
    write_csv(&raw, "present.csv", "CIN,Company Name\nU1,Acme\nU2,Beta\n");

    let config = config_with(
        &raw,
        &out,
        &[("present", "present.csv"), ("absent", "absent.csv")],
    );
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.total_records, 2);
    assert_eq!(outcome.skipped_sources, vec!["absent".to_string()]);
    assert!(outcome.artifacts.dataset.is_file());
}

#[tokio::test]
async fn all_sources_missing_aborts_before_any_artifact() {
    // Scenario C: nothing loads; fatal NoSourcesLoaded, no output written.
    let (raw, out) = setup("scenario_c");

    let config = config_with(&raw, &out, &[("a", "a.csv"), ("b", "b.csv")]);
    let err = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::NoSourcesLoaded));
    assert!(!out.join("master_companies.csv").exists());
    assert!(!out.join("data_quality_report.json").exists());
    assert!(!out.join("change_log.json").exists());
}

#[tokio::test]
async fn negative_capital_is_flagged_and_retained() {
    // Scenario D: AuthorizedCapital = -500 survives and is reported.
    let (raw, out) = setup("scenario_d");
    write_csv(&raw, "one.csv", "CIN,Company Name,Auth_Capital\nU9,Oddity,-500\n");

    let config = config_with(&raw, &out, &[("one", "one.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.total_records, 1);
    assert!(outcome.quality_report.negative_authorized_capital >= 1);

    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    assert_eq!(column(&header, &rows, "AuthorizedCapital"), vec!["-500"]);
}

#[tokio::test]
async fn aliased_capital_column_is_populated() {
    // Scenario E: raw "Auth_Capital" maps to AuthorizedCapital.
    let (raw, out) = setup("scenario_e");
    write_csv(&raw, "one.csv", "CIN,Auth_Capital\nU1,100000\n");

    let config = config_with(&raw, &out, &[("one", "one.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    assert_eq!(column(&header, &rows, "AuthorizedCapital"), vec!["100000"]);
    assert_eq!(
        outcome.quality_report.data_completeness["CIN"].completeness_percentage,
        100.0
    );
}

#[tokio::test]
async fn state_is_forced_to_source_identity() {
    // The raw State column is overridden by the source's declared identity.
    let (raw, out) = setup("state_override");
    write_csv(
        &raw,
        "tn.csv",
        "CIN,Company Name,State\nU1,Acme,Karnataka\nU2,Beta,Kerala\n",
    );

    let config = config_with(&raw, &out, &[("tamil_nadu", "tn.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    assert_eq!(
        column(&header, &rows, "State"),
        vec!["Tamil_Nadu", "Tamil_Nadu"]
    );
    assert_eq!(outcome.quality_report.state_distribution["Tamil_Nadu"], 2);
}

#[cfg(unix)]
#[tokio::test]
async fn load_timeout_is_a_source_level_skip() {
    let (raw, out) = setup("timeout_skip");
    write_csv(&raw, "fast.csv", "CIN,Company Name\nU1,Acme\n");
    // A named pipe with no writer blocks its reader indefinitely; the
    // bounded per-source timeout must turn that into a skip, not a hang.
    let stalled = raw.join("stalled.csv");
    let status = std::process::Command::new("mkfifo")
        .arg(&stalled)
        .status()
        .unwrap();
    assert!(status.success());

    let mut config = config_with(
        &raw,
        &out,
        &[("stalled", "stalled.csv"), ("fast", "fast.csv")],
    );
    config.load_timeout_secs = 1;

    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    // The stalled source is abandoned (its blocked read is not cancelled);
    // the run itself completes on the remaining source.
    assert_eq!(outcome.skipped_sources, vec!["stalled".to_string()]);
    assert_eq!(outcome.total_records, 1);

    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    assert_eq!(column(&header, &rows, "SourceIdentifier"), vec!["Fast"]);

    // Connect a writer so the abandoned reader sees EOF and its worker
    // thread can be joined at runtime shutdown.
    drop(fs::OpenOptions::new().write(true).open(&stalled).unwrap());
}

#[tokio::test]
async fn unsupported_format_is_a_source_level_skip() {
    let (raw, out) = setup("bad_format");
    write_csv(&raw, "good.csv", "CIN,Company Name\nU1,Acme\n");
    write_csv(&raw, "bad.xlsx", "CIN,Company Name\nU2,Beta\n");

    let config = config_with(&raw, &out, &[("good", "good.csv"), ("bad", "bad.xlsx")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.total_records, 1);
    assert_eq!(outcome.skipped_sources, vec!["bad".to_string()]);
}

#[tokio::test]
async fn merged_counts_never_exceed_inputs() {
    let (raw, out) = setup("counts");
    write_csv(&raw, "one.csv", "CIN,Company Name\nU1,Acme\nU1,Acme\nU2,Beta\n");
    write_csv(&raw, "two.csv", "CIN,Company Name\nU2,Beta Corp\nU3,Gamma\n");

    let config = config_with(&raw, &out, &[("one", "one.csv"), ("two", "two.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    // 5 input rows, U1 exact-duplicated once and U2 collapsing across sources.
    assert!(outcome.total_records <= 5);
    assert_eq!(outcome.total_records, 3);
    assert_eq!(outcome.duplicates_removed, 2);

    // Non-null CINs are unique after deduplication.
    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    let mut cins: Vec<&str> = column(&header, &rows, "CIN")
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect();
    cins.sort_unstable();
    let before = cins.len();
    cins.dedup();
    assert_eq!(cins.len(), before);
}

#[tokio::test]
async fn provenance_is_populated_on_every_record() {
    let (raw, out) = setup("provenance");
    write_csv(&raw, "one.csv", "CIN\nU1\nU2\n");

    let config = config_with(&raw, &out, &[("gujarat", "one.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    let (header, rows) = read_dataset(&outcome.artifacts.dataset);
    for value in column(&header, &rows, "SourceIdentifier") {
        assert_eq!(value, "Gujarat");
    }
    let timestamps = column(&header, &rows, "LoadTimestamp");
    assert!(timestamps.iter().all(|t| !t.is_empty()));
    // One run-wide load instant per source.
    assert_eq!(timestamps[0], timestamps[1]);
}

#[tokio::test]
async fn change_log_embeds_quality_report() {
    let (raw, out) = setup("change_log");
    write_csv(&raw, "one.csv", "CIN,Company Name\nU1,Acme\nU1,Acme\n");

    let config = config_with(&raw, &out, &[("one", "one.csv")]);
    let outcome = Pipeline::new(config, ColumnAliasRegistry::builtin())
        .run()
        .await
        .unwrap();

    let body = fs::read_to_string(&outcome.artifacts.change_log).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["duplicates_removed"], 1);
    assert!(parsed["merge_timestamp"].is_string());
    assert_eq!(parsed["quality_report"]["total_records"], 1);
}
