//! End-to-end tests for the merge flow
//!
//! These drive the public library API the way the binary does:
//! configuration -> selector -> plan -> run, with a mock engine standing in
//! for the batch engine (and `sh` on unix for one real subprocess run).

use chrono::NaiveDate;
use filemerge::config::Config;
use filemerge::engine::MockEngineRunner;
use filemerge::job::MergeJobSpec;
use filemerge::merge::{MergeError, MergeService};
use filemerge::runner::RunError;
use filemerge::selector::{Selector, SelectorError, SelectorParams};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const CAMUS_CONFIG: &str = r#"
[naming]
year = "d_%Y"
month = "d_%Y%m"
day = "d_%Y%m%d"

[job]
default_reducers = 8
"#;

fn config(toml_content: &str, scripts_dir: &Path) -> Config {
    let mut config: Config = toml::from_str(toml_content).unwrap();
    config.runner.scripts_dir = scripts_dir.to_path_buf();
    config
}

fn spec(codec: Option<&str>, dry_run: bool) -> MergeJobSpec {
    MergeJobSpec::builder()
        .topic("clickstream")
        .input_prefix("/data/camus/clickstream/hourly/")
        .output_prefix("/data/merged/clickstream")
        .queue("etl")
        .reducer_count(8)
        .maybe_codec(codec)
        .dry_run(dry_run)
        .build()
}

fn selector(params: SelectorParams) -> Selector {
    Selector::from_params(params, NaiveDate::from_ymd_opt(2016, 3, 10).unwrap()).unwrap()
}

fn write_manifest(dir: &Path, lines: &str) -> std::path::PathBuf {
    let path = dir.join("dirs.txt");
    fs::write(&path, lines).unwrap();
    path
}

#[tokio::test]
async fn test_dry_run_document_matches_submitted_document() {
    let temp_dir = TempDir::new().unwrap();
    let scripts = temp_dir.path().join("scripts");
    let config = config(CAMUS_CONFIG, &scripts);
    let window = selector(SelectorParams {
        window: Some(3),
        ..SelectorParams::default()
    });

    let dry_engine = MockEngineRunner::new();
    let dry = MergeService::from_config(&config, Arc::new(dry_engine.clone())).unwrap();
    let dry_report = dry
        .execute(&window, &spec(Some("lzo"), true), false)
        .await
        .unwrap();
    assert_eq!(dry_engine.call_count(), 0);

    let engine = MockEngineRunner::new();
    let live = MergeService::from_config(&config, Arc::new(engine.clone())).unwrap();
    live.execute(&window, &spec(Some("lzo"), false), false)
        .await
        .unwrap();

    let submitted: Vec<String> = engine
        .invocations()
        .into_iter()
        .map(|call| call.document.unwrap())
        .collect();
    let kept: Vec<String> = dry_report
        .outcomes()
        .iter()
        .map(|outcome| {
            let result = outcome.result.as_ref().unwrap();
            assert!(result.dry_run);
            fs::read_to_string(&result.script_path).unwrap()
        })
        .collect();

    assert_eq!(kept.len(), 3);
    assert_eq!(kept, submitted);

    // Only the dry-run documents remain on disk
    assert_eq!(fs::read_dir(&scripts).unwrap().count(), 3);
}

#[tokio::test]
async fn test_manifest_fans_out_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(CAMUS_CONFIG, &temp_dir.path().join("scripts"));
    let manifest = write_manifest(temp_dir.path(), "d_20150225\n\nd_20160309\nd_20150728\n");

    let engine = MockEngineRunner::new();
    let service = MergeService::from_config(&config, Arc::new(engine.clone())).unwrap();
    let documents = service
        .plan(
            &selector(SelectorParams {
                manifest: Some(manifest),
                ..SelectorParams::default()
            }),
            &spec(None, false),
            true,
        )
        .unwrap();

    let outputs: Vec<&str> = documents.iter().map(|doc| doc.output_path()).collect();
    assert_eq!(
        outputs,
        [
            "/data/merged/clickstream/d_20150225",
            "/data/merged/clickstream/d_20160309",
            "/data/merged/clickstream/d_20150728",
        ]
    );
    assert_eq!(
        documents[0].input_path(),
        "/data/camus/clickstream/hourly/d_20150225*"
    );
    assert_eq!(engine.call_count(), 0);
}

#[tokio::test]
async fn test_month_selector_with_camus_names() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(CAMUS_CONFIG, &temp_dir.path().join("scripts"));
    let engine = MockEngineRunner::new();
    let service = MergeService::from_config(&config, Arc::new(engine.clone())).unwrap();

    let february = selector(SelectorParams {
        year: Some(2015),
        month: Some(2),
        ..SelectorParams::default()
    });
    let report = service
        .execute(&february, &spec(Some("gzip"), false), false)
        .await
        .unwrap();

    assert_eq!(report.total(), 28);
    let calls = engine.invocations();
    assert_eq!(calls.len(), 28);

    let first = calls[0].document.as_deref().unwrap();
    assert!(first.contains("-- clickstream: merge of d_20150201\n"));
    assert!(first.contains("set output.compression.codec org.apache.hadoop.io.compress.GzipCodec\n"));
    let last = calls[27].document.as_deref().unwrap();
    assert!(last.contains("store B into '/data/merged/clickstream/d_20150228';"));
}

#[tokio::test]
async fn test_failure_does_not_stop_later_directories() {
    let temp_dir = TempDir::new().unwrap();
    let scripts = temp_dir.path().join("scripts");
    let config = config(CAMUS_CONFIG, &scripts);
    let manifest = write_manifest(temp_dir.path(), "d_20160301\nd_20160302\nd_20160303\n");

    let engine = MockEngineRunner::new();
    engine.fail_when_document_contains("merge of d_20160302", 4);
    let service = MergeService::from_config(&config, Arc::new(engine.clone())).unwrap();
    let by_manifest = selector(SelectorParams {
        manifest: Some(manifest),
        ..SelectorParams::default()
    });

    let result = service.execute(&by_manifest, &spec(None, false), false).await;
    assert!(matches!(
        result,
        Err(MergeError::JobsFailed {
            failed: 1,
            total: 3
        })
    ));
    assert_eq!(engine.call_count(), 3);

    let report = service
        .execute_report(&by_manifest, &spec(None, false), false)
        .await
        .unwrap();
    let (directory, error) = report.failures().next().unwrap();
    assert_eq!(directory, "d_20160302");
    assert!(matches!(
        error,
        RunError::JobExecution {
            exit_code: Some(4),
            ..
        }
    ));

    // Temporary documents are gone whatever the exit status
    assert_eq!(fs::read_dir(&scripts).unwrap().count(), 0);
}

#[test]
fn test_ambiguous_selector_is_rejected() {
    let result = Selector::from_params(
        SelectorParams {
            year: Some(2016),
            window: Some(7),
            ..SelectorParams::default()
        },
        NaiveDate::from_ymd_opt(2016, 3, 10).unwrap(),
    );
    assert!(matches!(result, Err(SelectorError::Ambiguous(_))));
}

#[tokio::test]
async fn test_missing_manifest_fails_before_any_run() {
    let temp_dir = TempDir::new().unwrap();
    let scripts = temp_dir.path().join("scripts");
    let config = config(CAMUS_CONFIG, &scripts);
    let engine = MockEngineRunner::new();
    let service = MergeService::from_config(&config, Arc::new(engine.clone())).unwrap();

    let result = service
        .execute(
            &selector(SelectorParams {
                manifest: Some(temp_dir.path().join("missing.txt")),
                ..SelectorParams::default()
            }),
            &spec(None, false),
            false,
        )
        .await;

    assert!(matches!(
        result,
        Err(MergeError::Selector(SelectorError::ManifestRead { .. }))
    ));
    assert_eq!(engine.call_count(), 0);
    assert!(!scripts.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_real_engine_process() {
    use filemerge::engine::TokioEngineRunner;

    let temp_dir = TempDir::new().unwrap();
    let scripts = temp_dir.path().join("scripts");
    let toml_content = r#"
[template]
skeleton = """
echo "@INPUT_PATH -> @OUTPUT_PATH"
test "@DIRECTORY" != "bad"
"""

[engine]
program = "sh"
args = ["{job}"]

[runner]
extension = "sh"
"#;
    let config = config(toml_content, &scripts);
    let manifest = write_manifest(temp_dir.path(), "good\nbad\n");

    let service = MergeService::from_config(&config, Arc::new(TokioEngineRunner::new())).unwrap();
    let spec = MergeJobSpec::builder()
        .topic("events")
        .input_prefix("/in")
        .output_prefix("/out")
        .queue("default")
        .reducer_count(1)
        .build();

    let report = service
        .execute_report(
            &selector(SelectorParams {
                manifest: Some(manifest),
                ..SelectorParams::default()
            }),
            &spec,
            false,
        )
        .await
        .unwrap();

    assert_eq!(report.total(), 2);
    let good = report.outcomes()[0].result.as_ref().unwrap();
    assert_eq!(good.stdout.trim(), "/in/good* -> /out/good");
    assert!(matches!(
        report.outcomes()[1].result,
        Err(RunError::JobExecution {
            exit_code: Some(1),
            ..
        })
    ));
    assert_eq!(fs::read_dir(&scripts).unwrap().count(), 0);
}
