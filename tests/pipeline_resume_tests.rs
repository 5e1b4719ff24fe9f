/// State machine behavior with mock executors: stage ordering,
/// checkpointing, resume-skip semantics, and fail-fast resume validation.
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use fabula::pipeline::{
    AnalysisConfig, CheckpointStore, ConfigureDeps, ConfigureExecutor, Executors, Narrative,
    Pipeline, PipelineOptions, ReportDeps, ReportExecutor, SearchDeps, SearchExecutor, SearchHit,
    Stage,
};
use fabula::FabulaError;

#[derive(Default, Clone)]
struct Counters {
    configure: Arc<AtomicUsize>,
    search: Arc<AtomicUsize>,
    report: Arc<AtomicUsize>,
}

struct MockConfigure {
    calls: Arc<AtomicUsize>,
    database: String,
    fail: bool,
}

#[async_trait]
impl ConfigureExecutor for MockConfigure {
    async fn run(&self, _deps: ConfigureDeps) -> anyhow::Result<AnalysisConfig> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("configure service unavailable");
        }
        Ok(AnalysisConfig {
            database: self.database.clone(),
            ..Default::default()
        })
    }
}

struct MockSearch {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl SearchExecutor for MockSearch {
    async fn run(&self, deps: SearchDeps) -> anyhow::Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("search service unavailable");
        }
        Ok(vec![SearchHit {
            subject_id: "sp|P99999|TEST".to_string(),
            description: format!("hit against {}", deps.analysis_config.database),
            percent_identity: 98.2,
            alignment_length: 120,
            evalue: 1e-30,
            bit_score: 240.0,
        }])
    }
}

struct MockReport {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ReportExecutor for MockReport {
    async fn run(&self, deps: ReportDeps) -> anyhow::Result<Narrative> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Narrative {
            headline: format!("{} hit(s) found", deps.search_results.len()),
            body: "The query matches a known test protein.".to_string(),
        })
    }
}

fn mock_pipeline(counters: &Counters, database: &str, fail_search: bool) -> Pipeline {
    Pipeline::new(Executors {
        configure: Box::new(MockConfigure {
            calls: counters.configure.clone(),
            database: database.to_string(),
            fail: false,
        }),
        search: Box::new(MockSearch {
            calls: counters.search.clone(),
            fail: fail_search,
        }),
        report: Box::new(MockReport {
            calls: counters.report.clone(),
        }),
    })
}

fn query_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("query.fasta");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(b">q1\nATGAAATTTGGGCCC\n").unwrap();
    path
}

fn options_for(query: PathBuf) -> PipelineOptions {
    PipelineOptions {
        query,
        question: "what is this sequence?".to_string(),
        database: "nr".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn full_run_executes_every_stage_once_and_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let counters = Counters::default();

    let pipeline = mock_pipeline(&counters, "nr", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap());

    let state = pipeline.run(options_for(query_fixture(&dir))).await.unwrap();

    assert_eq!(counters.configure.load(Ordering::SeqCst), 1);
    assert_eq!(counters.search.load(Ordering::SeqCst), 1);
    assert_eq!(counters.report.load(Ordering::SeqCst), 1);

    assert!(state.fasta_sketch.is_some());
    assert!(state.analysis_config.is_some());
    assert_eq!(state.search_results.as_ref().unwrap().len(), 1);
    assert_eq!(state.narrative.unwrap().headline, "1 hit(s) found");

    for stage in Stage::ALL {
        assert!(
            state_dir.join(format!("{}.json", stage.name())).exists(),
            "missing checkpoint for {}",
            stage
        );
    }
}

#[tokio::test]
async fn run_without_checkpoint_store_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let counters = Counters::default();

    let state = mock_pipeline(&counters, "nr", false)
        .run(options_for(query_fixture(&dir)))
        .await
        .unwrap();

    assert!(state.narrative.is_some());
}

#[tokio::test]
async fn resume_at_search_reuses_config_and_skips_configure() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let query = query_fixture(&dir);

    // First run writes checkpoints with a distinctive configured database
    let first = Counters::default();
    mock_pipeline(&first, "first-run-db", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap())
        .run(options_for(query.clone()))
        .await
        .unwrap();

    // A second pipeline whose configure executor would answer differently
    let second = Counters::default();
    let pipeline = mock_pipeline(&second, "second-run-db", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap());

    let state = pipeline
        .resume(options_for(query), Stage::Search)
        .await
        .unwrap();

    // The configure stage did not run again; its prior result was reused
    assert_eq!(second.configure.load(Ordering::SeqCst), 0);
    assert_eq!(second.search.load(Ordering::SeqCst), 1);
    assert_eq!(second.report.load(Ordering::SeqCst), 1);
    assert_eq!(
        state.analysis_config.as_ref().unwrap().database,
        "first-run-db"
    );
    assert!(state.fasta_sketch.is_some());
}

#[tokio::test]
async fn resume_replaces_options_with_fresh_ones() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let query = query_fixture(&dir);

    let counters = Counters::default();
    mock_pipeline(&counters, "db", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap())
        .run(options_for(query.clone()))
        .await
        .unwrap();

    let mut new_options = options_for(query);
    new_options.question = "a different question".to_string();

    let state = mock_pipeline(&Counters::default(), "db", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap())
        .resume(new_options, Stage::Report)
        .await
        .unwrap();

    assert_eq!(state.options.question, "a different question");
}

#[tokio::test]
async fn resume_with_missing_prerequisites_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("empty-state");
    let counters = Counters::default();

    let pipeline = mock_pipeline(&counters, "nr", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap());

    let err = pipeline
        .resume(options_for(query_fixture(&dir)), Stage::Report)
        .await
        .unwrap_err();

    assert!(matches!(err, FabulaError::ResumeContract { .. }));
    // No executor was invoked
    assert_eq!(counters.configure.load(Ordering::SeqCst), 0);
    assert_eq!(counters.search.load(Ordering::SeqCst), 0);
    assert_eq!(counters.report.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resume_without_store_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = mock_pipeline(&Counters::default(), "nr", false)
        .resume(options_for(query_fixture(&dir)), Stage::Search)
        .await
        .unwrap_err();

    assert!(matches!(err, FabulaError::Config(_)));
}

#[tokio::test]
async fn failed_stage_is_fatal_but_prior_checkpoints_survive() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let query = query_fixture(&dir);

    let counters = Counters::default();
    let err = mock_pipeline(&counters, "nr", true)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap())
        .run(options_for(query.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, FabulaError::Stage { .. }));
    assert!(err.to_string().contains("search"));

    assert!(state_dir.join("configure.json").exists());
    assert!(!state_dir.join("search.json").exists());

    // Once the underlying cause is fixed, the run resumes where it stopped
    let retry = Counters::default();
    let state = mock_pipeline(&retry, "nr", false)
        .with_checkpoints(CheckpointStore::new(&state_dir).unwrap())
        .resume(options_for(query), Stage::Search)
        .await
        .unwrap();

    assert_eq!(retry.configure.load(Ordering::SeqCst), 0);
    assert!(state.narrative.is_some());
}

#[tokio::test]
async fn run_single_executes_exactly_one_stage() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let query = query_fixture(&dir);

    let counters = Counters::default();
    let store = CheckpointStore::new(&state_dir).unwrap();
    let pipeline = mock_pipeline(&counters, "nr", false).with_checkpoints(store.clone());

    // Sketch alone
    let state = pipeline
        .run_single(
            fabula::pipeline::PipelineState::new(options_for(query)),
            Stage::Sketch,
        )
        .await
        .unwrap();

    assert!(state.fasta_sketch.is_some());
    assert!(state.analysis_config.is_none());
    assert_eq!(counters.configure.load(Ordering::SeqCst), 0);
    assert!(state_dir.join("sketch.json").exists());

    // Configure picks up from the sketched state
    let state = pipeline.run_single(state, Stage::Configure).await.unwrap();
    assert!(state.analysis_config.is_some());
    assert!(state.search_results.is_none());
    assert_eq!(counters.configure.load(Ordering::SeqCst), 1);
}
