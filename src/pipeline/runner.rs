use tracing::{info, warn};

use crate::pipeline::executor::{
    ConfigureDeps, ConfigureExecutor, ReportDeps, ReportExecutor, SearchDeps, SearchExecutor,
    StageResult,
};
use crate::pipeline::stage::Stage;
use crate::pipeline::state::{CheckpointStore, PipelineOptions, PipelineState};
use crate::sketch::sketch_batch;
use crate::{FabulaError, Result};

/// The external executors a pipeline drives, one per LLM-backed stage.
pub struct Executors {
    pub configure: Box<dyn ConfigureExecutor>,
    pub search: Box<dyn SearchExecutor>,
    pub report: Box<dyn ReportExecutor>,
}

/// The pipeline state machine. Stages run strictly in order; after each
/// one the state is checkpointed (best effort) before the next begins.
pub struct Pipeline {
    executors: Executors,
    checkpoints: Option<CheckpointStore>,
}

impl Pipeline {
    pub fn new(executors: Executors) -> Self {
        Self {
            executors,
            checkpoints: None,
        }
    }

    pub fn with_checkpoints(mut self, store: CheckpointStore) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// Run the full pipeline from a fresh state.
    pub async fn run(&self, options: PipelineOptions) -> Result<PipelineState> {
        self.run_from(PipelineState::new(options), Stage::Sketch).await
    }

    /// Resume from the named stage, reloading prior results from the
    /// checkpoint store and replacing only the run options.
    pub async fn resume(&self, options: PipelineOptions, from: Stage) -> Result<PipelineState> {
        let store = self.checkpoints.as_ref().ok_or_else(|| {
            FabulaError::Config("resume requires a state directory".to_string())
        })?;

        let mut state = match store.load_latest_before(from)? {
            Some((checkpoint_stage, state)) => {
                info!(checkpoint = %checkpoint_stage, resume_at = %from, "loaded checkpoint");
                state
            }
            None => PipelineState::default(),
        };
        state.options = options;

        state.check_prerequisites(from)?;
        self.run_from(state, from).await
    }

    /// Run a single stage against existing state and return the updated
    /// state without advancing further.
    pub async fn run_single(&self, mut state: PipelineState, stage: Stage) -> Result<PipelineState> {
        state.check_prerequisites(stage)?;
        self.step(&mut state, stage).await?;
        Ok(state)
    }

    async fn run_from(&self, mut state: PipelineState, start: Stage) -> Result<PipelineState> {
        let mut current = Some(start);
        while let Some(stage) = current {
            self.step(&mut state, stage).await?;
            current = stage.next();
        }
        Ok(state)
    }

    async fn step(&self, state: &mut PipelineState, stage: Stage) -> Result<()> {
        info!(stage = %stage, "running stage");

        let result = match stage {
            Stage::Sketch => {
                let sketch = sketch_batch(std::slice::from_ref(&state.options.query));
                StageResult::Sketched(sketch)
            }
            Stage::Configure => {
                let deps = ConfigureDeps::from_state(state)?;
                let config = self
                    .executors
                    .configure
                    .run(deps)
                    .await
                    .map_err(|e| stage_error(stage, e))?;
                StageResult::Configured(config)
            }
            Stage::Search => {
                let deps = SearchDeps::from_state(state)?;
                let hits = self
                    .executors
                    .search
                    .run(deps)
                    .await
                    .map_err(|e| stage_error(stage, e))?;
                StageResult::Searched(hits)
            }
            Stage::Report => {
                let deps = ReportDeps::from_state(state)?;
                let narrative = self
                    .executors
                    .report
                    .run(deps)
                    .await
                    .map_err(|e| stage_error(stage, e))?;
                StageResult::Reported(narrative)
            }
        };

        state.apply(result);
        self.persist(stage, state);
        Ok(())
    }

    /// Checkpointing is best effort: a failed write is logged and never
    /// blocks the run.
    fn persist(&self, stage: Stage, state: &PipelineState) {
        if let Some(store) = &self.checkpoints {
            if let Err(e) = store.save(stage, state) {
                warn!(stage = %stage, error = %e, "failed to persist checkpoint");
            }
        }
    }
}

fn stage_error(stage: Stage, e: anyhow::Error) -> FabulaError {
    FabulaError::Stage {
        stage: stage.name().to_string(),
        message: format!("{:#}", e),
    }
}
