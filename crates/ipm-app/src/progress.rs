use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CollectingInputs,
    ReadingIpr,
    LoadingWellTests,
    TuningWells,
    OpeningNetwork,
    UpdatingNetwork,
    TuningPipelines,
    CalculatingBase,
    OptimizingChokes,
    CalculatingOptimized,
    SavingResults,
    Completed,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStage::LoadingProject => "loading project",
            RunStage::CollectingInputs => "collecting historian inputs",
            RunStage::ReadingIpr => "reading inflow from well models",
            RunStage::LoadingWellTests => "loading well tests",
            RunStage::TuningWells => "tuning well models",
            RunStage::OpeningNetwork => "opening network model",
            RunStage::UpdatingNetwork => "updating network model",
            RunStage::TuningPipelines => "tuning pipelines",
            RunStage::CalculatingBase => "calculating base output",
            RunStage::OptimizingChokes => "optimizing chokes",
            RunStage::CalculatingOptimized => "calculating optimized output",
            RunStage::SavingResults => "saving results",
            RunStage::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
        }
    }
}
