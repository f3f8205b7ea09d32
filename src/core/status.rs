//! Request lifecycle status and the pipeline view derived from it.
//!
//! The status only exists to give the user feedback while a request is in
//! flight. The presentation layer turns it into a row of pipeline stages via
//! [`stage_state`]; nothing else depends on it for correctness.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleStatus {
    #[default]
    Idle,
    /// Input captured and appended to the transcript.
    Formatted,
    /// Prompt assembled, connecting to the remote API.
    Sending,
    /// Waiting on the remote model. Local-only, the API reports no progress.
    Processing,
    /// Reply received and being appended.
    Receiving,
}

impl LifecycleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleStatus::Idle => "idle",
            LifecycleStatus::Formatted => "formatted",
            LifecycleStatus::Sending => "sending",
            LifecycleStatus::Processing => "processing",
            LifecycleStatus::Receiving => "receiving",
        }
    }

    pub fn is_idle(self) -> bool {
        self == LifecycleStatus::Idle
    }

    /// Short human-readable caption for status lines.
    pub fn caption(self) -> &'static str {
        match self {
            LifecycleStatus::Idle => "Ready",
            LifecycleStatus::Formatted => "Input captured",
            LifecycleStatus::Sending => "Connecting to API",
            LifecycleStatus::Processing => "Model is thinking",
            LifecycleStatus::Receiving => "Rendering response",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nodes of the request pipeline indicator, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    UserInput,
    Request,
    Model,
    Response,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 4] = [
        PipelineStage::UserInput,
        PipelineStage::Request,
        PipelineStage::Model,
        PipelineStage::Response,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PipelineStage::UserInput => "User Input",
            PipelineStage::Request => "API Request",
            PipelineStage::Model => "Gemini Model",
            PipelineStage::Response => "Response",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageState {
    Idle,
    /// Stage has been passed in the current request.
    Active,
    /// Stage is the one currently doing work.
    Working,
    Done,
}

pub fn stage_state(status: LifecycleStatus, stage: PipelineStage) -> StageState {
    use LifecycleStatus as S;

    if status.is_idle() {
        return StageState::Idle;
    }

    match stage {
        PipelineStage::UserInput => StageState::Active,
        PipelineStage::Request => match status {
            S::Sending => StageState::Working,
            S::Processing | S::Receiving => StageState::Active,
            _ => StageState::Idle,
        },
        PipelineStage::Model => match status {
            S::Processing => StageState::Working,
            S::Receiving => StageState::Active,
            _ => StageState::Idle,
        },
        PipelineStage::Response => match status {
            S::Receiving => StageState::Done,
            _ => StageState::Idle,
        },
    }
}

/// Stage states for every pipeline node, in display order.
pub fn pipeline(status: LifecycleStatus) -> [(PipelineStage, StageState); 4] {
    PipelineStage::ALL.map(|stage| (stage, stage_state(status, stage)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_status_leaves_every_stage_idle() {
        for (_, state) in pipeline(LifecycleStatus::Idle) {
            assert_eq!(state, StageState::Idle);
        }
    }

    #[test]
    fn stage_table_matches_status_progression() {
        use LifecycleStatus as S;
        use StageState::*;

        let expected = [
            (S::Formatted, [Active, Idle, Idle, Idle]),
            (S::Sending, [Active, Working, Idle, Idle]),
            (S::Processing, [Active, Active, Working, Idle]),
            (S::Receiving, [Active, Active, Active, Done]),
        ];

        for (status, states) in expected {
            let actual: Vec<StageState> =
                pipeline(status).iter().map(|(_, state)| *state).collect();
            assert_eq!(actual, states.to_vec(), "status {status}");
        }
    }

    #[test]
    fn default_status_is_idle() {
        assert!(LifecycleStatus::default().is_idle());
        assert_eq!(LifecycleStatus::Processing.to_string(), "processing");
    }
}
