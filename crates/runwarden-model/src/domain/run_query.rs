use super::{RunState, WorkflowId};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Query parameters for listing run records with filtering and pagination.
#[derive(Debug, Clone, Default)]
pub struct RunQuery {
    pub workflow: Option<WorkflowId>,
    pub state: Option<RunState>,
    pub limit: usize,
    pub offset: usize,
}

/// Result of a paginated run query.
#[derive(Debug, Clone)]
pub struct RunPage<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl RunQuery {
    pub fn new() -> Self {
        Self {
            workflow: None,
            state: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    pub fn with_workflow(mut self, workflow: impl Into<WorkflowId>) -> Self {
        self.workflow = Some(workflow.into());
        self
    }

    pub fn with_state(mut self, state: RunState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_LIMIT);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}
