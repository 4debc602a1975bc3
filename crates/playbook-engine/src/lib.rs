pub mod backend;
pub mod executor;
pub mod report;
pub mod scope;

pub use backend::{
    load_mock_store_from_path, ActionBackend, ActionBackendRegistration, ActionError,
    ActionMockScenario, ActionResult, ActionRouter, MockActionStore, MockScenarioCase,
    MockStoreError,
};
pub use executor::{
    CancelHandle, ExecError, Execution, ExecutionOptions, ExecutionOutcome, ExecutionStatus,
    IterationFailurePolicy, DEPENDENCY_TIMEOUT_MESSAGE,
};
pub use report::{annotate_nodes, ForIterationReport, NodeState, NodeStatusReport};
pub use scope::{
    ActionExecState, ForExecState, ForIteration, IfExecState, LookupError, Scope, ScopeStack,
};
