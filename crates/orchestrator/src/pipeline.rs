use std::sync::Arc;

use generation::Generator;
use pagewright_core::{
    CallbackPayload, DeploymentResult, GenerationResult, TaskRequest, TaskStatus,
};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::notify::Notifier;
use crate::pages::PagesPublisher;
use crate::repo::RepositoryManager;
use crate::safety::{LengthRatioPolicy, SafetyPolicy, SafetyVerdict};
use crate::state_machine::PipelineStateMachine;
use crate::store::TaskStore;

/// Drives one accepted task from `Received` to a terminal state.
///
/// Stages run strictly sequentially; any stage failure is terminal for
/// that task only. Whatever the outcome, exactly one notification is
/// attempted against the evaluation URL, and its own failure never
/// re-enters the state machine.
pub struct TaskOrchestrator {
    generator: Arc<dyn Generator>,
    repos: RepositoryManager,
    pages: PagesPublisher,
    notifier: Arc<dyn Notifier>,
    safety: Arc<dyn SafetyPolicy>,
    store: TaskStore,
}

impl TaskOrchestrator {
    pub fn new(
        generator: Arc<dyn Generator>,
        repos: RepositoryManager,
        pages: PagesPublisher,
        notifier: Arc<dyn Notifier>,
        store: TaskStore,
    ) -> Self {
        Self {
            generator,
            repos,
            pages,
            notifier,
            safety: Arc::new(LengthRatioPolicy::default()),
            store,
        }
    }

    pub fn with_safety_policy(mut self, policy: Arc<dyn SafetyPolicy>) -> Self {
        self.safety = policy;
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Run the pipeline for one task. Never returns an error: the
    /// terminal outcome is reported through the callback and the logs,
    /// since the caller that submitted the task was acknowledged long
    /// before this finishes.
    pub async fn run(&self, request: TaskRequest) {
        let _guard = self.store.begin();
        self.store.record_received(&request);

        info!(task = %request.task, round = request.round, "Task accepted");

        let machine = PipelineStateMachine::new(request.round);
        let mut status = TaskStatus::Received;
        let outcome = self.execute(&request, &machine, &mut status).await;

        match outcome {
            Ok(deployment) => {
                self.advance(&machine, &mut status, TaskStatus::Notifying);
                let payload = CallbackPayload::success(&request, &deployment);
                self.notifier.notify(&request.evaluation_url, &payload).await;
                self.advance(&machine, &mut status, TaskStatus::Done);
                info!(
                    task = %request.task,
                    round = request.round,
                    pages_url = %deployment.pages_url,
                    "Task done"
                );
            }
            Err(e) => {
                error!(task = %request.task, round = request.round, "Pipeline failed: {}", e);
                self.advance(&machine, &mut status, TaskStatus::Failed);
                let payload = CallbackPayload::failure(&request, e.to_string());
                self.notifier.notify(&request.evaluation_url, &payload).await;
            }
        }
    }

    async fn execute(
        &self,
        request: &TaskRequest,
        machine: &PipelineStateMachine,
        status: &mut TaskStatus,
    ) -> Result<DeploymentResult> {
        self.advance_checked(machine, status, TaskStatus::Generating)?;

        let (handle, result) = if request.is_update() {
            // The prior artifact lives in the existing repository.
            // Absence is fatal here and never falls back to creation.
            let handle = self
                .repos
                .ensure_repository(&request.task, request.round)
                .await?;
            let previous = match self.repos.fetch_entry(&handle).await? {
                Some(content) => content,
                None => {
                    warn!(
                        task = %request.task,
                        "Repository has no entry file, treating prior content as empty"
                    );
                    String::new()
                }
            };

            let candidate = self
                .generator
                .generate_update(&previous, &request.brief)
                .await?;

            self.advance_checked(machine, status, TaskStatus::SafetyCheck)?;
            let result = self.apply_safety(request, &previous, candidate);
            (handle, result)
        } else {
            let result = self
                .generator
                .generate_new(&request.brief, &request.attachments)
                .await?;
            let handle = self
                .repos
                .ensure_repository(&request.task, request.round)
                .await?;
            (handle, result)
        };

        self.advance_checked(machine, status, TaskStatus::Committing)?;
        let commit_sha = self.repos.publish(&handle, &result, request.round).await?;

        self.advance_checked(machine, status, TaskStatus::Deploying)?;
        let pages_url = self.pages.ensure_published(&handle).await?;

        Ok(DeploymentResult {
            repo_url: handle.html_url.clone(),
            commit_sha,
            pages_url,
        })
    }

    fn apply_safety(
        &self,
        request: &TaskRequest,
        previous: &str,
        candidate: GenerationResult,
    ) -> GenerationResult {
        let entry = candidate.entry_content().unwrap_or_default();
        match self.safety.evaluate(previous, entry) {
            SafetyVerdict::Accepted => candidate,
            SafetyVerdict::Rejected => {
                warn!(
                    task = %request.task,
                    round = request.round,
                    previous_len = previous.len(),
                    candidate_len = entry.len(),
                    "Update rejected as destructive, keeping the previous version"
                );
                GenerationResult::preserving(previous)
            }
        }
    }

    fn advance_checked(
        &self,
        machine: &PipelineStateMachine,
        status: &mut TaskStatus,
        to: TaskStatus,
    ) -> Result<()> {
        machine.validate_transition(status, &to)?;
        *status = to;
        self.store.set_status(to);
        Ok(())
    }

    fn advance(&self, machine: &PipelineStateMachine, status: &mut TaskStatus, to: TaskStatus) {
        if let Err(e) = self.advance_checked(machine, status, to) {
            warn!("Skipping status update: {}", e);
        }
    }
}
