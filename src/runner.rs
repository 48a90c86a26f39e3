use log::{ debug, info, warn };
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{ sleep, Instant };
use tokio_util::sync::CancellationToken;

use crate::error::AssistantError;
use crate::models::chat::{ Message, MessageRole };
use crate::models::run::{ Run, RunStatus };
use crate::service::AssistantService;

/// Pacing and budget for the run status poll loop. Both the wall-clock
/// timeout and the poll count bound the wait; whichever runs out first
/// ends the ask with `RunTimedOut`.
#[derive(Debug, Clone)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
    pub max_polls: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            timeout: Duration::from_secs(120),
            max_polls: 120,
        }
    }
}

/// Drives one request/response cycle against the remote assistant service:
/// append the prompt, start a run, poll until the run is terminal, return
/// the full ordered transcript.
pub struct AssistantRunner {
    service: Arc<dyn AssistantService>,
    poll: PollOptions,
}

impl AssistantRunner {
    pub fn new(service: Arc<dyn AssistantService>) -> Self {
        Self::with_poll_options(service, PollOptions::default())
    }

    pub fn with_poll_options(service: Arc<dyn AssistantService>, poll: PollOptions) -> Self {
        Self { service, poll }
    }

    /// Sends `prompt` on the conversation and blocks until the assistant
    /// has answered, returning the conversation's full message log oldest
    /// first. `run_instruction` is an advisory override applied to this
    /// run only; pass `""` for none.
    ///
    /// The remote log's ordering guarantee covers a single in-flight run
    /// per conversation. Callers must serialize `ask` calls sharing one
    /// conversation handle; concurrent asks on distinct conversations are
    /// independent.
    pub async fn ask(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        prompt: &str,
        run_instruction: &str
    ) -> Result<Vec<Message>, AssistantError> {
        self.ask_with_cancel(conversation_id, assistant_id, prompt, run_instruction, &CancellationToken::new()).await
    }

    /// Like [`ask`](Self::ask), but abandons the wait when `cancel` fires:
    /// the remote run is cancelled best-effort and the call returns
    /// `AssistantError::Cancelled` promptly.
    pub async fn ask_with_cancel(
        &self,
        conversation_id: &str,
        assistant_id: &str,
        prompt: &str,
        run_instruction: &str,
        cancel: &CancellationToken
    ) -> Result<Vec<Message>, AssistantError> {
        if prompt.trim().is_empty() {
            return Err(AssistantError::InvalidArgument("prompt must not be empty".to_string()));
        }
        if conversation_id.is_empty() {
            return Err(AssistantError::InvalidArgument("conversation id is missing".to_string()));
        }
        if assistant_id.is_empty() {
            return Err(AssistantError::InvalidArgument("assistant id is missing".to_string()));
        }

        self.service
            .create_message(conversation_id, MessageRole::User, prompt).await
            .map_err(AssistantError::Remote)?;

        let run = self.service
            .create_run(conversation_id, assistant_id, run_instruction).await
            .map_err(AssistantError::Remote)?;
        info!("Run {} started on conversation {}", run.id, conversation_id);

        let status = self.wait_for_terminal(&run, cancel).await?;
        if status != RunStatus::Completed {
            return Err(AssistantError::RunTerminated(status));
        }

        self.service
            .list_messages(conversation_id).await
            .map_err(AssistantError::Remote)
    }

    async fn wait_for_terminal(
        &self,
        run: &Run,
        cancel: &CancellationToken
    ) -> Result<RunStatus, AssistantError> {
        if run.status.is_terminal() {
            return Ok(run.status.clone());
        }

        let started = Instant::now();
        let deadline = started + self.poll.timeout;
        let mut polls: u32 = 0;

        loop {
            if polls >= self.poll.max_polls || Instant::now() >= deadline {
                self.cancel_best_effort(run).await;
                return Err(AssistantError::RunTimedOut {
                    waited: started.elapsed(),
                    polls,
                });
            }

            let current = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.cancel_best_effort(run).await;
                    return Err(AssistantError::Cancelled);
                }
                result = self.service.get_run(&run.conversation_id, &run.id) => {
                    result.map_err(AssistantError::Remote)?
                }
            };
            polls += 1;
            debug!("Run {} status: {}", run.id, current.status);

            if current.status.is_terminal() {
                return Ok(current.status);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.cancel_best_effort(run).await;
                    return Err(AssistantError::Cancelled);
                }
                _ = sleep(self.poll.interval) => {}
            }
        }
    }

    async fn cancel_best_effort(&self, run: &Run) {
        if let Err(e) = self.service.cancel_run(&run.conversation_id, &run.id).await {
            warn!("Failed to cancel run {}: {}", run.id, e);
        }
    }
}
