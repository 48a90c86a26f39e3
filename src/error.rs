use crate::models::run::RunStatus;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Failure modes surfaced by the conversation run client. All of these
/// come back synchronously from `ask`; nothing is logged-and-swallowed.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Local precondition failure. No remote call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport, auth, or service failure from any remote call, surfaced
    /// unmodified. Retrying is the caller's policy decision.
    #[error("remote service error: {0}")]
    Remote(#[source] Box<dyn StdError + Send + Sync>),

    /// The run reached a terminal status other than `completed`.
    #[error("run ended in status '{0}' without producing a reply")]
    RunTerminated(RunStatus),

    /// The poll budget (wall-clock timeout or maximum status checks) was
    /// exhausted before the run reached a terminal status.
    #[error("run did not reach a terminal status within {waited:?} ({polls} status checks)")]
    RunTimedOut { waited: Duration, polls: u32 },

    /// The caller cancelled the in-flight ask.
    #[error("ask cancelled by caller")]
    Cancelled,
}
