use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Remote Service Args ---
    /// API key for the assistant service
    #[arg(long, env = "ASSISTANT_API_KEY")]
    pub api_key: String,

    /// Base URL for the assistant service API. Defaults to the hosted endpoint.
    #[arg(long, env = "ASSISTANT_BASE_URL")]
    pub base_url: Option<String>,

    // --- Assistant Args ---
    /// Reuse an existing assistant by id instead of creating one
    #[arg(long, env = "ASSISTANT_ID")]
    pub assistant_id: Option<String>,

    /// Path to a JSON assistant definition (model, name, instructions, tools, file_ids)
    #[arg(long, env = "ASSISTANT_SPEC_PATH")]
    pub assistant_spec: Option<String>,

    /// Model name used when creating an assistant from flags (e.g., gpt-4o)
    #[arg(long, env = "ASSISTANT_MODEL", default_value = "gpt-4o")]
    pub model: String,

    /// Display name for an assistant created from flags
    #[arg(long, env = "ASSISTANT_NAME")]
    pub assistant_name: Option<String>,

    /// System instructions for an assistant created from flags
    #[arg(long, env = "ASSISTANT_INSTRUCTIONS")]
    pub instructions: Option<String>,

    /// Comma-separated tool capabilities to enable (code_interpreter, retrieval)
    #[arg(long, env = "ASSISTANT_TOOLS", default_value = "")]
    pub tools: String,

    /// Local file to upload and attach to the assistant for retrieval (repeatable)
    #[arg(long, env = "ASSISTANT_ATTACH")]
    pub attach: Vec<String>,

    // --- Conversation Args ---
    /// Reuse an existing conversation by id instead of creating one
    #[arg(long, env = "CONVERSATION_ID")]
    pub conversation_id: Option<String>,

    /// The user prompt to send
    #[arg(long, env = "PROMPT")]
    pub prompt: String,

    /// Advisory instruction override applied to this run only
    #[arg(long, env = "RUN_INSTRUCTION", default_value = "")]
    pub run_instruction: String,

    // --- Polling Args ---
    /// Milliseconds to wait between run status checks
    #[arg(long, env = "POLL_INTERVAL_MS", default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Overall seconds to wait for the run to reach a terminal status
    #[arg(long, env = "POLL_TIMEOUT_SECS", default_value = "120")]
    pub poll_timeout_secs: u64,

    /// Maximum number of status checks before giving up
    #[arg(long, env = "POLL_MAX_POLLS", default_value = "120")]
    pub max_polls: u32,
}
