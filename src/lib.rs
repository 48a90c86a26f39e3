pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod service;

use chrono::DateTime;
use cli::Args;
use config::assistant::{ load_spec_from_file, AssistantSpec, AssistantTool };
use log::info;
use runner::{ AssistantRunner, PollOptions };
use service::{ new_service, AssistantService, ServiceConfig };
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Base URL: {}", args.base_url.as_deref().unwrap_or("service default"));
    info!("Assistant: {}", args.assistant_id.as_deref().unwrap_or("create from definition"));
    info!("Conversation: {}", args.conversation_id.as_deref().unwrap_or("create new"));
    info!("Poll Interval: {}ms", args.poll_interval_ms);
    info!("Poll Timeout: {}s", args.poll_timeout_secs);
    info!("Max Polls: {}", args.max_polls);
    info!("-------------------------");

    let service = new_service(&ServiceConfig {
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
    })?;

    let assistant_id = resolve_assistant(&args, service.clone()).await?;

    let conversation_id = match &args.conversation_id {
        Some(id) => id.clone(),
        None => {
            let conversation = service.create_conversation().await?;
            info!("Created conversation {}", conversation.id);
            conversation.id
        }
    };

    let poll = PollOptions {
        interval: Duration::from_millis(args.poll_interval_ms),
        timeout: Duration::from_secs(args.poll_timeout_secs),
        max_polls: args.max_polls,
    };
    let assistant_runner = AssistantRunner::with_poll_options(service, poll);

    let transcript = assistant_runner
        .ask(&conversation_id, &assistant_id, &args.prompt, &args.run_instruction).await?;

    for message in &transcript {
        let when = DateTime::from_timestamp(message.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!("[{}] {}: {}", when, message.role, message.content);
    }

    Ok(())
}

async fn resolve_assistant(
    args: &Args,
    service: Arc<dyn AssistantService>
) -> Result<String, Box<dyn Error + Send + Sync>> {
    if let Some(id) = &args.assistant_id {
        return Ok(id.clone());
    }

    let mut spec = match &args.assistant_spec {
        Some(path) => load_spec_from_file(Path::new(path))?,
        None => {
            let tools = args.tools
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| t.parse::<AssistantTool>())
                .collect::<Result<Vec<_>, _>>()?;
            AssistantSpec {
                model: args.model.clone(),
                name: args.assistant_name.clone(),
                instructions: args.instructions.clone(),
                tools,
                file_ids: Vec::new(),
            }
        }
    };

    for path in &args.attach {
        let file = service.upload_file(Path::new(path)).await?;
        info!("Uploaded {} as {}", file.filename, file.id);
        spec.file_ids.push(file.id);
    }

    let assistant = service.create_assistant(&spec).await?;
    info!("Created assistant {} ({})", assistant.id, assistant.model);
    Ok(assistant.id)
}
