use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use config::resolve_config;
use suggest::{GeminiClient, Orchestrator};
use task_core::{NewTask, SuggestionRequest, Task, TaskStatus};

use crate::output;
use crate::ux_error;

#[derive(Args)]
pub struct SuggestArgs {
    #[arg(long, short, help = "Task title")]
    pub title: String,

    #[arg(long, short, help = "Optional task description")]
    pub description: Option<String>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, help = "Print the suggestions as new pending subtasks (JSON)")]
    pub as_tasks: bool
}

impl SuggestArgs {
    /// The task the suggestions are generated for.
    fn parent_task(&self) -> Task {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            status: TaskStatus::Pending,
            due_date: None,
            created_at: Utc::now()
        }
    }
}

pub async fn run(args: SuggestArgs, config_path: Option<&Path>) -> Result<()> {
    let config = match resolve_config(config_path, None) {
        Ok(config) => config,
        Err(e) => {
            let err = ux_error::invalid_config(&e.to_string());
            err.display();
            return Err(err.into());
        }
    };

    let client = GeminiClient::new(&config.upstream, &config.generation)?;
    let orchestrator = Orchestrator::from_config(Arc::new(client), &config);

    let parent = args.parent_task();
    let request = SuggestionRequest::from(&parent);

    if !args.json && !args.as_tasks {
        output::info(&format!(
            "Asking {} for subtasks...",
            orchestrator.models().join(", ")
        ));
    }

    let run = orchestrator
        .run(&request, config.upstream.api_key.as_ref())
        .await;
    tracing::debug!(attempts = ?run.attempts, "Orchestration finished");

    let suggestions = match run.outcome {
        Ok(suggestions) => suggestions.into_inner(),
        Err(e) => {
            let err = ux_error::suggestion_failed(&e);
            err.display();
            return Err(err.into());
        }
    };

    if args.as_tasks {
        let subtasks = subtasks_for(&parent, &suggestions);
        println!("{}", serde_json::to_string_pretty(&subtasks)?);
        return Ok(());
    }

    if args.json {
        let output = serde_json::json!({ "suggestions": suggestions });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    output::header(&format!("Suggested subtasks for \"{}\"", parent.title));
    output::numbered(&suggestions);
    Ok(())
}

fn subtasks_for(parent: &Task, suggestions: &[String]) -> Vec<NewTask> {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, suggestion)| parent.subtask_from_suggestion(suggestion, i))
        .collect()
}
