const INSTRUCTIONS: &str = "Break down the following task into 3-5 smaller, actionable subtasks. \
Each subtask should be specific and achievable.";

const OUTPUT_FORMAT: &str = "Please provide only the subtasks as a numbered list, without any \
additional explanation or formatting. Each subtask should be on a new line and start with a number.

Example format:
1. First subtask
2. Second subtask
3. Third subtask";

/// Builds the instruction text sent to the model.
///
/// Title and description are inserted verbatim. The description line is
/// omitted when `description` is absent or blank.
pub fn build_prompt(title: &str, description: Option<&str>) -> String {
    let description_section = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| format!("Task Description: {d}"))
        .unwrap_or_default();

    format!(
        "{INSTRUCTIONS}\n\nTask Title: {}\n{description_section}\n\n{OUTPUT_FORMAT}",
        title.trim()
    )
}
