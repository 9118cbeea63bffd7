use colored::Colorize;
use errors::{RetryHint, SuggestionError};

#[derive(Debug)]
pub struct UxError {
    pub what: String,
    pub why: Option<String>,
    pub how_to_fix: Vec<String>,
    pub suggested_command: Option<String>
}

impl UxError {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            why: None,
            how_to_fix: Vec::new(),
            suggested_command: None
        }
    }

    pub fn why(mut self, reason: impl Into<String>) -> Self {
        self.why = Some(reason.into());
        self
    }

    pub fn fix(mut self, suggestion: impl Into<String>) -> Self {
        self.how_to_fix.push(suggestion.into());
        self
    }

    pub fn suggest(mut self, cmd: impl Into<String>) -> Self {
        self.suggested_command = Some(cmd.into());
        self
    }

    pub fn display(&self) {
        eprintln!();
        eprintln!("{} {}", "error:".red().bold(), self.what.white().bold());

        if let Some(why) = &self.why {
            eprintln!("       {}", why.dimmed());
        }

        if !self.how_to_fix.is_empty() {
            eprintln!();
            eprintln!("{}", "How to fix:".yellow().bold());
            for (i, fix) in self.how_to_fix.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, fix);
            }
        }

        if let Some(cmd) = &self.suggested_command {
            eprintln!();
            eprintln!("{}", "Try this:".green().bold());
            eprintln!("  $ {}", cmd.cyan());
        }
        eprintln!();
    }
}

impl std::fmt::Display for UxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.what)
    }
}

impl std::error::Error for UxError {}

/// Presents a terminal suggestion failure with the affordance its retry
/// hint allows.
pub fn suggestion_failed(err: &SuggestionError) -> UxError {
    let base = UxError::new(err.user_message());
    match err {
        SuggestionError::Validation { .. } => base
            .fix("Pass a non-empty task title")
            .suggest("taskpilot suggest --title \"Plan launch\""),
        SuggestionError::Configuration { .. } => base
            .why("The upstream credential is read from GEMINI_API_KEY or the config file")
            .fix("Export GEMINI_API_KEY with a valid key")
            .fix("Or set upstream.api_key in your config file")
            .suggest("taskpilot config validate"),
        _ => match err.retry_hint() {
            RetryHint::Later => base
                .why("The AI service is saturated or rate limited")
                .fix("Wait a little before retrying"),
            RetryHint::Now => base.fix("Retry the request"),
            RetryHint::Never => base
        }
    }
}

pub fn invalid_config(details: &str) -> UxError {
    UxError::new("Configuration is invalid")
        .why(details.to_string())
        .fix("Correct the reported fields in the config file or environment")
        .suggest("taskpilot config show")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_suggests_validate() {
        let err = suggestion_failed(&SuggestionError::configuration(
            "Gemini API key not configured"
        ));
        assert_eq!(err.what, "Gemini API key not configured");
        assert_eq!(
            err.suggested_command.as_deref(),
            Some("taskpilot config validate")
        );
        assert_eq!(err.how_to_fix.len(), 2);
    }

    #[test]
    fn test_overloaded_advises_waiting() {
        let err = suggestion_failed(&SuggestionError::Overloaded {
            message: "busy".to_string()
        });
        assert_eq!(err.what, "AI service currently overloaded, retry shortly");
        assert!(err.how_to_fix[0].contains("Wait"));
    }

    #[test]
    fn test_network_advises_retry() {
        let err = suggestion_failed(&SuggestionError::Network {
            message: "reset".to_string()
        });
        assert_eq!(err.what, "Failed to generate suggestions");
        assert_eq!(err.how_to_fix, vec!["Retry the request"]);
    }

    #[test]
    fn test_display_does_not_panic() {
        invalid_config("retry.max_retries: out of range").display();
    }
}
