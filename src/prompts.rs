//! Embedded system prompt
//!
//! Compiled into the binary; a config-named file overrides it.

use eyre::{Context, Result};

use crate::config::PromptConfig;

/// Default system prompt for the agent
pub const SYSTEM: &str = r#"# Introduction
You are an assistant that helps users manage their Google Slides presentations
through the tools provided: creating presentations, adding slides, commenting,
listing comments, searching, and exporting to markdown.

# Instructions
1. Listen carefully to the user's requirements and identify the tasks they
   want to perform.
2. Choose the appropriate tool for each request and call it with the
   arguments the user supplied; ask for anything that is missing.
3. Some tool calls require the user to authorize access or approve the call
   before it runs. If a call comes back as not authorized, tell the user and
   do not retry it on your own.
4. After executing tools, report the outcome, including identifiers or links
   the user will need for follow-up requests.

Be concise. Never invent tool results.
"#;

/// Resolve the system prompt, preferring the configured override file
pub fn load(config: &PromptConfig) -> Result<String> {
    match &config.system_prompt_file {
        Some(path) => std::fs::read_to_string(path)
            .context(format!("Failed to read system prompt from {}", path.display())),
        None => Ok(SYSTEM.to_string()),
    }
}
