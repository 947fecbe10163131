use netrag_protocol::{ChatMode, EnhancedResults, SearchHit};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI Network Engineering Assistant. You help network engineers with configuration, troubleshooting, and best practices. \n\nPlease provide a helpful, accurate, and detailed response. If the user asks about network concepts, explain them clearly. If they ask for configuration examples, provide practical examples. If they ask for troubleshooting help, provide step-by-step guidance.";

const DOCUMENT_NOTE: &str = "Note: The user has uploaded network documentation. Please reference relevant documentation in your response when applicable.";

const AGENT_NOTE: &str = "Note: You are operating in advanced agent mode. Please provide comprehensive, multi-step analysis and solutions. Break down complex problems into actionable steps.";

/// Builds the final completion input from query, context and mode
#[derive(Debug, Clone)]
pub struct PromptComposer {
    system_prompt: String,
}

impl PromptComposer {
    /// `None` or a blank override selects the built-in instruction
    pub fn new(system_prompt: Option<String>) -> Self {
        let system_prompt = system_prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        Self { system_prompt }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn compose(&self, query: &str, context: Option<&EnhancedResults>, mode: ChatMode) -> String {
        let context = context.map(render_context).unwrap_or_default();
        let base = format!(
            "{}\n\nCurrent user query: {query}{context}\n\nResponse:",
            self.system_prompt
        );

        match mode {
            ChatMode::Direct => base,
            ChatMode::Document => format!("{base}\n\n{DOCUMENT_NOTE}"),
            ChatMode::Agent => format!("{base}\n\n{AGENT_NOTE}"),
        }
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Retrieval bundle as prompt text; empty when every pool is empty
pub fn render_context(results: &EnhancedResults) -> String {
    let mut out = String::new();
    push_section(&mut out, "Relevant documentation", "Document", &results.general);
    push_section(&mut out, "Known error patterns", "Error Pattern", &results.error_patterns);
    push_section(&mut out, "Best practices", "Best Practice", &results.best_practices);
    out
}

fn push_section(out: &mut String, heading: &str, label: &str, hits: &[SearchHit]) {
    if hits.is_empty() {
        return;
    }

    let entries = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| format!("[{label} {} - {}]\n{}\n", i + 1, hit.filename(), hit.content))
        .collect::<Vec<_>>()
        .join("\n");
    out.push_str("\n\n");
    out.push_str(heading);
    out.push_str(":\n");
    out.push_str(&entries);
}
