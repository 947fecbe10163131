use crate::ollama::DEFAULT_OLLAMA_URL;

/// Deterministic answer used when the completion server cannot be reached
#[must_use]
pub fn fallback_response(prompt: &str) -> String {
    format!(
        "I apologize, but I'm currently unable to connect to the Ollama server. Please ensure that:

1. Ollama is installed and running
2. The server URL is correct (default: {DEFAULT_OLLAMA_URL})
3. You have a model pulled (e.g., ollama pull llama3.2)

Your query was: \"{prompt}\"

For now, I can provide general guidance on network engineering topics. Would you like me to help you with:
- Network configuration examples
- Troubleshooting procedures
- Best practices for network management
- Common network protocols and concepts"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_prompt_and_is_stable() {
        let text = fallback_response("show ip ospf neighbor");
        assert!(text.contains("Your query was: \"show ip ospf neighbor\""));
        assert!(text.contains("http://localhost:11434"));
        assert_eq!(text, fallback_response("show ip ospf neighbor"));
    }
}
