use crate::config::ChunkingStrategy;
use crate::types::Category;

/// Pick a chunking strategy from document content and category
///
/// Rules are checked in order against the lower-cased content; the first
/// match wins.
#[must_use]
pub fn select_strategy(content: &str, category: &Category) -> ChunkingStrategy {
    let lower = content.to_lowercase();

    if *category == Category::ErrorPatterns || lower.contains("error:") || lower.contains("% ") {
        return ChunkingStrategy::ErrorPattern;
    }

    if *category == Category::BestPractices || lower.contains("best practice") {
        return ChunkingStrategy::ContextAware;
    }

    if ["interface ", "router ", "vlan "]
        .iter()
        .any(|kw| lower.contains(kw))
    {
        return ChunkingStrategy::SemanticCisco;
    }

    if lower.contains("configuration") || lower.contains("config") {
        return ChunkingStrategy::ContextAware;
    }

    ChunkingStrategy::Default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_rules_win_first() {
        assert_eq!(
            select_strategy("interface Gi0/0\n% Invalid input", &Category::General),
            ChunkingStrategy::ErrorPattern
        );
        assert_eq!(
            select_strategy("ERROR: link flap", &Category::General),
            ChunkingStrategy::ErrorPattern
        );
        assert_eq!(
            select_strategy("anything", &Category::ErrorPatterns),
            ChunkingStrategy::ErrorPattern
        );
    }

    #[test]
    fn best_practice_rules() {
        assert_eq!(
            select_strategy("Best Practice: use interface descriptions", &Category::General),
            ChunkingStrategy::ContextAware
        );
        assert_eq!(
            select_strategy("router bgp 65000", &Category::BestPractices),
            ChunkingStrategy::ContextAware
        );
    }

    #[test]
    fn cisco_keywords_select_semantic() {
        for content in ["interface Fa0/0", "router ospf 1", "vlan 10\n name users"] {
            assert_eq!(
                select_strategy(content, &Category::General),
                ChunkingStrategy::SemanticCisco
            );
        }
    }

    #[test]
    fn config_words_select_context_aware() {
        assert_eq!(
            select_strategy("Running configuration backup", &Category::General),
            ChunkingStrategy::ContextAware
        );
        assert_eq!(
            select_strategy("show config", &Category::Custom("lab".into())),
            ChunkingStrategy::ContextAware
        );
    }

    #[test]
    fn prose_falls_back_to_default() {
        assert_eq!(
            select_strategy("Spanning tree prevents loops.", &Category::General),
            ChunkingStrategy::Default
        );
        assert_eq!(
            select_strategy("", &Category::NetworkProtocols),
            ChunkingStrategy::Default
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let content = "interface Gi0/0\n description core";
        let first = select_strategy(content, &Category::General);
        for _ in 0..10 {
            assert_eq!(select_strategy(content, &Category::General), first);
        }
    }
}
