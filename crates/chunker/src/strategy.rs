use crate::config::{ChunkerConfig, ChunkingStrategy};
use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved label carried by knowledge-library chunks
pub const KNOWLEDGE_TAG: &str = "knowledge";

/// Lines that open a configuration block in context_aware mode
const BLOCK_KEYWORDS: [&str; 5] = ["interface", "router", "vlan", "access-list", "ip route"];

/// Cisco IOS command families and the sub-commands usually found under them
const COMMAND_FAMILIES: [(&str, &[&str]); 5] = [
    (
        "interface",
        &["description", "ip address", "switchport", "speed", "duplex"],
    ),
    ("router", &["network", "neighbor", "redistribute"]),
    ("vlan", &["name", "state"]),
    ("access-list", &["permit", "deny"]),
    ("line", &["password", "login", "transport"]),
];

static ERROR_LABEL: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)error:|cause:|solution:").expect("error label pattern is valid")
});

/// What a caller asks the chunker to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyRequest {
    /// Let the selector pick from content and category
    Auto,
    /// Use this strategy
    Strategy(ChunkingStrategy),
    /// Chunk with `default` but record this label as the strategy
    Tagged(String),
}

impl StrategyRequest {
    /// Parse a requested strategy name
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("auto") {
            return Self::Auto;
        }
        match name.parse::<ChunkingStrategy>() {
            Ok(strategy) => Self::Strategy(strategy),
            Err(_) => {
                if name != KNOWLEDGE_TAG {
                    log::warn!("Unknown chunking strategy '{name}', using default chunking");
                }
                Self::Tagged(name.to_string())
            }
        }
    }

    /// Request used for knowledge-library documents
    pub fn knowledge() -> Self {
        Self::Tagged(KNOWLEDGE_TAG.to_string())
    }
}

impl Default for StrategyRequest {
    fn default() -> Self {
        Self::Strategy(ChunkingStrategy::Default)
    }
}

/// Accumulates text and emits trimmed, non-empty chunks
#[derive(Default)]
struct Accumulator {
    text: String,
    chars: usize,
    chunks: Vec<String>,
}

impl Accumulator {
    fn push(&mut self, s: &str) {
        self.text.push_str(s);
        self.chars += s.chars().count();
    }

    fn push_line(&mut self, line: &str) {
        self.push(line);
        self.push("\n");
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn flush(&mut self) {
        let trimmed = self.text.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.text.clear();
        self.chars = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

fn emit(chunks: &mut Vec<String>, piece: &[char]) {
    let piece: String = piece.iter().collect();
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Execute chunking strategies on document content
pub struct StrategyExecutor {
    config: ChunkerConfig,
}

impl StrategyExecutor {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Split `content` with the given strategy
    pub fn execute(&self, strategy: ChunkingStrategy, content: &str) -> Vec<String> {
        match strategy {
            ChunkingStrategy::Default => self.chunk_default(content),
            ChunkingStrategy::ContextAware => self.chunk_context_aware(content),
            ChunkingStrategy::SemanticCisco => self.chunk_semantic_cisco(content),
            ChunkingStrategy::ErrorPattern => self.chunk_error_pattern(content),
        }
    }

    /// Fixed windows that end on the last `.` or newline when it lies far enough in
    fn chunk_default(&self, content: &str) -> Vec<String> {
        let chars: Vec<char> = content.chars().collect();
        let size = self.config.chunk_size;
        let threshold = size as f64 * self.config.break_ratio;
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + size).min(chars.len());

            if end < chars.len() {
                let window = &chars[start..end];
                if let Some(offset) = window.iter().rposition(|c| *c == '.' || *c == '\n') {
                    if offset as f64 > threshold {
                        emit(&mut chunks, &chars[start..=start + offset]);
                        start += offset + 1;
                        continue;
                    }
                }
            }

            emit(&mut chunks, &chars[start..end]);
            start = end;
        }

        chunks
    }

    fn chunk_context_aware(&self, content: &str) -> Vec<String> {
        let mut acc = Accumulator::default();

        for line in content.split('\n') {
            let trimmed = line.trim();
            let lower = trimmed.to_lowercase();

            if BLOCK_KEYWORDS.iter().any(|kw| lower.starts_with(kw)) {
                acc.flush();
                acc.push_line(line);
            } else if trimmed.starts_with('!') || trimmed.is_empty() {
                if acc.chars > self.config.context_soft_limit {
                    acc.flush();
                }
                acc.push_line(line);
            } else {
                acc.push_line(line);
                if acc.chars > self.config.context_hard_limit {
                    acc.flush();
                }
            }
        }

        acc.finish()
    }

    fn chunk_semantic_cisco(&self, content: &str) -> Vec<String> {
        let mut acc = Accumulator::default();
        let mut family: Option<&str> = None;

        for line in content.split('\n') {
            let lower = line.trim().to_lowercase();
            let matched = COMMAND_FAMILIES
                .iter()
                .map(|(keyword, _)| *keyword)
                .find(|keyword| lower.starts_with(keyword));

            if let Some(keyword) = matched {
                if family != Some(keyword) {
                    if !acc.is_empty() {
                        acc.flush();
                    }
                    family = Some(keyword);
                }
            }

            acc.push_line(line);
            if acc.chars > self.config.cisco_max_chars {
                acc.flush();
                family = None;
            }
        }

        acc.finish()
    }

    fn chunk_error_pattern(&self, content: &str) -> Vec<String> {
        let mut acc = Accumulator::default();

        for unit in split_error_units(content) {
            let unit_chars = unit.chars().count();
            if acc.chars + unit_chars > self.config.error_max_chars && !acc.is_empty() {
                acc.flush();
            }
            acc.push(unit);
        }

        acc.finish()
    }
}

/// Slice content at every `Error:`/`Cause:`/`Solution:` label
fn split_error_units(content: &str) -> Vec<&str> {
    let mut bounds: Vec<usize> = ERROR_LABEL.find_iter(content).map(|m| m.start()).collect();
    if bounds.first() != Some(&0) {
        bounds.insert(0, 0);
    }
    bounds.push(content.len());

    bounds
        .windows(2)
        .map(|w| &content[w[0]..w[1]])
        .filter(|unit| !unit.is_empty())
        .collect()
}
