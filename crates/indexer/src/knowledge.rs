//! Built-in knowledge libraries: error patterns, best practices and
//! protocol notes, searchable in memory and uploadable into the vector store.

use crate::documents::DocumentService;
use crate::error::{IndexerError, Result};
use netrag_chunker::{Category, Document, DocumentMetadata, StrategyRequest};
use netrag_protocol::{LibraryUploadReport, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const ERROR_PATTERNS_JSON: &str = include_str!("../knowledge/error-patterns.json");
const BEST_PRACTICES_JSON: &str = include_str!("../knowledge/best-practices.json");
const NETWORK_PROTOCOLS_JSON: &str = include_str!("../knowledge/network-protocols.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPattern {
    pub id: String,
    pub category: String,
    pub pattern: String,
    pub description: String,
    pub severity: Severity,
    pub solutions: Vec<String>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPractice {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub implementation: String,
    pub benefits: Vec<String>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProtocol {
    pub id: String,
    pub name: String,
    pub description: String,
    pub configuration: String,
    pub troubleshooting: Vec<String>,
    pub best_practices: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeMatches {
    pub error_patterns: Vec<ErrorPattern>,
    pub best_practices: Vec<BestPractice>,
    pub network_protocols: Vec<NetworkProtocol>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigurationReview {
    /// High and critical error patterns that match
    pub errors: Vec<ErrorPattern>,
    pub recommendations: Vec<BestPractice>,
    pub protocols: Vec<NetworkProtocol>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeStats {
    pub total_error_patterns: usize,
    pub total_best_practices: usize,
    pub total_network_protocols: usize,
    pub categories: Vec<String>,
    pub severity_distribution: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub error_patterns: usize,
    pub best_practices: usize,
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// The three fixed corpora
#[derive(Debug, Clone)]
pub struct KnowledgeLibrary {
    error_patterns: Vec<ErrorPattern>,
    best_practices: Vec<BestPractice>,
    network_protocols: Vec<NetworkProtocol>,
}

impl KnowledgeLibrary {
    /// Corpora compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(ERROR_PATTERNS_JSON, BEST_PRACTICES_JSON, NETWORK_PROTOCOLS_JSON)
    }

    pub fn from_json(
        error_patterns: &str,
        best_practices: &str,
        network_protocols: &str,
    ) -> Result<Self> {
        Ok(Self {
            error_patterns: serde_json::from_str(error_patterns).map_err(|source| {
                IndexerError::InvalidLibrary {
                    library: "error-patterns",
                    source,
                }
            })?,
            best_practices: serde_json::from_str(best_practices).map_err(|source| {
                IndexerError::InvalidLibrary {
                    library: "best-practices",
                    source,
                }
            })?,
            network_protocols: serde_json::from_str(network_protocols).map_err(|source| {
                IndexerError::InvalidLibrary {
                    library: "network-protocols",
                    source,
                }
            })?,
        })
    }

    pub fn error_patterns(&self) -> &[ErrorPattern] {
        &self.error_patterns
    }

    pub fn best_practices(&self) -> &[BestPractice] {
        &self.best_practices
    }

    pub fn network_protocols(&self) -> &[NetworkProtocol] {
        &self.network_protocols
    }

    // Error patterns

    /// Case-insensitive match on pattern, description or any solution
    pub fn search_error_patterns(&self, query: &str, category: Option<&str>) -> Vec<ErrorPattern> {
        let term = query.to_lowercase();
        let category = category.map(str::to_lowercase);
        self.error_patterns
            .iter()
            .filter(|p| category.as_deref().map_or(true, |c| contains(&p.category, c)))
            .filter(|p| {
                contains(&p.pattern, &term)
                    || contains(&p.description, &term)
                    || p.solutions.iter().any(|s| contains(s, &term))
            })
            .cloned()
            .collect()
    }

    pub fn error_pattern(&self, id: &str) -> Option<&ErrorPattern> {
        self.error_patterns.iter().find(|p| p.id == id)
    }

    pub fn error_patterns_by_category(&self, category: &str) -> Vec<ErrorPattern> {
        self.error_patterns
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect()
    }

    pub fn error_patterns_by_severity(&self, severity: Severity) -> Vec<ErrorPattern> {
        self.error_patterns
            .iter()
            .filter(|p| p.severity == severity)
            .cloned()
            .collect()
    }

    // Best practices

    /// Case-insensitive match on title, description or implementation
    pub fn search_best_practices(&self, query: &str, category: Option<&str>) -> Vec<BestPractice> {
        let term = query.to_lowercase();
        let category = category.map(str::to_lowercase);
        self.best_practices
            .iter()
            .filter(|p| category.as_deref().map_or(true, |c| contains(&p.category, c)))
            .filter(|p| {
                contains(&p.title, &term)
                    || contains(&p.description, &term)
                    || contains(&p.implementation, &term)
            })
            .cloned()
            .collect()
    }

    pub fn best_practice(&self, id: &str) -> Option<&BestPractice> {
        self.best_practices.iter().find(|p| p.id == id)
    }

    pub fn best_practices_by_category(&self, category: &str) -> Vec<BestPractice> {
        self.best_practices
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect()
    }

    // Protocols

    /// Case-insensitive match on name, description or configuration
    pub fn search_network_protocols(&self, query: &str) -> Vec<NetworkProtocol> {
        let term = query.to_lowercase();
        self.network_protocols
            .iter()
            .filter(|p| {
                contains(&p.name, &term)
                    || contains(&p.description, &term)
                    || contains(&p.configuration, &term)
            })
            .cloned()
            .collect()
    }

    pub fn network_protocol(&self, id: &str) -> Option<&NetworkProtocol> {
        self.network_protocols.iter().find(|p| p.id == id)
    }

    // Combined

    pub fn search_all(&self, query: &str) -> KnowledgeMatches {
        KnowledgeMatches {
            error_patterns: self.search_error_patterns(query, None),
            best_practices: self.search_best_practices(query, None),
            network_protocols: self.search_network_protocols(query),
        }
    }

    /// Knowledge entries whose text contains the whole configuration snippet
    pub fn validate_configuration(&self, config: &str) -> ConfigurationReview {
        let matches = self.search_all(config);
        ConfigurationReview {
            errors: matches
                .error_patterns
                .into_iter()
                .filter(|p| p.severity >= Severity::High)
                .collect(),
            recommendations: matches.best_practices,
            protocols: matches.network_protocols,
        }
    }

    pub fn knowledge_stats(&self) -> KnowledgeStats {
        let mut categories: Vec<String> = Vec::new();
        for category in self
            .error_patterns
            .iter()
            .map(|p| &p.category)
            .chain(self.best_practices.iter().map(|p| &p.category))
        {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }

        let mut severity_distribution = BTreeMap::new();
        for pattern in &self.error_patterns {
            *severity_distribution
                .entry(pattern.severity.to_string())
                .or_insert(0) += 1;
        }

        KnowledgeStats {
            total_error_patterns: self.error_patterns.len(),
            total_best_practices: self.best_practices.len(),
            total_network_protocols: self.network_protocols.len(),
            categories,
            severity_distribution,
        }
    }

    pub fn library_stats(&self) -> LibraryStats {
        LibraryStats {
            error_patterns: self.error_patterns.len(),
            best_practices: self.best_practices.len(),
        }
    }

    // Upload

    /// Every library entry as a synthetic document
    pub fn to_documents(&self, upload_date: &str) -> Vec<(LibraryKind, Document)> {
        let mut docs = Vec::with_capacity(
            self.error_patterns.len() + self.best_practices.len() + self.network_protocols.len(),
        );

        for p in &self.error_patterns {
            let content = format!(
                "{}\n\n{}\n\nSolutions:\n{}\n\nExamples:\n{}",
                p.pattern,
                p.description,
                p.solutions.join("\n"),
                p.examples.join("\n")
            );
            let metadata = DocumentMetadata::new(
                format!("error_pattern_{}.txt", p.id),
                "text",
                upload_date,
                0,
            )
            .category(Category::ErrorPatterns)
            .extra("pattern", p.pattern.as_str())
            .extra("severity", p.severity.as_str())
            .extra("category_type", p.category.as_str());
            docs.push((
                LibraryKind::ErrorPattern,
                Document::new(format!("error_pattern_{}", p.id), content, metadata),
            ));
        }

        for p in &self.best_practices {
            let content = format!(
                "{}\n\n{}\n\nImplementation:\n{}\n\nBenefits:\n{}\n\nExamples:\n{}",
                p.title,
                p.description,
                p.implementation,
                p.benefits.join("\n"),
                p.examples.join("\n")
            );
            let metadata = DocumentMetadata::new(
                format!("best_practice_{}.txt", p.id),
                "text",
                upload_date,
                0,
            )
            .category(Category::BestPractices)
            .extra("title", p.title.as_str())
            .extra("category_type", p.category.as_str());
            docs.push((
                LibraryKind::BestPractice,
                Document::new(format!("best_practice_{}", p.id), content, metadata),
            ));
        }

        for p in &self.network_protocols {
            let content = format!(
                "{}\n\n{}\n\nConfiguration:\n{}\n\nTroubleshooting:\n{}\n\nBest Practices:\n{}",
                p.name,
                p.description,
                p.configuration,
                p.troubleshooting.join("\n"),
                p.best_practices.join("\n")
            );
            let metadata = DocumentMetadata::new(
                format!("network_protocol_{}.txt", p.id),
                "text",
                upload_date,
                0,
            )
            .category(Category::NetworkProtocols)
            .extra("name", p.name.as_str());
            docs.push((
                LibraryKind::NetworkProtocol,
                Document::new(format!("network_protocol_{}", p.id), content, metadata),
            ));
        }

        docs
    }

    /// Submit every entry through the ingestion pipeline with the knowledge tag
    ///
    /// Not idempotent: a second run re-submits the same ids.
    pub async fn upload_libraries(&self, service: &DocumentService) -> Outcome<LibraryUploadReport> {
        let upload_date = chrono::Utc::now().to_rfc3339();
        let request = StrategyRequest::knowledge();
        let mut report = LibraryUploadReport::default();

        for (kind, document) in self.to_documents(&upload_date) {
            match service.ingest(&document, &request).await {
                Ok(_) => match kind {
                    LibraryKind::ErrorPattern => report.error_patterns += 1,
                    LibraryKind::BestPractice => report.best_practices += 1,
                    LibraryKind::NetworkProtocol => report.network_protocols += 1,
                },
                Err(e) => {
                    log::error!("Error uploading library entry {}: {e}", document.id);
                    report.failed.push(document.id);
                }
            }
        }

        log::info!(
            "Uploaded {} knowledge library entries ({} failed)",
            report.total(),
            report.failed.len()
        );

        if report.failed.is_empty() {
            Outcome::ok(report)
        } else {
            let message = format!("{} library entries failed to upload", report.failed.len());
            Outcome::failed(report, message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    ErrorPattern,
    BestPractice,
    NetworkProtocol,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn library() -> KnowledgeLibrary {
        KnowledgeLibrary::builtin().unwrap()
    }

    #[test]
    fn builtin_corpora_parse() {
        let lib = library();
        assert!(!lib.error_patterns().is_empty());
        assert!(!lib.best_practices().is_empty());
        assert!(!lib.network_protocols().is_empty());
    }

    #[test]
    fn malformed_corpus_is_reported() {
        let err = KnowledgeLibrary::from_json("[]", "{", "[]").unwrap_err();
        assert!(matches!(
            err,
            IndexerError::InvalidLibrary {
                library: "best-practices",
                ..
            }
        ));
    }

    #[test]
    fn search_is_case_insensitive_and_scoped() {
        let lib = library();
        let hits = lib.search_error_patterns("MTU", None);
        assert!(hits.iter().any(|p| p.id == "ospf_neighbor_exstart"));

        let scoped = lib.search_error_patterns("mtu", Some("switching"));
        assert!(scoped.iter().all(|p| p.category == "switching"));

        assert_eq!(
            lib.search_best_practices("ssh", None)[0].id,
            "secure_management_access"
        );
        assert_eq!(lib.search_network_protocols("link-state")[0].id, "ospf");
    }

    #[test]
    fn lookups_by_id_category_and_severity() {
        let lib = library();
        assert_eq!(lib.error_pattern("bgp_peer_idle").unwrap().severity, Severity::Critical);
        assert!(lib.error_pattern("missing").is_none());
        assert!(lib.best_practice("config_backup").is_some());
        assert!(lib.network_protocol("hsrp").is_some());

        let switching = lib.error_patterns_by_category("SWITCHING");
        assert_eq!(switching.len(), 3);
        assert!(lib
            .error_patterns_by_severity(Severity::Critical)
            .iter()
            .all(|p| p.severity == Severity::Critical));
        assert_eq!(lib.best_practices_by_category("security").len(), 2);
    }

    #[test]
    fn validate_configuration_keeps_severe_errors() {
        let lib = library();
        let review = lib.validate_configuration("neighbor");
        assert!(review
            .errors
            .iter()
            .all(|p| p.severity >= Severity::High));
        assert!(review.errors.iter().any(|p| p.id == "ospf_neighbor_exstart"));
    }

    #[test]
    fn stats_cover_all_corpora() {
        let lib = library();
        let stats = lib.knowledge_stats();
        assert_eq!(stats.total_error_patterns, lib.error_patterns().len());
        assert_eq!(stats.total_network_protocols, lib.network_protocols().len());
        assert_eq!(
            stats.severity_distribution.values().sum::<usize>(),
            stats.total_error_patterns
        );
        assert!(stats.categories.contains(&"routing".to_string()));
        assert!(stats.categories.contains(&"documentation".to_string()));

        let lib_stats = lib.library_stats();
        assert_eq!(lib_stats.best_practices, stats.total_best_practices);
    }

    #[test]
    fn documents_follow_library_layout() {
        let lib = library();
        let docs = lib.to_documents("2024-01-01T00:00:00+00:00");
        assert_eq!(
            docs.len(),
            lib.error_patterns().len() + lib.best_practices().len() + lib.network_protocols().len()
        );

        let (_, ep) = docs
            .iter()
            .find(|(_, d)| d.id == "error_pattern_invalid_input")
            .unwrap();
        assert!(ep.content.starts_with("% Invalid input detected"));
        assert!(ep.content.contains("\n\nSolutions:\n"));
        assert!(ep.content.contains("\n\nExamples:\n"));
        assert_eq!(ep.metadata.filename, "error_pattern_invalid_input.txt");
        assert_eq!(ep.metadata.category, Category::ErrorPatterns);
        assert_eq!(ep.metadata.size, 0);
        assert_eq!(ep.metadata.extra["severity"], Value::from("low"));
        assert_eq!(ep.metadata.extra["category_type"], Value::from("cli"));

        let (_, bp) = docs
            .iter()
            .find(|(_, d)| d.id == "best_practice_config_backup")
            .unwrap();
        assert!(bp.content.contains("\n\nImplementation:\n"));
        assert_eq!(bp.metadata.category, Category::BestPractices);
        assert_eq!(bp.metadata.extra["title"], Value::from("Archive configuration on every change"));

        let (kind, np) = docs
            .iter()
            .find(|(_, d)| d.id == "network_protocol_ospf")
            .unwrap();
        assert_eq!(*kind, LibraryKind::NetworkProtocol);
        assert!(np.content.starts_with("OSPF\n\n"));
        assert!(np.content.contains("\n\nBest Practices:\n"));
        assert_eq!(np.metadata.category, Category::NetworkProtocols);
        assert_eq!(np.metadata.extra["name"], Value::from("OSPF"));
    }

    #[test]
    fn severity_parse() {
        assert_eq!(Severity::parse("HIGH"), Some(Severity::High));
        assert_eq!(Severity::parse("urgent"), None);
    }
}
