use crate::services::AppServices;
use crate::{Commands, KnowledgeCommand};
use anyhow::{Context, Result};
use netrag_chunker::{Category, StrategyRequest};
use netrag_indexer::{DirectoryIngestor, DocumentService, KnowledgeLibrary, Severity};
use netrag_protocol::{ChatMode, Outcome, SearchHit};
use serde::Serialize;

const PREVIEW_CHARS: usize = 160;

#[derive(Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print an outcome and report whether it succeeded
    fn outcome<T: Serialize>(
        self,
        outcome: &Outcome<T>,
        render: impl FnOnce(&T) -> String,
    ) -> Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(outcome)?);
        } else {
            if let Some(message) = &outcome.message {
                eprintln!("{message}");
            }
            let text = render(&outcome.value);
            if !text.is_empty() {
                println!("{text}");
            }
        }
        Ok(outcome.is_ok())
    }

    fn value<T: Serialize>(self, value: &T, render: impl FnOnce(&T) -> String) -> Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", render(value));
        }
        Ok(true)
    }
}

pub async fn run(services: &AppServices, command: Commands, output: Output) -> Result<bool> {
    match command {
        Commands::Ingest(args) => {
            let ingestor = DirectoryIngestor::new(services.documents.clone(), &args.path)
                .category(Category::parse(&args.category))
                .request(StrategyRequest::parse(&args.strategy));
            let stats = ingestor
                .run()
                .await
                .with_context(|| format!("Failed to ingest {}", args.path.display()))?;
            let failed = !stats.errors.is_empty();
            output.value(&stats, |stats| {
                let mut text = format!(
                    "Ingested {} of {} files into {} chunks in {} ms",
                    stats.documents, stats.files, stats.chunks, stats.time_ms
                );
                for (strategy, count) in &stats.strategies {
                    text.push_str(&format!("\n  {strategy}: {count}"));
                }
                for error in &stats.errors {
                    text.push_str(&format!("\n  error: {error}"));
                }
                text
            })?;
            Ok(!failed)
        }
        Commands::Search(args) => {
            let outcome = services
                .retrieval
                .search(&args.query, args.limit, args.category.as_deref())
                .await;
            output.outcome(&outcome, |hits| render_hits(hits))
        }
        Commands::EnhancedSearch(args) => {
            let outcome = services
                .retrieval
                .enhanced_search(&args.query, args.limit)
                .await;
            output.outcome(&outcome, |results| {
                [
                    ("General", &results.general),
                    ("Error patterns", &results.error_patterns),
                    ("Best practices", &results.best_practices),
                ]
                .into_iter()
                .map(|(title, hits)| format!("== {title} ({}) ==\n{}", hits.len(), render_hits(hits)))
                .collect::<Vec<_>>()
                .join("\n")
            })
        }
        Commands::List => {
            let outcome = services.documents.get_all_documents().await;
            output.outcome(&outcome, |documents| {
                documents
                    .iter()
                    .map(|doc| {
                        let filename = doc
                            .metadata
                            .get("filename")
                            .and_then(|v| v.as_str())
                            .unwrap_or("unknown");
                        format!("{}  {}  ({} chunks)", doc.id, filename, doc.chunk_count)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Commands::Delete(args) => {
            let outcome = services.documents.delete_document(&args.filename).await;
            output.outcome(&outcome, |deleted| {
                if *deleted {
                    format!("Deleted {}", args.filename)
                } else {
                    String::new()
                }
            })
        }
        Commands::Stats => {
            let outcome = services.documents.collection_stats().await;
            output.outcome(&outcome, |stats| {
                let mut text = format!(
                    "Documents: {}\nChunks: {}",
                    stats.total_documents, stats.total_chunks
                );
                for (category, count) in &stats.categories {
                    text.push_str(&format!("\n  {category}: {count}"));
                }
                text
            })
        }
        Commands::Status => {
            let status = services.assistant.status().await;
            output.value(&status, |status| {
                format!(
                    "Completion server: {} (model {})\nAvailable models: {}\nVector store: {}\nDocuments: {}, chunks: {}",
                    if status.completion_available { "online" } else { "offline" },
                    status.model,
                    if status.models.is_empty() { "-".to_string() } else { status.models.join(", ") },
                    if status.vector_store_running { "online" } else { "offline" },
                    status.stats.total_documents,
                    status.stats.total_chunks
                )
            })
        }
        Commands::LoadLibraries => {
            let outcome = services.library.upload_libraries(&services.documents).await;
            output.outcome(&outcome, |report| {
                format!(
                    "Uploaded {} error patterns, {} best practices, {} protocols",
                    report.error_patterns, report.best_practices, report.network_protocols
                )
            })
        }
        Commands::Strategies => strategies(output),
        Commands::Knowledge(command) => knowledge(command, output),
        Commands::Ask(args) => ask(services, &args.prompt, args.mode.into(), output).await,
        Commands::Serve(_) => {
            anyhow::bail!("serve is handled by the entry point")
        }
    }
}

pub async fn ask(
    services: &AppServices,
    prompt: &str,
    mode: ChatMode,
    output: Output,
) -> Result<bool> {
    let outcome = services.assistant.generate_response(prompt, mode).await;
    output.outcome(&outcome, |answer| answer.clone())
}

pub fn strategies(output: Output) -> Result<bool> {
    let strategies = DocumentService::available_strategies();
    output.value(&strategies, |strategies| {
        strategies
            .iter()
            .map(|s| format!("{:<16} {}", s.name, s.display_name))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

pub fn knowledge(command: KnowledgeCommand, output: Output) -> Result<bool> {
    let library = KnowledgeLibrary::builtin().context("Failed to load knowledge library")?;

    match command {
        KnowledgeCommand::Search { query, category } => {
            let mut matches = library.search_all(&query);
            if let Some(category) = category.as_deref() {
                matches.error_patterns = library.search_error_patterns(&query, Some(category));
                matches.best_practices = library.search_best_practices(&query, Some(category));
            }
            output.value(&matches, |m| {
                let mut lines = Vec::new();
                lines.extend(
                    m.error_patterns
                        .iter()
                        .map(|p| format!("[error:{}] {} ({})", p.id, p.pattern, p.severity)),
                );
                lines.extend(
                    m.best_practices
                        .iter()
                        .map(|p| format!("[practice:{}] {}", p.id, p.title)),
                );
                lines.extend(
                    m.network_protocols
                        .iter()
                        .map(|p| format!("[protocol:{}] {}", p.id, p.name)),
                );
                lines.join("\n")
            })
        }
        KnowledgeCommand::Error { id } => match library.error_pattern(&id) {
            Some(pattern) => output.value(pattern, |p| {
                format!(
                    "{} [{}]\n{}\n\nSolutions:\n- {}",
                    p.pattern,
                    p.severity,
                    p.description,
                    p.solutions.join("\n- ")
                )
            }),
            None => not_found("error pattern", &id),
        },
        KnowledgeCommand::Practice { id } => match library.best_practice(&id) {
            Some(practice) => output.value(practice, |p| {
                format!("{}\n{}\n\n{}", p.title, p.description, p.implementation)
            }),
            None => not_found("best practice", &id),
        },
        KnowledgeCommand::Protocol { id } => match library.network_protocol(&id) {
            Some(protocol) => output.value(protocol, |p| {
                format!("{}\n{}\n\n{}", p.name, p.description, p.configuration)
            }),
            None => not_found("protocol", &id),
        },
        KnowledgeCommand::Severity { level } => {
            let severity = Severity::parse(&level)
                .with_context(|| format!("Unknown severity '{level}'"))?;
            let patterns = library.error_patterns_by_severity(severity);
            output.value(&patterns, |patterns| {
                patterns
                    .iter()
                    .map(|p| format!("{}  {}", p.id, p.pattern))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        KnowledgeCommand::Validate { config } => {
            let review = library.validate_configuration(&config);
            output.value(&review, |r| {
                format!(
                    "Severe error patterns: {}\nRelated best practices: {}\nRelated protocols: {}",
                    r.errors.len(),
                    r.recommendations.len(),
                    r.protocols.len()
                )
            })
        }
        KnowledgeCommand::Stats => {
            let stats = library.knowledge_stats();
            output.value(&stats, |s| {
                let mut text = format!(
                    "Error patterns: {}\nBest practices: {}\nProtocols: {}\nCategories: {}",
                    s.total_error_patterns,
                    s.total_best_practices,
                    s.total_network_protocols,
                    s.categories.join(", ")
                );
                for (severity, count) in &s.severity_distribution {
                    text.push_str(&format!("\n  {severity}: {count}"));
                }
                text
            })
        }
    }
}

fn not_found(kind: &str, id: &str) -> Result<bool> {
    eprintln!("No {kind} with id '{id}'");
    Ok(false)
}

fn render_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let preview: String = hit.content.chars().take(PREVIEW_CHARS).collect();
            format!(
                "{}. {} [{}] distance {:.3}\n   {}",
                i + 1,
                hit.filename(),
                hit.category(),
                hit.distance,
                preview.replace('\n', "\n   ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
