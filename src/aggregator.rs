use crate::category::{
    extract_categories, extract_line_value, extract_totals, CategoryAmount, CategoryTable,
    StatementTotals,
};
use crate::error::Result;
use crate::prompts::{
    CREDITS_MARKER, DEBITS_MARKER, PERIOD_MARKER, STATEMENT_ANALYSIS_PROMPT, TOTALS_MARKER,
};
use crate::statement::{StatementDocument, StatementSet};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

/// The model boundary: a prompt plus the attached documents in, generated text out.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// `Ok(None)` means the model answered without any usable text.
    async fn generate(
        &self,
        prompt: &str,
        documents: &[StatementDocument],
    ) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AggregationEvent {
    Starting { statements: usize },
    Analyzing { statement: String },
    Extracted { statement: String, debits: usize, credits: usize },
    Skipped { statement: String, reason: SkipReason },
    NothingExtracted,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    EmptyResponse,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStatement {
    pub statement: String,
    pub reason: SkipReason,
}

/// What one statement's response contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementAnalysis {
    pub statement: String,
    pub period: Option<String>,
    pub debits: CategoryTable,
    pub credits: CategoryTable,
    pub totals: StatementTotals,
    pub text: String,
}

impl StatementAnalysis {
    pub fn from_response(statement: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            statement: statement.into(),
            period: extract_line_value(&text, PERIOD_MARKER),
            debits: extract_categories(&text, DEBITS_MARKER),
            credits: extract_categories(&text, CREDITS_MARKER),
            totals: extract_totals(&text, TOTALS_MARKER),
            text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.debits.is_empty() && self.credits.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Every statement's response, each under a `### <file name>` header.
    pub summary: String,
    /// Debit categories across all statements, smallest amount first.
    pub debits: Vec<CategoryAmount>,
    /// Credit categories across all statements, smallest amount first.
    pub credits: Vec<CategoryAmount>,
    pub analyses: Vec<StatementAnalysis>,
    pub skipped: Vec<SkippedStatement>,
}

impl AggregationResult {
    /// No category could be read from any statement. The summary text may still be useful.
    pub fn nothing_extracted(&self) -> bool {
        self.debits.is_empty() && self.credits.is_empty()
    }

    pub fn total_debits(&self) -> f64 {
        self.debits.iter().map(|row| row.amount).sum()
    }

    pub fn total_credits(&self) -> f64 {
        self.credits.iter().map(|row| row.amount).sum()
    }

    pub fn net_change(&self) -> f64 {
        self.total_credits() - self.total_debits()
    }
}

/// Fold per-statement analyses into statement-wide tables.
pub fn combine_analyses(
    analyses: Vec<StatementAnalysis>,
    skipped: Vec<SkippedStatement>,
) -> AggregationResult {
    let mut debits = CategoryTable::new();
    let mut credits = CategoryTable::new();
    let mut sections = Vec::with_capacity(analyses.len());

    for analysis in &analyses {
        debits.merge(&analysis.debits);
        credits.merge(&analysis.credits);
        sections.push(format!("### {}\n\n{}", analysis.statement, analysis.text.trim()));
    }

    AggregationResult {
        summary: sections.join("\n\n"),
        debits: debits.sorted_ascending(),
        credits: credits.sorted_ascending(),
        analyses,
        skipped,
    }
}

pub struct StatementAggregator<'a, A: DocumentAnalyzer + ?Sized> {
    analyzer: &'a A,
    prompt: String,
    progress: Option<Sender<AggregationEvent>>,
}

impl<'a, A: DocumentAnalyzer + ?Sized> StatementAggregator<'a, A> {
    pub fn new(analyzer: &'a A) -> Self {
        Self {
            analyzer,
            prompt: STATEMENT_ANALYSIS_PROMPT.to_string(),
            progress: None,
        }
    }

    /// Replace the analysis instructions, e.g. for a bank with an unusual layout.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_progress(mut self, progress: Sender<AggregationEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Analyze each statement in upload order, one request at a time.
    ///
    /// A statement whose request fails or comes back empty is recorded in
    /// [`AggregationResult::skipped`]; the rest of the batch still counts.
    pub async fn summarize(&self, statements: &StatementSet) -> AggregationResult {
        self.send_event(AggregationEvent::Starting {
            statements: statements.len(),
        })
        .await;

        let mut analyses = Vec::new();
        let mut skipped = Vec::new();

        for document in statements {
            self.send_event(AggregationEvent::Analyzing {
                statement: document.name.clone(),
            })
            .await;

            let reason = match self
                .analyzer
                .generate(&self.prompt, std::slice::from_ref(document))
                .await
            {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    let analysis = StatementAnalysis::from_response(&document.name, text);
                    debug!(
                        "Statement '{}': {} debit and {} credit categories",
                        document.name,
                        analysis.debits.len(),
                        analysis.credits.len()
                    );
                    self.send_event(AggregationEvent::Extracted {
                        statement: document.name.clone(),
                        debits: analysis.debits.len(),
                        credits: analysis.credits.len(),
                    })
                    .await;
                    analyses.push(analysis);
                    continue;
                }
                Ok(_) => SkipReason::EmptyResponse,
                Err(e) => SkipReason::Failed(e.to_string()),
            };

            warn!("Skipping statement '{}': {:?}", document.name, reason);
            self.send_event(AggregationEvent::Skipped {
                statement: document.name.clone(),
                reason: reason.clone(),
            })
            .await;
            skipped.push(SkippedStatement {
                statement: document.name.clone(),
                reason,
            });
        }

        let result = combine_analyses(analyses, skipped);

        if result.nothing_extracted() {
            warn!(
                "No categories could be extracted from {} statement(s)",
                statements.len()
            );
            self.send_event(AggregationEvent::NothingExtracted).await;
        } else {
            info!(
                "Aggregated {} debit and {} credit categories from {} statement(s)",
                result.debits.len(),
                result.credits.len(),
                result.analyses.len()
            );
        }

        self.send_event(AggregationEvent::Finished).await;
        result
    }

    async fn send_event(&self, event: AggregationEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_from_response() {
        let text = "STATEMENT PERIOD: 1 Jan 2024 - 31 Jan 2024\n\
            DEBITS BY CATEGORY:\n\
            - Rent: €950.00\n\
            \n\
            CREDITS BY CATEGORY:\n\
            - Salary: €2,400.00\n\
            \n\
            TOTAL SUMMARY:\n\
            Total Debits: €950.00\n\
            Total Credits: €2,400.00\n\
            Net Change: €1,450.00";
        let analysis = StatementAnalysis::from_response("jan.pdf", text);

        assert_eq!(analysis.period.as_deref(), Some("1 Jan 2024 - 31 Jan 2024"));
        assert_eq!(analysis.debits.get("Rent"), Some(950.0));
        assert_eq!(analysis.credits.get("Salary"), Some(2400.0));
        assert_eq!(analysis.totals.net_change, Some(1450.0));
        assert!(!analysis.is_empty());
    }

    #[test]
    fn test_combine_sums_across_statements() {
        let first = StatementAnalysis::from_response(
            "a.pdf",
            "DEBITS BY CATEGORY:\n- Rent: $1000\n- Coffee: $20\n",
        );
        let second = StatementAnalysis::from_response(
            "b.pdf",
            "DEBITS BY CATEGORY:\n- Rent: $1000\n\nCREDITS BY CATEGORY:\n- Refund: $15\n",
        );

        let result = combine_analyses(vec![first, second], Vec::new());

        assert_eq!(
            result.debits,
            vec![
                CategoryAmount {
                    category: "Coffee".to_string(),
                    amount: 20.0
                },
                CategoryAmount {
                    category: "Rent".to_string(),
                    amount: 2000.0
                },
            ]
        );
        assert_eq!(result.total_credits(), 15.0);
        assert_eq!(result.net_change(), 15.0 - 2020.0);
        assert!(result.summary.starts_with("### a.pdf\n\n"));
        assert!(result.summary.contains("### b.pdf\n\n"));
    }

    #[test]
    fn test_unstructured_text_is_kept() {
        let analysis = StatementAnalysis::from_response("odd.pdf", "I could not read this file.");
        let result = combine_analyses(vec![analysis], Vec::new());

        assert!(result.nothing_extracted());
        assert_eq!(result.summary, "### odd.pdf\n\nI could not read this file.");
    }
}
