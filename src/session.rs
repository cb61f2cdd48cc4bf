use crate::aggregator::{AggregationEvent, AggregationResult, DocumentAnalyzer, StatementAggregator};
use crate::conversation::{build_question_context, ConversationHistory, HistoryWindow};
use crate::error::{Result, StatementAnalystError};
use crate::statement::{StatementDocument, StatementSet};
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::mpsc::Sender;

/// Per-user state: loaded statements, the cached summary and the dialogue so far.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    statements: StatementSet,
    history: ConversationHistory,
    summary: Option<AggregationResult>,
    /// Statement count the cached summary was computed from.
    summarized_count: usize,
    window: HistoryWindow,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            statements: StatementSet::new(),
            history: ConversationHistory::new(),
            summary: None,
            summarized_count: 0,
            window: HistoryWindow::All,
        }
    }

    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.window = window;
        self
    }

    pub fn statements(&self) -> &StatementSet {
        &self.statements
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn history_window(&self) -> HistoryWindow {
        self.window
    }

    /// Returns `false` if a statement with that name was already loaded.
    pub fn load_statement(&mut self, document: StatementDocument) -> bool {
        self.statements.insert(document)
    }

    pub fn load_statements<I: IntoIterator<Item = StatementDocument>>(&mut self, documents: I) -> usize {
        let added = self.statements.extend(documents);
        if added > 0 {
            info!("Session {}: loaded {} new statement(s)", self.id, added);
        }
        added
    }

    pub fn needs_summary(&self) -> bool {
        self.summary.is_none() || self.summarized_count != self.statements.len()
    }

    pub fn cached_summary(&self) -> Option<&AggregationResult> {
        self.summary.as_ref()
    }

    /// The aggregated summary, recomputed only when statements were added since the last run.
    pub async fn summary<A: DocumentAnalyzer + ?Sized>(
        &mut self,
        analyzer: &A,
    ) -> Result<&AggregationResult> {
        self.summary_with_progress(analyzer, None).await
    }

    /// Same as [`Session::summary`], reporting per-statement progress when a
    /// recomputation happens. A cached summary sends no events.
    pub async fn summary_with_progress<A: DocumentAnalyzer + ?Sized>(
        &mut self,
        analyzer: &A,
        progress: Option<Sender<AggregationEvent>>,
    ) -> Result<&AggregationResult> {
        if self.statements.is_empty() {
            return Err(StatementAnalystError::NoStatements);
        }

        if self.needs_summary() {
            let mut aggregator = StatementAggregator::new(analyzer);
            if let Some(tx) = progress {
                aggregator = aggregator.with_progress(tx);
            }
            let result = aggregator.summarize(&self.statements).await;
            self.summarized_count = self.statements.len();
            self.summary = Some(result);
        } else {
            debug!("Session {}: reusing cached summary", self.id);
        }

        self.summary
            .as_ref()
            .ok_or(StatementAnalystError::NoStatements)
    }

    /// Ask a follow-up question grounded in every loaded statement and the dialogue so far.
    /// The turn is recorded only when the model answers.
    pub async fn ask<A: DocumentAnalyzer + ?Sized>(
        &mut self,
        analyzer: &A,
        question: &str,
    ) -> Result<String> {
        let answer = {
            let context =
                build_question_context(&self.statements, &self.history, question, self.window);
            debug!(
                "Session {}: asking with {} document(s), {} turn(s) ({} omitted)",
                self.id,
                context.documents.len(),
                context.turns_included,
                context.turns_omitted
            );
            analyzer
                .generate(&context.prompt, context.documents)
                .await?
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| StatementAnalystError::EmptyResponse("question".to_string()))?
        };

        self.history.push(question, answer.clone());
        Ok(answer)
    }
}

/// Host-side storage of sessions by id.
pub trait SessionStore {
    /// The session for `id`, created on first use.
    fn session(&mut self, id: &str) -> &mut Session;

    fn get(&self, id: &str) -> Option<&Session>;

    /// Tear the session down, handing back its final state.
    fn end(&mut self, id: &str) -> Option<Session>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<String, Session>,
    window: HistoryWindow,
}

impl MemorySessionStore {
    pub fn new(window: HistoryWindow) -> Self {
        Self {
            sessions: HashMap::new(),
            window,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn session(&mut self, id: &str) -> &mut Session {
        let window = self.window;
        self.sessions.entry(id.to_string()).or_insert_with(|| {
            debug!("Creating session {}", id);
            Session::new(id).with_history_window(window)
        })
    }

    fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    fn end(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }
}
