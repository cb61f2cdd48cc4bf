//! # Statement Analyst
//!
//! Turns the free-text summaries a language model writes about bank statements
//! into structured data, and keeps follow-up questions grounded in the uploaded
//! statements.
//!
//! ## Core Concepts
//!
//! - **Amounts**: model-written money strings (`$1,234.56`, `-€45`) are parsed
//!   tolerantly; anything unreadable is worth zero rather than an error
//! - **Category tables**: `- Category: <symbol><amount>` lines under a section
//!   marker become a name → amount table, summing repeated names
//! - **Aggregation**: one model request per statement, merged into
//!   statement-wide debit and credit tables sorted smallest first
//! - **Conversation**: every question resends all loaded statements plus the
//!   dialogue so far, trimmed by a configurable [`HistoryWindow`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use statement_analyst::*;
//! use statement_analyst::llm::GeminiAnalyzer;
//!
//! let config = AnalystConfig::from_env()?;
//! let analyzer = GeminiAnalyzer::from_config(&config);
//!
//! let mut session = Session::new("user-1").with_history_window(config.history_window);
//! session.load_statement(StatementDocument::from_path("march.pdf".as_ref()).await?);
//!
//! let summary = session.summary(&analyzer).await?;
//! for row in &summary.debits {
//!     println!("{}: {:.2}", row.category, row.amount);
//! }
//!
//! let answer = session.ask(&analyzer, "What did I spend most on?").await?;
//! ```

pub mod aggregator;
pub mod amount;
pub mod category;
pub mod config;
pub mod conversation;
pub mod error;
pub mod prompts;
pub mod session;
pub mod statement;

#[cfg(feature = "gemini")]
pub mod llm;

pub use aggregator::{
    combine_analyses, AggregationEvent, AggregationResult, DocumentAnalyzer, SkipReason,
    SkippedStatement, StatementAggregator, StatementAnalysis,
};
pub use amount::{contains_currency_symbol, parse_amount, Currency, MonetaryAmount};
pub use category::{
    extract_categories, extract_line_value, extract_totals, section_after, CategoryAmount,
    CategoryTable, StatementTotals,
};
pub use config::{AnalystConfig, DEFAULT_MODEL};
pub use conversation::{
    build_question_context, ConversationHistory, ConversationTurn, HistoryWindow,
    QuestionContext,
};
pub use error::{Result, StatementAnalystError};
pub use session::{MemorySessionStore, Session, SessionStore};
pub use statement::{StatementDocument, StatementSet};
