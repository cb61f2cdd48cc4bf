use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use statement_analyst::llm::GeminiAnalyzer;
use statement_analyst::{AggregationEvent, AnalystConfig, Session, StatementDocument};
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;

fn statement_paths() -> Result<Vec<PathBuf>> {
    let paths: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: chat_with_statements <statement.pdf>...");
    }
    Ok(paths)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AnalystConfig::from_env()?;
    let analyzer = GeminiAnalyzer::from_config(&config);
    let mut session = Session::new("terminal").with_history_window(config.history_window);

    for path in statement_paths()? {
        let document = StatementDocument::from_path(&path)
            .await
            .with_context(|| format!("loading {}", path.display()))?;
        if !session.load_statement(document) {
            println!("⚠️  {} is already loaded, skipping", path.display());
        }
    }
    println!("✅ Loaded {} statement(s).\n", session.statements().len());

    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AggregationEvent::Analyzing { statement } => println!("📄 Analyzing {}...", statement),
                AggregationEvent::Skipped { statement, reason } => {
                    println!("⚠️  Skipped {}: {:?}", statement, reason)
                }
                AggregationEvent::NothingExtracted => {
                    println!("⚠️  No categories could be extracted; showing raw analysis.")
                }
                _ => {}
            }
        }
    });

    let result = session
        .summary_with_progress(&analyzer, Some(tx))
        .await?
        .clone();
    let _ = printer.await;

    println!("\n{}\n", result.summary);
    println!("DEBITS (smallest first)");
    for row in &result.debits {
        println!("  {:<30} {:>12.2}", row.category, row.amount);
    }
    println!("CREDITS (smallest first)");
    for row in &result.credits {
        println!("  {:<30} {:>12.2}", row.category, row.amount);
    }

    println!("\n🤖 Ask questions about your statements (type 'quit' to exit).");
    println!("------------------------------------------------------------------");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let prompt = input.trim();

        if prompt.eq_ignore_ascii_case("quit") || prompt.eq_ignore_ascii_case("exit") {
            break;
        }

        if prompt.is_empty() {
            continue;
        }

        println!("\nThinking...");

        match session.ask(&analyzer, prompt).await {
            Ok(response) => {
                println!("\n{}\n", response);
                println!("------------------------------------------------------------------");
            }
            Err(e) => {
                eprintln!("❌ Error: {}", e);
            }
        }
    }

    Ok(())
}
