//! `docfox chat` — interactive or single-message chat mode.

use std::sync::Arc;

use docfox_agent::summarizer::ModelSummarizer;
use docfox_agent::turn::TurnController;
use docfox_capabilities::{CapabilitiesConfig, NotifyConfig};
use docfox_config::AppConfig;
use docfox_core::error::Error;
use docfox_core::message::SessionId;
use docfox_core::model::ModelClient;
use docfox_core::session::SessionStore;
use docfox_providers::OpenAiCompatClient;
use docfox_session::{FileSessionStore, InMemorySessionStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

/// Shown when a turn aborts on a model or session fault. The session is
/// unchanged, so retrying the same input is always safe.
const TURN_FAILURE_ANSWER: &str =
    "Something went wrong while processing that turn. Your session is unchanged — please try again.";

pub async fn run(
    message: Option<String>,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for an API key early — give a clear error
    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    DOCFOX_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    // Build collaborators
    let model: Arc<dyn ModelClient> =
        Arc::new(OpenAiCompatClient::new("openai", &config.api_url, api_key)?);
    let summarizer = Arc::new(ModelSummarizer::new(model.clone(), &config.model));

    let registry = Arc::new(docfox_capabilities::default_registry(&CapabilitiesConfig {
        save_dir: config.save_dir.clone(),
        docs_dir: config.docs_dir.clone(),
        notify: NotifyConfig {
            bot_token: config.chat.bot_token.clone(),
            default_channel: config.chat.default_channel.clone(),
        },
    }));

    let store: Arc<dyn SessionStore> = match config.session.backend.as_str() {
        "file" => Arc::new(FileSessionStore::new(config.session.dir.clone())),
        _ => Arc::new(InMemorySessionStore::new()),
    };

    let controller = TurnController::new(model, summarizer, registry, store, &config.model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_max_turns(config.max_turns);

    let session_id = session
        .map(|s| SessionId::from(&s))
        .unwrap_or_default();

    if let Some(text) = message {
        // Single message mode
        let outcome = controller.handle(&session_id, &text).await?;
        println!("{}", outcome.answer);
        if let Some(path) = outcome.saved_file {
            println!("(saved: {path})");
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  docfox — grounded study assistant");
    println!();
    println!("  Model:    {}", config.model);
    println!("  Session:  {}", session_id);
    println!("  Sessions: {} backend", config.session.backend);
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit', 'quit' or 'q' to clear the session and leave.");
    println!();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    print_prompt();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            print_prompt();
            continue;
        }

        match controller.handle(&session_id, input).await {
            Ok(outcome) => {
                println!();
                println!("{}", outcome.answer);
                if let Some(path) = outcome.saved_file {
                    println!("(saved: {path})");
                }
                println!();
                if outcome.reset {
                    println!("Goodbye!");
                    break;
                }
            }
            Err(e @ (Error::Model(_) | Error::Session(_))) => {
                // Turn atomicity: the session was not mutated.
                error!(error = %e, "Turn aborted");
                println!();
                println!("{TURN_FAILURE_ANSWER}");
                println!();
            }
            Err(e) => {
                error!(error = %e, "Unexpected turn error");
                println!();
                println!("{TURN_FAILURE_ANSWER}");
                println!();
            }
        }

        print_prompt();
    }

    Ok(())
}

fn print_prompt() {
    use std::io::Write;
    print!("  You > ");
    let _ = std::io::stdout().flush();
}
