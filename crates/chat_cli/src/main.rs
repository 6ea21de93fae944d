use std::env;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chat_orchestrator::{
    spawn_inactivity_watcher, ChatSession, ModeNoticeStyle, SessionConfig, SessionError,
    SubmitOutcome,
};
use chat_state::{SessionFeatures, SessionMode};
use clap::Parser;
use replicate_client::{ClientConfig, GenerationParams, ReplicateClient, DEFAULT_MODEL};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chat_cli", about = "Terminal chat against the hosted Arctic model")]
struct Cli {
    /// Sampling temperature, (0, 5]
    #[arg(long, default_value_t = 0.3)]
    temperature: f32,

    /// Nucleus sampling cutoff, (0, 1]
    #[arg(long, default_value_t = 0.9)]
    top_p: f32,

    /// Model served by the inference endpoint
    #[arg(long, env = "REPLICATE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Inference endpoint base URL
    #[arg(long, env = "REPLICATE_API_BASE", default_value = "https://api.replicate.com")]
    api_base: String,

    /// Token ceiling for the assembled prompt
    #[arg(long, default_value_t = 3072)]
    token_limit: usize,

    /// Model name used to resolve the token-counting encoding
    #[arg(long, default_value = "gpt-3.5-turbo")]
    tokenizer_model: String,

    /// Seconds of inactivity before the timeout mode ends the session
    #[arg(long, default_value_t = 120)]
    inactivity_secs: i64,

    /// Persist mode-toggle notices into the transcript instead of printing
    /// them transiently
    #[arg(long)]
    persist_mode_notices: bool,

    /// Disable the guessing game
    #[arg(long)]
    no_game: bool,

    /// Disable the anonymity toggle
    #[arg(long)]
    no_anonymity: bool,

    /// Disable the inactivity timeout mode
    #[arg(long)]
    no_timeout: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false),
        )
        .init();

    let cli = Cli::parse();

    let api_token = env::var("REPLICATE_API_TOKEN")
        .context("REPLICATE_API_TOKEN is not set; the endpoint needs a bearer credential")?;
    if !(api_token.starts_with("r8_") && api_token.len() == 40) {
        tracing::warn!("REPLICATE_API_TOKEN does not look like a valid token (r8_..., 40 chars)");
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    // Shared-secret precondition: chat stays disabled until it passes.
    if let Ok(access_code) = env::var("CHAT_ACCESS_CODE") {
        print!("Access code: ");
        std::io::stdout().flush()?;
        let entered = stdin.next_line().await?.unwrap_or_default();
        if entered.trim() != access_code {
            bail!("access code mismatch");
        }
    }

    let params = GenerationParams::new(cli.temperature, cli.top_p)
        .context("invalid sampling parameters")?;

    let client = ReplicateClient::new(ClientConfig {
        api_base: cli.api_base.clone(),
        model: cli.model.clone(),
        api_token,
    })
    .context("failed to build the inference client")?;

    let config = SessionConfig {
        features: SessionFeatures {
            game: !cli.no_game,
            anonymity: !cli.no_anonymity,
            timeout: !cli.no_timeout,
        },
        token_limit: cli.token_limit,
        tokenizer_model: cli.tokenizer_model.clone(),
        mode_notice_style: if cli.persist_mode_notices {
            ModeNoticeStyle::Persistent
        } else {
            ModeNoticeStyle::Transient
        },
        inactivity_threshold: chrono::Duration::seconds(cli.inactivity_secs),
        ..SessionConfig::default()
    };

    // Tokenizer initialization failure is fatal: no session can be served.
    let session = Arc::new(Mutex::new(
        ChatSession::new(config, Arc::new(client)).context("tokenizer initialization failed")?,
    ));

    let shutdown = CancellationToken::new();
    let watcher = spawn_inactivity_watcher(
        Arc::clone(&session),
        Duration::from_secs(5),
        shutdown.clone(),
    );

    println!("Assistant: {}", session.lock().await.transcript().last().content);
    println!("(commands: /privacy /anon /timeout /game /newgame /clear /reset /quit)");

    loop {
        print!("You: ");
        std::io::stdout().flush()?;
        let Some(line) = stdin.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" => break,
            "/clear" => {
                session.lock().await.clear_history();
                println!("(chat history cleared)");
                continue;
            }
            "/reset" => {
                session.lock().await.reset();
                println!("(session reset)");
                continue;
            }
            "/newgame" => {
                session.lock().await.reset_game();
                println!("(game reset)");
                continue;
            }
            "/game" => {
                let session = session.lock().await;
                let game = session.game();
                println!(
                    "Guessed words: {} | rules added: {}",
                    game.guessed().join(", "),
                    game.rules().len()
                );
                continue;
            }
            "/privacy" | "/anon" | "/timeout" => {
                let mode = match line {
                    "/privacy" => SessionMode::Privacy,
                    "/anon" => SessionMode::Anonymity,
                    _ => SessionMode::Timeout,
                };
                match session.lock().await.toggle_mode(mode) {
                    Ok(change) => println!("({})", change.notice),
                    Err(e) => println!("(error: {e})"),
                }
                continue;
            }
            _ => {}
        }

        let mut session = session.lock().await;
        match session.submit_user_input(line) {
            Ok(SubmitOutcome::GameMatched { announcement }) => {
                println!("Gamemaster: {announcement}");
                continue;
            }
            Ok(SubmitOutcome::Queued) => {}
            Err(e) => {
                println!("(error: {e})");
                continue;
            }
        }

        print!("Assistant: ");
        std::io::stdout().flush()?;
        let result = session
            .generate(&params, &CancellationToken::new(), |chunk| {
                print!("{chunk}");
                let _ = std::io::stdout().flush();
            })
            .await;
        println!();

        match result {
            Ok(summary) => {
                tracing::debug!(chunks = summary.chunks, chars = summary.chars, "reply folded");
            }
            Err(SessionError::BudgetExceeded { reason, recovery, .. }) => {
                println!("(error: {reason} {recovery})");
            }
            Err(e) => {
                println!("(error: {e})");
            }
        }
    }

    shutdown.cancel();
    let _ = watcher.await;
    Ok(())
}
