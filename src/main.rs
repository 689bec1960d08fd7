use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use scholarbot::adapters::{DiscordGateway, DiscordRestClient};
use scholarbot::cli::{Cli, Commands, RosterAction};
use scholarbot::commands::CommandContext;
use scholarbot::config::AppConfig;
use scholarbot::dispatch::Dispatcher;
use scholarbot::error::Result;
use scholarbot::leaderboard::format_leaderboard;
use scholarbot::ranking::{FallbackRankingClient, LeaderboardService, PrimaryRankingClient};
use scholarbot::roster::{LoadOutcome, RosterStore};

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},scholarbot=debug")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn init_logging_simple() {
    // Minimal logging for one-shot CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

fn validate_config(cfg: AppConfig) -> Result<AppConfig> {
    if let Err(errors) = cfg.validate() {
        for e in &errors {
            error!("config: {e}");
        }
        return Err(scholarbot::BotError::Internal(format!(
            "invalid configuration: {}",
            errors.join("; ")
        )));
    }
    Ok(cfg)
}

fn build_leaderboard_service(cfg: &AppConfig) -> Result<LeaderboardService> {
    let timeout = Duration::from_secs(cfg.ranking.timeout_secs);
    let primary = PrimaryRankingClient::new(&cfg.ranking.primary_url, timeout)?;
    let fallback = FallbackRankingClient::new(&cfg.ranking.fallback_url, timeout)?;
    Ok(LeaderboardService::new(
        Box::new(primary),
        Box::new(fallback),
    ))
}

fn load_roster(cfg: &AppConfig) -> RosterStore {
    let (store, outcome) = RosterStore::load(cfg.roster.path.clone());
    match outcome {
        LoadOutcome::Loaded => {}
        LoadOutcome::Absent => info!("no roster file yet, starting empty"),
        LoadOutcome::Corrupt => warn!("roster file corrupt, starting empty"),
    }
    store
}

async fn run_bot(cfg: AppConfig) -> Result<()> {
    let token = cfg.bot_token()?;
    let timeout = Duration::from_secs(cfg.ranking.timeout_secs);

    let api = Arc::new(DiscordRestClient::new(
        &cfg.discord.api_base,
        &token,
        timeout,
    )?);
    let roster = Arc::new(Mutex::new(load_roster(&cfg)));
    let leaderboard = Arc::new(build_leaderboard_service(&cfg)?);
    let dispatcher = Arc::new(Dispatcher::new(&cfg.discord.prefix));

    let (message_tx, mut message_rx) = mpsc::channel(256);
    let gateway = DiscordGateway::new(&cfg.discord.gateway_url, &token, message_tx);

    let gateway_task = tokio::spawn(async move { gateway.run().await });

    let dispatch_task = tokio::spawn({
        let api = api.clone();
        async move {
            while let Some(msg) = message_rx.recv().await {
                if msg.author_is_bot {
                    continue;
                }
                let ctx = CommandContext {
                    api: api.clone(),
                    roster: roster.clone(),
                    leaderboard: leaderboard.clone(),
                    guild_id: msg.guild_id.clone(),
                    channel_id: msg.channel_id.clone(),
                    author: msg.author.clone(),
                };
                let dispatcher = dispatcher.clone();
                // One task per invocation; handlers never bring the loop down.
                tokio::spawn(async move {
                    dispatcher.dispatch(&ctx, &msg.content).await;
                });
            }
        }
    });

    info!("scholarbot running, press ctrl-c to stop");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested");
        }
        res = gateway_task => {
            error!("gateway task exited: {res:?}");
        }
        _ = dispatch_task => {
            error!("dispatch task exited");
        }
    }

    Ok(())
}

async fn run_top(cfg: AppConfig) -> Result<()> {
    let roster = load_roster(&cfg);
    let service = build_leaderboard_service(&cfg)?;
    let entries = service.fetch(roster.entries()).await?;
    print!("{}", format_leaderboard(&entries));
    Ok(())
}

fn run_roster(cfg: AppConfig, action: RosterAction) -> Result<()> {
    let mut store = load_roster(&cfg);
    match action {
        RosterAction::Add { id, name } => {
            store.add(&id, &name)?;
            store.save()?;
            println!("added {id}");
        }
        RosterAction::Remove { key } => {
            let removed = store.remove(&key)?;
            store.save()?;
            println!("removed {}({})", removed.name, removed.id);
        }
        RosterAction::List => {
            for (id, name) in store.entries() {
                println!("{id}\t{name}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let cfg = AppConfig::load_from(&cli.config)?;
            init_logging(&cfg.logging.level);
            let cfg = validate_config(cfg)?;
            run_bot(cfg).await
        }
        Commands::Top => {
            init_logging_simple();
            let cfg = validate_config(AppConfig::load_from(&cli.config)?)?;
            run_top(cfg).await
        }
        Commands::Roster { action } => {
            init_logging_simple();
            let cfg = validate_config(AppConfig::load_from(&cli.config)?)?;
            run_roster(cfg, action)
        }
    }
}
