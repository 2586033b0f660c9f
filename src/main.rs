use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::Mutex;
use wallet_ui_bindings::{
    api::HttpSettingsApi,
    bindings::SubmitEvent,
    cli::{Args, Command},
    client::WalletSocketClient,
    client_state::ClientState,
    config::Config,
    events::create_event_channel,
    monitoring::setup_metrics,
    notify::TerminalNotifier,
    settings::{FlagOutcome, PasswordOutcome, SettingsController, SettingsView},
    tracing_setup::setup_tracing,
    ui::UIController,
};

use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_tracing(&args.log_level, args.json_logs)?;
    info!("Starting wallet UI v{}", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::from_args(&args)?);

    if config.metrics.enabled {
        setup_metrics(config.metrics.port).await?;
        info!("Metrics server started on port {}", config.metrics.port);
    }

    match args.command.clone().unwrap_or(Command::Watch) {
        Command::Watch => watch(config).await,
        Command::ChangePassword {
            old_password,
            new_password,
            confirm_password,
        } => change_password(&config, &old_password, &new_password, &confirm_password).await,
        Command::SpendUnconfirmed { enabled } => spend_unconfirmed(&config, enabled).await,
    }
}

async fn watch(config: Arc<Config>) -> Result<()> {
    let (event_sender, event_receiver) = create_event_channel();
    let state = Arc::new(Mutex::new(ClientState::new()));

    let mut client = WalletSocketClient::new(config.clone(), event_sender, state);
    let transport = tokio::spawn(async move { client.run().await });

    let mut ui = UIController::new(event_receiver, &config.display);
    info!("Watching {}. Press Ctrl+C to stop...", config.websocket.url);

    tokio::select! {
        _ = ui.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            transport.abort();
            return Ok(());
        }
    }
    drop(ui);

    match transport.await? {
        Ok(()) => {
            info!("Push channel stopped");
            Ok(())
        }
        Err(e) => {
            error!("Push channel error: {}", e);
            Err(e)
        }
    }
}

async fn change_password(
    config: &Config,
    old_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<()> {
    let view = SettingsView::default();
    view.old_password.set(old_password.to_string());
    view.new_password.set(new_password.to_string());
    view.confirm_password.set(confirm_password.to_string());

    let api = HttpSettingsApi::new(&config.http)?;
    let controller = SettingsController::new(
        view.clone(),
        api,
        TerminalNotifier::new(config.display.colored),
    );

    match controller.change_password(&SubmitEvent::new()).await {
        PasswordOutcome::Changed => Ok(()),
        PasswordOutcome::Invalid => {
            for (field, message) in [
                ("old", view.old_password_error.get()),
                ("new", view.new_password_error.get()),
                ("confirm", view.confirm_password_error.get()),
            ] {
                if !message.is_empty() {
                    eprintln!("--{}: {}", field, message);
                }
            }
            bail!("password change not submitted")
        }
        outcome => bail!("password change failed: {:?}", outcome),
    }
}

async fn spend_unconfirmed(config: &Config, enabled: bool) -> Result<()> {
    let view = SettingsView::default();
    // the checkbox already shows the requested value when the handler runs
    view.spend_unconfirmed_funds.set(enabled);

    let api = HttpSettingsApi::new(&config.http)?;
    let controller = SettingsController::new(
        view.clone(),
        api,
        TerminalNotifier::new(config.display.colored),
    );

    let outcome = controller.update_spend_unconfirmed().await;
    println!("spendUnconfirmed = {}", view.spend_unconfirmed_funds.get());

    match outcome {
        FlagOutcome::Saved => Ok(()),
        outcome => bail!("setting not saved: {:?}", outcome),
    }
}
