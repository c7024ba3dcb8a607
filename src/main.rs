// src/main.rs

use anyhow::Context;
use clap::Parser;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use shipconfirm::{
    CommandLineInput, CommerceHttpClient, EmailAlertChannel, HttpTemplateRenderer,
    InternalNotifier, LoggingConfig, NotificationChannel, NotifierConfig, RunConfig,
    RunOrchestrator, SlackWebhookChannel, SmtpCustomerMailer,
};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} - {l} - {m}{n}";

/// Sets up console and file logging.
fn setup_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&config.file)?;

    let log_config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(config.level),
        )?;

    log4rs::init_config(log_config)?;
    log::debug!("Logging initialized. Log file: {}", config.file.display());
    Ok(())
}

/// Builds the operator notifier. A channel that cannot be constructed is
/// dropped with an error log; the run still goes ahead.
fn build_notifier(config: &NotifierConfig) -> InternalNotifier {
    let chat: Option<Arc<dyn NotificationChannel>> = match &config.slack {
        Some(slack) => match SlackWebhookChannel::new(slack.clone()) {
            Ok(channel) => Some(Arc::new(channel)),
            Err(e) => {
                log::error!("Could not initialise Slack notifications: {}", e);
                None
            }
        },
        None => None,
    };

    let email: Option<Arc<dyn NotificationChannel>> = match &config.email {
        Some(alerts) => match EmailAlertChannel::new(alerts) {
            Ok(channel) => Some(Arc::new(channel)),
            Err(e) => {
                log::error!("Could not initialise email notifications: {}", e);
                None
            }
        },
        None => None,
    };

    InternalNotifier::new(chat, email, config.notify_empty_runs)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _cli = CommandLineInput::parse();
    dotenvy::dotenv().ok();

    let logging = LoggingConfig::from_env();
    setup_logging(&logging).context("failed to initialise logging")?;

    let config = RunConfig::from_env().context("invalid configuration")?;
    log::info!("Running in {} mode", config.mode);

    let source = CommerceHttpClient::new(config.commerce.clone())
        .context("failed to build commerce API client")?;
    let composer = HttpTemplateRenderer::new(config.template.clone())
        .context("failed to build template API client")?;
    let mailer = SmtpCustomerMailer::new(&config.orders_smtp, config.delivery.clone())
        .context("failed to configure orders SMTP account")?;
    let notifier = build_notifier(&config.notifier);

    let mut orchestrator = RunOrchestrator::new(
        Arc::new(source),
        Arc::new(composer),
        Arc::new(mailer),
        Arc::new(notifier),
    );
    let outcome = orchestrator.run().await;

    if outcome.is_fatal() {
        log::error!("Run {} ended in fatal failure", orchestrator.run_id());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
