//! Startup wiring: config → pool → stores → email backend → pass.

use std::sync::Arc;

use tracing::{info, warn};

use sitewatch_core::Config;
use sitewatch_escalation::EscalationPass;
use sitewatch_notify::{EmailSender, FunctionEmailSender, NoopEmailSender, SmtpEmailSender};
use sitewatch_storage::{PgFindingStore, PgNotificationStore, PgProjectDirectory};

use crate::db;
use crate::state::AppState;

/// Pick the email backend from config: hosted function wins over SMTP;
/// with neither configured, emails are skipped and only notification rows
/// are written.
pub fn choose_email_sender(config: &Config) -> anyhow::Result<Arc<dyn EmailSender>> {
    if let Some(url) = &config.email_function.url {
        info!(url = %url, "email backend: function");
        let sender =
            FunctionEmailSender::new(url.clone(), config.email_function.api_key.clone())?;
        return Ok(Arc::new(sender));
    }

    if let Some(host) = &config.smtp.host {
        info!(host = %host, port = config.smtp.port, "email backend: smtp");
        let sender = SmtpEmailSender::from_config(
            host,
            Some(config.smtp.port),
            Some(config.smtp.tls),
            &config.smtp.from,
            None,
        )?;
        return Ok(Arc::new(sender));
    }

    warn!("no email backend configured; escalation emails will be skipped");
    Ok(Arc::new(NoopEmailSender))
}

/// Connect to Postgres and assemble the application state.
pub async fn build_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let pool = db::init_pg_pool(&config.postgres).await?;
    let email = choose_email_sender(&config)?;

    let pass = EscalationPass::new(
        Arc::new(PgFindingStore::new(pool.clone())),
        Arc::new(PgProjectDirectory::new(pool.clone())),
        Arc::new(PgNotificationStore::new(pool)),
        email,
    );

    Ok(Arc::new(AppState { config, pass }))
}
