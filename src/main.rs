use std::sync::Arc;

use inquiry_router::api::{self, AppState};
use inquiry_router::config::ServerConfig;
use inquiry_router::mail::{DisabledMailer, MailConfig, Mailer, SmtpMailer};
use inquiry_router::store::{Database, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();

    eprintln!("📮 Inquiry Router v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}:{}", config.bind_addr, config.port);
    eprintln!("   Database: {}", config.database_path);

    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(std::path::Path::new(&config.database_path)).await?,
    );

    let mailer: Arc<dyn Mailer> = match MailConfig::from_env() {
        Some(mail_config) => {
            eprintln!(
                "   Mail: enabled (SMTP: {}, inbox: {})",
                mail_config.smtp_host, mail_config.recipient
            );
            Arc::new(SmtpMailer::new(mail_config))
        }
        None => {
            eprintln!("   Mail: disabled (SMTP_HOST not set — contact dispatch will fail)");
            Arc::new(DisabledMailer)
        }
    };

    let app = api::routes(AppState::new(db, mailer, config.session_ttl_secs));

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.bind_addr, config.port)).await?;
    tracing::info!(port = config.port, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}
