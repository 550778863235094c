use bond_portal::{
    config,
    core::{
        fetcher::PageFetcher,
        list_state::ListDisplay,
        opportunity::{funding_progress, seed_opportunities},
        session::{FileSessionStore, load_session, save_session},
    },
    errors::Result,
    lists,
    sources::DbSource,
};
use chrono::Utc;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Initialize database
    let db = config::database::init_database(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed opportunities (only into an empty table)
    seed_opportunities(&db, &app_config.settings.opportunities)
        .await
        .inspect_err(|e| error!("Failed to seed opportunities: {}", e))?;

    // 6. Restore the persisted session and write back what survived the restore
    let store = FileSessionStore::new(&app_config.session_path);
    let session = load_session(&store, Utc::now()).await?;
    match session.auth() {
        Some(auth) if session.is_authenticated(Utc::now()) => {
            info!("Restored session for {} ({:?})", auth.email, auth.role);
        }
        _ => info!("No signed-in session"),
    }
    save_session(&store, &session).await?;

    // 7. Load the first page of investment opportunities
    let source = Arc::new(DbSource::new(db));
    let mut fetcher = PageFetcher::new(Arc::clone(&source));
    let mut opportunities = lists::investment_opportunities(&app_config.settings.lists);
    let request = opportunities.refresh();
    fetcher
        .load(&mut opportunities, request)
        .await
        .inspect_err(|e| error!("Failed to load opportunities: {}", e))?;

    let view = opportunities.view();
    info!(
        "Investment opportunities: page {} of {}",
        view.current_page, view.total_pages
    );
    match opportunities.display() {
        ListDisplay::Rows(rows) => {
            for opportunity in rows {
                info!(
                    "  {} by {}: {:.2}% over {} months, {:.0}% funded",
                    opportunity.title,
                    opportunity.issuer,
                    opportunity.rate,
                    opportunity.term_months,
                    funding_progress(opportunity)
                );
            }
        }
        ListDisplay::Empty(message) => info!("  {}", message),
        ListDisplay::Loading => info!("  Loading..."),
        ListDisplay::Error(message) => error!("  {}", message),
    }

    Ok(())
}
