//! Wayfis Telegram storefront
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use tracing::{info, warn, error};

use wayfis::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, DatabaseConfig, create_pool, run_migrations},
    services::{ServiceFactory, SessionStore},
    handlers::{
        commands::{handle_command, Command},
        callbacks::handle_callback_query,
        messages::handle_message,
    },
    web::{self, AppState},
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", wayfis::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;

    // Run database migrations
    info!("Running database migrations...");
    run_migrations(&db_pool).await?;

    let database_service = DatabaseService::new(db_pool);

    if settings.features.seed_demo_data && database_service.seed_demo_data().await? {
        info!("Seeded demo product");
    }

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    // Initialize services
    info!("Initializing services...");
    let services = Arc::new(ServiceFactory::new(bot.clone(), &settings, database_service)?);

    if settings.features.admin_web {
        info!("Connecting to Redis...");
        let sessions = SessionStore::connect(&settings.redis, &settings.admin).await?;
        let state = AppState::new(services.clone(), sessions);
        let bind_addr = settings.admin.bind_addr.clone();

        tokio::spawn(async move {
            if let Err(e) = web::serve(&bind_addr, state).await {
                error!(error = %e, "Admin web stopped");
            }
        });
    }

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![services])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    info!("Wayfis bot has been shut down.");

    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_commands),
                )
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
}

/// Handle bot commands
async fn handle_commands(bot: Bot, msg: Message, cmd: Command, services: Arc<ServiceFactory>) -> HandlerResult {
    let chat_id = msg.chat.id;

    if let Err(e) = handle_command(bot.clone(), msg, cmd, (*services).clone()).await {
        error!(error = %e, "Error handling command");
        bot.send_message(chat_id, e.user_message()).await?;
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(bot: Bot, msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
    let chat_id = msg.chat.id;

    if let Err(e) = handle_message(bot.clone(), msg, (*services).clone()).await {
        error!(error = %e, "Error handling message");
        bot.send_message(chat_id, e.user_message()).await?;
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(bot: Bot, query: CallbackQuery, services: Arc<ServiceFactory>) -> HandlerResult {
    let user_id = query.from.id.0 as i64;

    if let Err(e) = handle_callback_query(bot, query, (*services).clone()).await {
        error!(user_id = user_id, error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}
