use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use car_rental::config::{DatabaseConfig, EnvironmentConfig};
use car_rental::create_app;
use car_rental::database::{connect, run_migrations};
use car_rental::repositories::{MemoryStore, Repositories};
use car_rental::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar .env
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    info!("🚗 Car Rental API");
    info!("================================================");
    info!("🌍 Environment: {}", config.environment);

    let repositories = match DatabaseConfig::from_env()? {
        Some(database) => {
            let pool = connect(&database).await.map_err(|e| {
                error!("❌ Database connection failed: {}", e);
                e
            })?;
            run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        None if config.is_development() => {
            warn!("⚠️ DATABASE_URL not set, using the in-memory store");
            Repositories::memory(Arc::new(MemoryStore::new()))
        }
        None => return Err(anyhow::anyhow!("DATABASE_URL must be set outside development")),
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;

    let state = AppState::with_integrations(config.clone(), repositories, http);
    info!(
        "📨 Notification channels: {:?}",
        state.notifications.channel_names()
    );
    if config.stripe.secret_key.is_none() {
        warn!("⚠️ STRIPE_SECRET_KEY not set, payment intents are disabled");
    }

    let app = create_app(state);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Server listening on http://{}", addr);
    info!("🔍 Available endpoints:");
    info!("   GET  /health - Health check");
    info!("🔐 Auth:");
    info!("   POST /api/auth/signup - Create an account");
    info!("   POST /api/auth/login - Log in");
    info!("   POST /api/auth/logout - Log out");
    info!("   GET  /api/auth/me - Current user");
    info!("🚙 Cars:");
    info!("   GET  /api/cars - List cars");
    info!("   POST /api/cars - Add a car (admin)");
    info!("   GET  /api/cars/:id - Get a car");
    info!("   PUT  /api/cars/:id - Update a car (admin)");
    info!("   DELETE /api/cars/:id - Delete a car (admin)");
    info!("📅 Bookings:");
    info!("   GET  /api/bookings - List bookings");
    info!("   POST /api/bookings - Create a booking");
    info!("   GET  /api/bookings/:id - Get a booking");
    info!("   PUT  /api/bookings/:id - Update a booking");
    info!("   DELETE /api/bookings/:id - Cancel a booking");
    info!("📍 Tracking:");
    info!("   GET  /api/tracking - Read tracking samples");
    info!("   POST /api/tracking - Record a tracking sample");
    info!("💳 Payments:");
    info!("   POST /api/payments/create-intent - Open a payment intent");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Server error: {}", e);
            e
        })?;

    info!("👋 Server stopped");
    Ok(())
}

/// Ctrl+C o SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
