use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::trace::TraceLayer;

use chess_client_core::{GameSession, Settings};

mod routes;

pub struct AppState {
    pub session: Mutex<GameSession>,
}

impl AppState {
    /// Takes any freshly scheduled computer reply and spawns the delayed
    /// task that applies it. The generation token makes a stale task a
    /// no-op: reset/undo bump the generation before the sleep elapses.
    pub fn drive_reply(self: &Arc<Self>) {
        let ticket = {
            let mut session = self.session.lock().unwrap();
            session.take_reply_ticket()
        };
        let Some(ticket) = ticket else {
            return;
        };

        let state = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(ticket.delay).await;
            let mut session = state.session.lock().unwrap();
            match session.play_reply(ticket.generation) {
                Ok(true) => tracing::debug!("computer reply applied"),
                Ok(false) => tracing::debug!("computer reply dropped as stale"),
                Err(e) => tracing::error!("computer reply failed: {e}"),
            }
        });
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let state = Arc::new(AppState {
        session: Mutex::new(GameSession::new(Settings::default())),
    });

    // 1 Hz clock driver; the session ignores ticks while paused or after
    // game over, so a stale tick can never touch a finished game.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                state.session.lock().unwrap().tick();
            }
        });
    }

    let app = Router::new()
        .route("/state", get(routes::state))
        .route("/clock", get(routes::clock))
        .route("/settings", get(routes::settings).post(routes::update_settings))
        .route("/select", post(routes::select))
        .route("/move", post(routes::make_move))
        .route("/undo", post(routes::undo))
        .route("/reset", post(routes::reset))
        .route("/timer/start", post(routes::start_timer))
        .route("/timer/pause", post(routes::pause_timer))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();

    println!("Chess client running at http://localhost:3000");

    axum::serve(listener, app).await.unwrap();
}
