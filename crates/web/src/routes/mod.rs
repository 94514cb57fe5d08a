use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use chess_client_core::{
    GameState, PieceKind, SelectOutcome, Settings, SettingsUpdate, Square,
};

use crate::AppState;

#[derive(Serialize)]
pub struct StateResponse {
    pub game: GameState,
    pub selected: Option<Square>,
    pub legal_destinations: Vec<Square>,
}

#[derive(Serialize)]
pub struct ClockResponse {
    pub white: u32,
    pub black: u32,
    pub running: bool,
}

#[derive(Deserialize)]
pub struct SelectBody {
    pub square: String,
}

#[derive(Deserialize)]
pub struct MoveBody {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

fn parse_square(name: &str) -> Result<Square, (StatusCode, String)> {
    Square::from_name(name)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid square: {name}")))
}

fn parse_promotion(name: &str) -> Result<PieceKind, (StatusCode, String)> {
    match name {
        "q" | "queen" => Ok(PieceKind::Queen),
        "r" | "rook" => Ok(PieceKind::Rook),
        "b" | "bishop" => Ok(PieceKind::Bishop),
        "n" | "knight" => Ok(PieceKind::Knight),
        other => Err((
            StatusCode::BAD_REQUEST,
            format!("invalid promotion piece: {other}"),
        )),
    }
}

fn state_response(state: &Arc<AppState>) -> Json<StateResponse> {
    let session = state.session.lock().unwrap();
    Json(StateResponse {
        game: session.game_state().clone(),
        selected: session.selected(),
        legal_destinations: session.legal_destinations().to_vec(),
    })
}

pub async fn state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    state_response(&state)
}

pub async fn clock(State(state): State<Arc<AppState>>) -> Json<ClockResponse> {
    let session = state.session.lock().unwrap();
    Json(ClockResponse {
        white: session.white_time(),
        black: session.black_time(),
        running: session.timer_running(),
    })
}

pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let square = parse_square(&body.square)?;

    let outcome = {
        let mut session = state.session.lock().unwrap();
        session.select_square(square)
    };
    if outcome == SelectOutcome::Moved {
        state.drive_reply();
    }

    #[derive(Serialize)]
    struct SelectResponse {
        outcome: SelectOutcome,
        #[serde(flatten)]
        state: StateResponse,
    }

    let session = state.session.lock().unwrap();
    Ok(Json(SelectResponse {
        outcome,
        state: StateResponse {
            game: session.game_state().clone(),
            selected: session.selected(),
            legal_destinations: session.legal_destinations().to_vec(),
        },
    }))
}

pub async fn make_move(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MoveBody>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let from = parse_square(&body.from)?;
    let to = parse_square(&body.to)?;
    let promotion = body
        .promotion
        .as_deref()
        .map(parse_promotion)
        .transpose()?;

    let moved = {
        let mut session = state.session.lock().unwrap();
        session.move_piece(from, to, promotion)
    };

    #[derive(Serialize)]
    struct MoveResponse {
        moved: bool,
        san: Option<String>,
    }

    // An illegal move is not a transport error: the board simply does not
    // change, and the client re-reads /state.
    match moved {
        Ok(mv) => {
            state.drive_reply();
            Ok(Json(MoveResponse {
                moved: true,
                san: Some(mv.san),
            }))
        }
        Err(e) => {
            tracing::debug!("rejected move: {e}");
            Ok(Json(MoveResponse {
                moved: false,
                san: None,
            }))
        }
    }
}

pub async fn undo(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    {
        let mut session = state.session.lock().unwrap();
        session.undo();
    }
    state_response(&state)
}

pub async fn reset(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    {
        let mut session = state.session.lock().unwrap();
        session.reset();
    }
    state_response(&state)
}

pub async fn settings(State(state): State<Arc<AppState>>) -> Json<Settings> {
    let session = state.session.lock().unwrap();
    Json(session.settings().clone())
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> Json<Settings> {
    {
        let mut session = state.session.lock().unwrap();
        session.update_settings(update);
    }
    // Switching to the computer opponent on its turn schedules a reply.
    state.drive_reply();
    let session = state.session.lock().unwrap();
    Json(session.settings().clone())
}

pub async fn start_timer(State(state): State<Arc<AppState>>) -> Json<ClockResponse> {
    let mut session = state.session.lock().unwrap();
    session.start_timer();
    Json(ClockResponse {
        white: session.white_time(),
        black: session.black_time(),
        running: session.timer_running(),
    })
}

pub async fn pause_timer(State(state): State<Arc<AppState>>) -> Json<ClockResponse> {
    let mut session = state.session.lock().unwrap();
    session.pause_timer();
    Json(ClockResponse {
        white: session.white_time(),
        black: session.black_time(),
        running: session.timer_running(),
    })
}

pub async fn health() -> &'static str {
    "OK"
}
