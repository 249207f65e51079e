//! HTTP API for the spelling quiz.
//!
//! Thin JSON adapter over [`SpellingGame`]. The session token travels in the
//! path; how a front end stores it (cookie, local storage) is up to the front
//! end. CORS-permissive so a page served from anywhere can call it.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::error;

use spellbee_core::leaderboard::{Leaderboard, LeaderboardEntry};
use spellbee_core::session::{GuessOutcome, SessionSummary};
use spellbee_core::types::AudioArtifact;

use crate::audio::Synthesizer;
use crate::error::{GameError, SessionError};
use crate::game::SpellingGame;
use crate::sessions::SessionToken;

/// Build the axum router over a shared [`SpellingGame`].
pub fn router<S: Synthesizer>(game: Arc<SpellingGame<S>>) -> Router {
    Router::new()
        .route("/sessions", post(create_session::<S>))
        .route("/sessions/{token}", get(session_summary::<S>))
        .route("/sessions/{token}/name", post(set_name::<S>))
        .route("/sessions/{token}/play", post(play::<S>))
        .route("/sessions/{token}/guess", post(guess::<S>))
        .route("/sessions/{token}/next", post(next_round::<S>))
        .route("/sessions/{token}/finish", post(finish::<S>))
        .route("/leaderboard", get(leaderboard::<S>))
        .route("/audio/{file}", get(audio::<S>))
        .layer(CorsLayer::permissive())
        .with_state(game)
}

// ─── Payloads ──────────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct SessionCreated {
    token: SessionToken,
}

#[derive(serde::Deserialize)]
struct NameRequest {
    name: String,
}

#[derive(serde::Serialize)]
struct PlayResponse {
    audio_url: String,
}

#[derive(serde::Deserialize)]
struct GuessRequest {
    text: String,
}

/// Verdict of one guess. The played word is revealed only once judged.
#[derive(serde::Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
enum GuessResponse {
    Replay { audio_url: Option<String> },
    Correct { word: String, score: u32 },
    Wrong { word: String, guess: String, score: u32 },
}

#[derive(serde::Serialize)]
struct FinishResponse {
    entry: Option<LeaderboardEntry>,
}

fn audio_url(artifact: &AudioArtifact) -> String {
    format!("/audio/{}", artifact.file_name)
}

// ─── Errors ────────────────────────────────────────────────────────────────

struct ApiError(StatusCode, String);

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        let status = match &e {
            GameError::Session(SessionError::InvalidIdentity) => StatusCode::BAD_REQUEST,
            GameError::Session(SessionError::NoActiveRound) => StatusCode::CONFLICT,
            GameError::Synthesis(_) => StatusCode::SERVICE_UNAVAILABLE,
            GameError::Catalog(_) | GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("api: {e}");
        }
        Self(status, e.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        GameError::from(e).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "ok": false, "error": self.1 }));
        (self.0, body).into_response()
    }
}

// ─── Handlers ──────────────────────────────────────────────────────────────

async fn create_session<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
) -> Json<SessionCreated> {
    Json(SessionCreated {
        token: game.new_session(),
    })
}

async fn session_summary<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(token): Path<SessionToken>,
) -> Json<SessionSummary> {
    Json(game.session_summary(token))
}

async fn set_name<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(token): Path<SessionToken>,
    Json(req): Json<NameRequest>,
) -> Result<Json<SessionSummary>, ApiError> {
    Ok(Json(game.set_name(token, &req.name)?))
}

async fn play<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(token): Path<SessionToken>,
) -> Result<Json<PlayResponse>, ApiError> {
    let artifact = game.play(token).await?;
    Ok(Json(PlayResponse {
        audio_url: audio_url(&artifact),
    }))
}

async fn guess<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(token): Path<SessionToken>,
    Json(req): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, ApiError> {
    let outcome = game.submit_guess(token, &req.text)?;
    let score = game.session_summary(token).score;
    let resp = match outcome {
        GuessOutcome::Replay { artifact, .. } => GuessResponse::Replay {
            audio_url: artifact.as_ref().map(audio_url),
        },
        GuessOutcome::Correct { word } => GuessResponse::Correct { word, score },
        GuessOutcome::Wrong { expected, guess } => GuessResponse::Wrong {
            word: expected,
            guess,
            score,
        },
    };
    Ok(Json(resp))
}

async fn next_round<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(token): Path<SessionToken>,
) -> Json<SessionSummary> {
    Json(game.next_round(token))
}

async fn finish<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(token): Path<SessionToken>,
) -> Result<Json<FinishResponse>, ApiError> {
    let entry = game.finish_session(token).await?;
    Ok(Json(FinishResponse { entry }))
}

async fn leaderboard<S: Synthesizer>(State(game): State<Arc<SpellingGame<S>>>) -> Json<Leaderboard> {
    Json(game.current_leaderboard().await)
}

async fn audio<S: Synthesizer>(
    State(game): State<Arc<SpellingGame<S>>>,
    Path(file): Path<String>,
) -> Response {
    match game.audio().read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {
            ApiError(StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ApiError(StatusCode::NOT_FOUND, format!("no audio named {file}")).into_response()
        }
        Err(e) => {
            error!("api: reading audio {file}: {e}");
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use spellbee_core::types::{GameConfig, VoiceParams};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::error::SynthesisError;

    #[derive(Clone, Default)]
    struct StubSynth {
        down: Arc<AtomicBool>,
    }

    impl Synthesizer for StubSynth {
        async fn synthesize(&self, _: &str, _: &VoiceParams) -> Result<Vec<u8>, SynthesisError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(SynthesisError::Status {
                    status: 503,
                    body: "offline".into(),
                });
            }
            Ok(b"RIFF....WAVE".to_vec())
        }
    }

    async fn app(dir: &std::path::Path, words: &str, synth: StubSynth) -> Router {
        let words_path = dir.join("words.txt");
        std::fs::write(&words_path, words).unwrap();
        let config = GameConfig {
            words_path,
            cache_dir: dir.join("word_files"),
            leaderboard_path: dir.join("leaderboard.json"),
            session_ttl: Duration::from_secs(60),
            ..GameConfig::default()
        };
        let game = SpellingGame::open(&config, synth).await.unwrap();
        router(Arc::new(game))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(req).await.unwrap()
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let resp = send(app, method, uri, body).await;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = call(app, "POST", "/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn word_is_hidden_until_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "necessary", StubSynth::default()).await;
        let token = new_session(&app).await;
        call(&app, "POST", &format!("/sessions/{token}/name"), Some(json!({"name": "Ada"}))).await;

        let (status, played) = call(&app, "POST", &format!("/sessions/{token}/play"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!played.to_string().contains("necessary"), "{played}");

        let (_, summary) = call(&app, "GET", &format!("/sessions/{token}"), None).await;
        assert_eq!(summary["phase"], "playing");
        assert!(!summary.to_string().contains("necessary"), "{summary}");

        let guess = format!("/sessions/{token}/guess");
        let (status, replay) = call(&app, "POST", &guess, Some(json!({"text": "?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(replay["result"], "replay");
        assert_eq!(replay["audio_url"], played["audio_url"]);
        assert!(!replay.to_string().contains("necessary"), "{replay}");

        let (_, verdict) = call(&app, "POST", &guess, Some(json!({"text": "necesary"}))).await;
        assert_eq!(
            verdict,
            json!({"result": "wrong", "word": "necessary", "guess": "necesary", "score": 0})
        );
    }

    #[tokio::test]
    async fn played_audio_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "cat", StubSynth::default()).await;
        let token = new_session(&app).await;

        let (_, played) = call(&app, "POST", &format!("/sessions/{token}/play"), None).await;
        let url = played["audio_url"].as_str().unwrap();
        let resp = send(&app, "GET", url, None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "audio/wav");
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"RIFF....WAVE");
    }

    #[tokio::test]
    async fn blank_name_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "cat", StubSynth::default()).await;
        let token = new_session(&app).await;

        let uri = format!("/sessions/{token}/name");
        let (status, body) = call(&app, "POST", &uri, Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn guess_without_round_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "cat", StubSynth::default()).await;
        let token = new_session(&app).await;

        let uri = format!("/sessions/{token}/guess");
        let (status, body) = call(&app, "POST", &uri, Some(json!({"text": "cat"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn synthesis_outage_is_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let synth = StubSynth::default();
        let app = app(dir.path(), "cat", synth.clone()).await;
        let token = new_session(&app).await;

        synth.down.store(true, Ordering::SeqCst);
        let (status, body) = call(&app, "POST", &format!("/sessions/{token}/play"), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ok"], false);

        let (_, summary) = call(&app, "GET", &format!("/sessions/{token}"), None).await;
        assert_eq!(summary["phase"], "anonymous");
    }

    #[tokio::test]
    async fn audio_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "cat", StubSynth::default()).await;

        for uri in ["/audio/..%2Fleaderboard.json", "/audio/..%2Fsecret.wav", "/audio/cat.mp3"] {
            let (status, _) = call(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn unknown_audio_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "cat", StubSynth::default()).await;

        let (status, body) = call(&app, "GET", "/audio/0123456789abcdef.wav", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn finished_session_appears_on_leaderboard() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), "cat", StubSynth::default()).await;
        let token = new_session(&app).await;
        call(&app, "POST", &format!("/sessions/{token}/name"), Some(json!({"name": "Ada"}))).await;

        call(&app, "POST", &format!("/sessions/{token}/play"), None).await;
        let guess = format!("/sessions/{token}/guess");
        let (_, verdict) = call(&app, "POST", &guess, Some(json!({"text": "cat"}))).await;
        assert_eq!(verdict, json!({"result": "correct", "word": "cat", "score": 1}));

        let (status, finished) = call(&app, "POST", &format!("/sessions/{token}/finish"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(finished["entry"]["name"], "Ada");

        let (_, board) = call(&app, "GET", "/leaderboard", None).await;
        assert_eq!(
            board,
            json!([{"name": "Ada", "score": 1, "correct_percentage": 100.0}])
        );
    }
}
