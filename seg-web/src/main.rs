//! Servidor web Axum com WebSocket para visualização da segmentação HMM em tempo real

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use clap::Parser;
use seg_core::{corpus::demo_texts, PipelineEvent, Segmenter};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Servidor de segmentação HMM.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Endereço de escuta.
    #[arg(long, env = "SEG_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Snapshot de contagens (gerado por `hmmseg train`). Sem ele, o modelo é
    /// treinado no corpus de demonstração embutido.
    #[arg(long, env = "SEG_MODEL")]
    model: Option<PathBuf>,
}

/// Estado compartilhado da aplicação
struct AppState {
    segmenter: Segmenter,
}

#[derive(Deserialize)]
struct SegmentRequest {
    text: String,
}

#[derive(Deserialize)]
struct BatchRequest {
    texts: Vec<String>,
}

#[derive(Serialize)]
struct SegmentResponse {
    words: Vec<String>,
    states: Vec<String>,
    best_score: f64,
    processing_ms: u64,
}

#[derive(Serialize)]
struct BatchResponse {
    /// Uma lista de palavras por texto; textos inválidos viram `null`.
    results: Vec<Option<Vec<String>>>,
}

/// Resumo das distribuições do modelo para a UI
#[derive(Serialize)]
struct ModelSummary {
    states: Vec<&'static str>,
    initial: Vec<f64>,
    transition: Vec<Vec<f64>>,
    vocab_sizes: Vec<usize>,
    top_emissions: Vec<Vec<(char, f64)>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let segmenter = match &args.model {
        Some(path) => Segmenter::load(path)?,
        None => {
            info!("Nenhum snapshot informado; treinando no corpus de demonstração");
            Segmenter::demo()?
        }
    };

    let app = router(Arc::new(AppState { segmenter }));

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!("🚀 Servidor de segmentação iniciado em http://{}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/segment", post(segment_handler))
        .route("/segment/batch", post(batch_handler))
        .route("/model", get(model_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Segmentação via HTTP POST (sem streaming)
async fn segment_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SegmentRequest>,
) -> impl IntoResponse {
    let start = Instant::now();
    match state.segmenter.segment_detailed(&req.text) {
        Ok(seg) => Json(SegmentResponse {
            words: seg.words,
            states: seg.states.iter().map(|s| s.label().to_string()).collect(),
            best_score: seg.best_score,
            processing_ms: start.elapsed().as_millis() as u64,
        })
        .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Segmentação em lote; o trabalho pesado roda fora do runtime async
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> impl IntoResponse {
    let results = tokio::task::spawn_blocking(move || {
        state
            .segmenter
            .segment_batch(&req.texts)
            .into_iter()
            .map(Result::ok)
            .collect::<Vec<_>>()
    })
    .await;

    match results {
        Ok(results) => Json(BatchResponse { results }).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// Distribuições inicial e de transição, e os caracteres mais prováveis por estado
async fn model_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.segmenter.model();
    let all = seg_core::State::ALL;

    Json(ModelSummary {
        states: all.iter().map(|s| s.label()).collect(),
        initial: all.iter().map(|s| model.initial(*s)).collect(),
        transition: all
            .iter()
            .map(|prev| all.iter().map(|curr| model.transition(*prev, *curr)).collect())
            .collect(),
        vocab_sizes: all.iter().map(|s| model.vocab_size(*s)).collect(),
        top_emissions: all.iter().map(|s| model.top_emissions(*s, 10)).collect(),
    })
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Extrai o texto de uma mensagem do WebSocket: JSON `{text}` ou texto puro.
///
/// Mensagens só com espaços são ignoradas; as demais seguem intactas, para que
/// as palavras devolvidas concatenem exatamente no que o cliente enviou.
fn ws_request_text(raw: &str) -> Option<String> {
    let text = match serde_json::from_str::<SegmentRequest>(raw) {
        Ok(req) => req.text,
        Err(_) => raw.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, executa pipeline e envia eventos em tempo real
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let Some(text_str) = ws_request_text(&text) else {
                    continue;
                };

                info!("Segmentando via WebSocket: {} chars", text_str.chars().count());

                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let state_for_thread = Arc::clone(&state);

                // O Viterbi é síncrono: roda fora do runtime
                let handle = tokio::task::spawn_blocking(move || {
                    state_for_thread.segmenter.segment_streaming(&text_str, tx);
                });
                if let Err(e) = handle.await {
                    warn!("pipeline abortado: {e}");
                    continue;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
