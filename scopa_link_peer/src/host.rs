use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{stream::StreamExt, SinkExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::coordinator::{PeerEvent, PeerLink};

// 房主端的共享状态。一个大厅同一时间只接受一个对手。
struct HostState {
    events: mpsc::Sender<PeerEvent>,
    occupied: AtomicBool,
}

type SharedState = Arc<HostState>;

/// 开始监听对手的 WebSocket 连接，服务在后台任务中运行
pub async fn listen(bind: SocketAddr, events: mpsc::Sender<PeerEvent>) -> anyhow::Result<()> {
    let state = SharedState::new(HostState {
        events,
        occupied: AtomicBool::new(false),
    });

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("无法监听 {}", bind))?;
    info!("大厅正在监听 {}", bind);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("监听服务退出: {}", e);
        }
    });
    Ok(())
}

/// 处理 WebSocket 连接请求
async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// 处理对手连接的生命周期
async fn handle_socket(socket: WebSocket, state: SharedState) {
    if state.occupied.swap(true, Ordering::SeqCst) {
        warn!("大厅已有对手，拒绝新的连接");
        return;
    }

    let (mut sender, mut receiver) = socket.split();

    // 出站通道只交给协调任务，这里的任务负责把通道里的帧写进 WebSocket
    let (tx, mut rx) = mpsc::channel::<String>(32);
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                // 发送失败，说明对手已断开，退出任务
                break;
            }
        }
    });

    info!("对手已连入");
    if state.events.send(PeerEvent::Connected(PeerLink::new(tx))).await.is_ok() {
        // 收到的帧原样排进协调任务的队列
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if state.events.send(PeerEvent::Frame(text.as_str().to_owned())).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
        let _ = state.events.send(PeerEvent::Disconnected).await;
    }

    state.occupied.store(false, Ordering::SeqCst);
    info!("对手连接关闭");
}
