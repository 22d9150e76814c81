use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::{info, warn};
use url::Url;

use crate::coordinator::{PeerEvent, PeerLink};

/// 连接房主的大厅。读写各由一个后台任务负责。
pub async fn connect(url: &Url, events: mpsc::Sender<PeerEvent>) -> anyhow::Result<()> {
    info!("正在连接到: {}", url);
    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("无法连接 {}", url))?;
    info!("连接成功!");

    let (mut write, mut read) = ws_stream.split();

    let (tx, mut rx) = mpsc::channel::<String>(32);
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = write.send(Message::Text(frame.into())).await {
                warn!("发送消息失败: {}", e);
                break;
            }
        }
    });

    events
        .send(PeerEvent::Connected(PeerLink::new(tx)))
        .await
        .map_err(|_| anyhow::anyhow!("协调任务已退出"))?;

    // 启动一个任务来处理从房主接收的消息
    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if events.send(PeerEvent::Frame(text.as_str().to_owned())).await.is_err() {
                        return;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("接收消息时出错: {}", e);
                    break;
                }
            }
        }
        let _ = events.send(PeerEvent::Disconnected).await;
    });

    Ok(())
}
