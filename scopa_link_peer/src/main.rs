mod config;
mod console;
mod coordinator;
mod host;
mod join;

use clap::Parser;
use scopa_link_core::Session;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use config::{Cli, Mode};
use coordinator::{Coordinator, PeerEvent};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，终端界面只用 stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 所有事件都汇入这一个队列，由协调任务逐个处理
    let (events_tx, events_rx) = mpsc::channel::<PeerEvent>(64);

    let (session, avatar, lobby_url) = match cli.mode {
        Mode::Host { bind, name, lobby, avatar } => {
            host::listen(bind, events_tx.clone()).await?;
            println!("大厅 \"{}\" 已创建，等待对手连入 {}", lobby, bind);
            (Session::host(name, lobby), avatar, None)
        }
        Mode::Join { url, name, avatar } => {
            join::connect(&url, events_tx.clone()).await?;
            (Session::join(name), avatar, Some(url))
        }
    };
    let session = match avatar {
        Some(avatar) => session.with_avatar(avatar),
        None => session,
    };

    console::spawn_stdin_reader(events_tx.clone());
    let mut coordinator = Coordinator::new(session, events_rx, events_tx);
    if let Some(url) = lobby_url {
        coordinator = coordinator.with_lobby_url(url);
    }
    coordinator.run().await;
    Ok(())
}
