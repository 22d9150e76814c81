use clap::{Parser, Subcommand};
use std::net::SocketAddr;

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 25917;
pub const DEFAULT_BIND: &str = "0.0.0.0:25917";
pub const DEFAULT_URL: &str = "ws://127.0.0.1:25917/ws";
pub const DEFAULT_NAME: &str = "Giocatore";

/// 两台设备直连的 Scopa 对战
#[derive(Debug, Parser)]
#[command(name = "scopa_link_peer", version)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// 创建大厅并等待对手连入，本机负责发牌
    Host {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: SocketAddr,
        #[arg(long, default_value = DEFAULT_NAME)]
        name: String,
        #[arg(long, default_value = "Scopa")]
        lobby: String,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// 加入对手的大厅
    Join {
        #[arg(long, default_value = DEFAULT_URL)]
        url: url::Url,
        #[arg(long, default_value = DEFAULT_NAME)]
        name: String,
        #[arg(long)]
        avatar: Option<String>,
    },
}
