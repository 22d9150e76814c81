use scopa_link_core::{Role, Session, SessionError, WireMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::console::{self, ConsoleCommand};
use crate::join;

/// 协调任务队列里的事件。网络帧、连接变化和本地输入都排进同一个队列。
#[derive(Debug)]
pub enum PeerEvent {
    Connected(PeerLink),
    Frame(String),
    Disconnected,
    Console(ConsoleCommand),
}

/// 通往对端的出站通道，只由协调任务持有
#[derive(Debug, Clone)]
pub struct PeerLink {
    outbound: mpsc::Sender<String>,
}

impl PeerLink {
    pub fn new(outbound: mpsc::Sender<String>) -> Self {
        PeerLink { outbound }
    }

    /// 按顺序发送一批消息。发送失败不影响对局状态，等断线事件再处理。
    pub async fn send_all(&self, messages: Vec<WireMessage>) {
        for msg in messages {
            debug!(tag = msg.tag(), "发送消息");
            if self.outbound.send(msg.encode()).await.is_err() {
                warn!("向对端发送消息失败（可能已断开）");
                return;
            }
        }
    }
}

/// 单一协调任务：独占 `Session`，逐个处理队列中的事件，不会重入
pub struct Coordinator {
    session: Session,
    link: Option<PeerLink>,
    events: mpsc::Receiver<PeerEvent>,
    /// 重新连接时交给传输层，让新连接的事件排进同一个队列
    requeue: mpsc::Sender<PeerEvent>,
    /// 加入方上一次连接的大厅地址
    lobby_url: Option<Url>,
}

impl Coordinator {
    pub fn new(session: Session, events: mpsc::Receiver<PeerEvent>, requeue: mpsc::Sender<PeerEvent>) -> Self {
        Coordinator { session, link: None, events, requeue, lobby_url: None }
    }

    pub fn with_lobby_url(mut self, url: Url) -> Self {
        self.lobby_url = Some(url);
        self
    }

    pub async fn run(mut self) {
        console::print_help(self.session.role());
        while let Some(event) = self.events.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }
        info!("协调任务退出");
    }

    /// 返回 false 表示应当退出
    async fn handle_event(&mut self, event: PeerEvent) -> bool {
        match event {
            PeerEvent::Connected(link) => {
                if self.link.is_some() {
                    warn!("已经有一个对端连接，忽略新的连接");
                    return true;
                }
                link.send_all(self.session.connect()).await;
                self.link = Some(link);
                println!("对手已连接");
            }
            PeerEvent::Frame(frame) => match self.session.receive(&frame) {
                Ok(inbound) => console::render_inbound(&self.session, &inbound),
                Err(SessionError::Decode(e)) => warn!("解析消息失败，已丢弃: {}", e),
                Err(e) => warn!("忽略对端消息: {}", e),
            },
            PeerEvent::Disconnected => {
                self.link = None;
                self.session.disconnect();
                println!("对手已断开，对局作废");
                match self.session.role() {
                    Role::Host => println!("等待新的对手连入..."),
                    Role::Joiner => println!("输入 join [地址] 重新连接大厅"),
                }
            }
            PeerEvent::Console(command) => return self.handle_command(command).await,
        }
        true
    }

    async fn handle_command(&mut self, command: ConsoleCommand) -> bool {
        let result = match command {
            ConsoleCommand::Start => self.session.start_match(&mut rand::rng()),
            ConsoleCommand::Play(intent) => self.session.play_intent(intent),
            ConsoleCommand::Show => {
                console::render_state(&self.session);
                return true;
            }
            ConsoleCommand::Help => {
                console::print_help(self.session.role());
                return true;
            }
            ConsoleCommand::Join(url) => {
                self.rejoin(url);
                return true;
            }
            ConsoleCommand::Exit => return false,
        };

        match result {
            Ok(messages) => {
                if let Some(link) = &self.link {
                    link.send_all(messages).await;
                }
                console::render_state(&self.session);
                // 结束对局的那一步出在本机，结算不会从对端收到
                if let Some(score) = &self.session.state().final_score {
                    console::render_score(&self.session, score);
                }
            }
            // 非法操作只告诉本地玩家，不发任何消息给对端
            Err(e) => println!("操作被拒绝: {}", e),
        }
        true
    }

    /// 加入方回到大厅选择：在后台重新连接，连上后照常收到 `Connected` 事件
    fn rejoin(&mut self, url: Option<Url>) {
        if self.session.role() == Role::Host {
            println!("房主不需要加入大厅");
            return;
        }
        if self.link.is_some() {
            println!("已经连接到大厅");
            return;
        }
        let Some(url) = url.or_else(|| self.lobby_url.clone()) else {
            println!("用法: join ws://地址:端口/ws");
            return;
        };

        self.lobby_url = Some(url.clone());
        let events = self.requeue.clone();
        tokio::spawn(async move {
            if let Err(e) = join::connect(&url, events).await {
                warn!("重新连接失败: {:#}", e);
                println!("无法连接 {}，稍后再试", url);
            }
        });
    }
}
