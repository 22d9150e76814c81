use crate::card::{CaptureIntent, Card};
use crate::error::{MoveError, SessionError, SessionResult};
use crate::message::WireMessage;
use crate::mirror::{self, Inbox, Installed};
use crate::state::{MatchPhase, MatchState, Side};
use rand::Rng;
use tracing::info;

/// 本机在这场连接中的身份。只有房主发牌。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Joiner,
}

/// 处理一条入站消息后，界面层需要知道的变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    PeerNamed(String),
    Lobby(String),
    Avatar(String),
    Match(Installed),
}

/// 一台设备上的会话上下文
///
/// 持有本机的对局镜像、双方昵称和连接状态。所有对局操作都通过它进行，
/// 本地操作返回需要推给对端的消息，入站消息在这里解码并装入镜像。
#[derive(Debug)]
pub struct Session {
    role: Role,
    local_name: String,
    avatar: Option<String>,
    lobby_name: Option<String>,
    peer_name: Option<String>,
    peer_avatar: Option<String>,
    connected: bool,
    state: MatchState,
    inbox: Inbox,
}

impl Session {
    pub fn host(local_name: impl Into<String>, lobby_name: impl Into<String>) -> Self {
        let mut session = Self::new(Role::Host, local_name.into());
        session.lobby_name = Some(lobby_name.into());
        session
    }

    pub fn join(local_name: impl Into<String>) -> Self {
        Self::new(Role::Joiner, local_name.into())
    }

    fn new(role: Role, local_name: String) -> Self {
        Session {
            role,
            local_name,
            avatar: None,
            lobby_name: None,
            peer_name: None,
            peer_avatar: None,
            connected: false,
            state: MatchState::new(),
            inbox: Inbox::new(),
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn peer_name(&self) -> Option<&str> {
        self.peer_name.as_deref()
    }

    pub fn peer_avatar(&self) -> Option<&str> {
        self.peer_avatar.as_deref()
    }

    pub fn lobby_name(&self) -> Option<&str> {
        self.lobby_name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// 连接建立，返回握手消息：昵称，房主附带大厅名，可选头像
    pub fn connect(&mut self) -> Vec<WireMessage> {
        self.connected = true;
        let mut messages = vec![WireMessage::PeerName(self.local_name.clone())];
        if self.role == Role::Host {
            if let Some(lobby) = &self.lobby_name {
                messages.push(WireMessage::Lobby(lobby.clone()));
            }
        }
        if let Some(avatar) = &self.avatar {
            messages.push(WireMessage::IsAvatar(avatar.clone()));
        }
        messages
    }

    /// 对端断开：对局立即作废且不可恢复，之后的本地出牌都会被拒绝
    pub fn disconnect(&mut self) {
        if self.connected {
            info!(match_id = %self.state.match_id, "对端断开，对局作废");
        }
        self.connected = false;
        self.peer_name = None;
        self.peer_avatar = None;
        self.leave_match();
    }

    /// 关闭大厅或放弃当前对局，回到开局前的状态
    pub fn leave_match(&mut self) {
        self.state.abandon();
        self.inbox.clear();
    }

    /// 房主开始新的一局：洗牌、发牌，返回开局消息
    ///
    /// 只能在开局前或上一局结束后调用。对局进行中对端可能有出牌消息还在路上，
    /// 这时重新发牌会让那批消息落进新的一局。
    pub fn start_match<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SessionResult<Vec<WireMessage>> {
        if self.role != Role::Host {
            return Err(SessionError::NotHost);
        }
        if !self.connected {
            return Err(SessionError::Disconnected);
        }
        if !matches!(self.state.phase, MatchPhase::WaitingForPlayers | MatchPhase::MatchOver) {
            return Err(SessionError::MatchInProgress(self.state.phase));
        }

        self.state.start_new_match(rng);
        info!(match_id = %self.state.match_id, "新对局开始");
        Ok(mirror::deal_messages(&self.state))
    }

    /// 本机玩家出一张牌。非法出牌在改动状态之前被拒绝，也不会产生任何消息。
    pub fn play(&mut self, card: Card) -> SessionResult<Vec<WireMessage>> {
        if !self.connected {
            return Err(SessionError::Disconnected);
        }

        let report = self.state.play_card(Side::Player, card)?;
        if let Some(score) = &report.final_score {
            info!(match_id = %self.state.match_id, outcome = ?score.outcome(), "对局结算完成");
        }
        Ok(mirror::move_messages(&self.state, &report))
    }

    /// 点击或语音指令给出的 (点数, 花色) 意图，找到手里对应的牌后照常出牌
    pub fn play_intent(&mut self, intent: CaptureIntent) -> SessionResult<Vec<WireMessage>> {
        let card = intent
            .card()
            .filter(|card| self.state.hands.player.contains(card))
            .ok_or(MoveError::NoMatchingCard(intent))?;
        self.play(card)
    }

    /// 解码并处理一帧入站文本
    pub fn receive(&mut self, frame: &str) -> SessionResult<Inbound> {
        let msg = WireMessage::decode(frame)?;
        self.apply(msg)
    }

    pub fn apply(&mut self, msg: WireMessage) -> SessionResult<Inbound> {
        match msg {
            WireMessage::PeerName(name) => {
                self.peer_name = Some(name.clone());
                Ok(Inbound::PeerNamed(name))
            }
            WireMessage::Lobby(name) => {
                self.lobby_name = Some(name.clone());
                Ok(Inbound::Lobby(name))
            }
            WireMessage::IsAvatar(avatar) => {
                self.peer_avatar = Some(avatar.clone());
                Ok(Inbound::Avatar(avatar))
            }
            // 发牌只属于房主，加入方发来的开局信号一律拒绝
            WireMessage::StartGame(_) if self.role == Role::Host => Err(SessionError::NotHost),
            other => {
                let installed = self.inbox.install(&mut self.state, other)?;
                if let Installed::Scored(score) = &installed {
                    info!(match_id = %self.state.match_id, outcome = ?score.outcome(), "收到对端结算");
                }
                Ok(Inbound::Match(installed))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn connected_pair() -> (Session, Session) {
        let mut host = Session::host("Anna", "Bar Sport");
        let mut joiner = Session::join("Luca").with_avatar("gatto");
        for msg in host.connect() {
            joiner.receive(&msg.encode()).unwrap();
        }
        for msg in joiner.connect() {
            host.receive(&msg.encode()).unwrap();
        }
        (host, joiner)
    }

    #[test]
    fn test_handshake_exchanges_names() {
        let (host, joiner) = connected_pair();
        assert_eq!(host.peer_name(), Some("Luca"));
        assert_eq!(host.peer_avatar(), Some("gatto"));
        assert_eq!(joiner.peer_name(), Some("Anna"));
        assert_eq!(joiner.lobby_name(), Some("Bar Sport"));
    }

    #[test]
    fn test_only_host_deals() {
        let (_, mut joiner) = connected_pair();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(joiner.start_match(&mut rng), Err(SessionError::NotHost)));
        assert_eq!(joiner.state().phase, MatchPhase::WaitingForPlayers);

        let (mut host, _) = connected_pair();
        assert!(matches!(host.receive("START_GAME"), Err(SessionError::NotHost)));
        assert_eq!(host.state().phase, MatchPhase::WaitingForPlayers);
    }

    #[test]
    fn test_out_of_turn_sends_nothing() {
        let (mut host, mut joiner) = connected_pair();
        let mut rng = StdRng::seed_from_u64(1);
        for msg in host.start_match(&mut rng).unwrap() {
            joiner.apply(msg).unwrap();
        }

        // 非庄家先出，房主此时出牌必须被拒绝
        let card = host.state().hands.player[0];
        let err = host.play(card).unwrap_err();
        assert!(matches!(err, SessionError::Move(MoveError::NotYourTurn(Side::Player))));
        assert_eq!(host.state().hands.player.len(), 3);
        assert!(joiner.state().is_my_turn());
    }

    #[test]
    fn test_intent_for_missing_card() {
        let (mut host, mut joiner) = connected_pair();
        let mut rng = StdRng::seed_from_u64(3);
        for msg in host.start_match(&mut rng).unwrap() {
            joiner.apply(msg).unwrap();
        }

        let missing = host.state().hands.player[0];
        let intent = CaptureIntent { value: missing.value(), suit: missing.suit };
        let err = joiner.play_intent(intent).unwrap_err();
        assert!(matches!(err, SessionError::Move(MoveError::NoMatchingCard(_))));

        let held = joiner.state().hands.player[0];
        let intent = CaptureIntent { value: held.value(), suit: held.suit };
        assert!(joiner.play_intent(intent).is_ok());

        let bogus = CaptureIntent { value: 0, suit: Suit::Cups };
        assert!(joiner.play_intent(bogus).is_err());
    }

    #[test]
    fn test_disconnect_voids_match() {
        let (mut host, mut joiner) = connected_pair();
        let mut rng = StdRng::seed_from_u64(5);
        for msg in host.start_match(&mut rng).unwrap() {
            joiner.apply(msg).unwrap();
        }

        joiner.disconnect();
        assert_eq!(joiner.state().phase, MatchPhase::WaitingForPlayers);
        assert_eq!(joiner.state().card_count(), 0);
        assert!(matches!(joiner.play(host.state().deck[0]), Err(SessionError::Disconnected)));
        assert!(matches!(joiner.receive("Table:[]"), Err(SessionError::NoMatch(_))));
    }

    #[test]
    fn test_decode_failure_leaves_state_alone() {
        let (mut host, mut joiner) = connected_pair();
        let mut rng = StdRng::seed_from_u64(9);
        for msg in host.start_match(&mut rng).unwrap() {
            joiner.apply(msg).unwrap();
        }
        let table = joiner.state().table.clone();

        assert!(matches!(joiner.receive("Table:{oops"), Err(SessionError::Decode(_))));
        assert_eq!(joiner.state().table, table);
    }
}
