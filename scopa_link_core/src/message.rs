use crate::card::Card;
use crate::error::DecodeError;
use crate::state::{MatchId, Sides};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

// --- 对端之间的消息 ---
// 线上格式统一为 `标签:负载`。结构化负载用 JSON，标量直接写原文。
// 所有带 player/opponent 的负载都已经换成接收方的视角，接收方直接照抄即可。

pub const TAG_START_GAME: &str = "START_GAME";
pub const TAG_LOBBY: &str = "Lobby";
pub const TAG_DECK: &str = "Deck";
pub const TAG_TABLE: &str = "Table";
pub const TAG_PLAYERS_HANDS: &str = "PlayersHands";
pub const TAG_CARDS_TAKEN: &str = "CardsTaken";
pub const TAG_PLAYERS_POINTS: &str = "PlayersPoints";
pub const TAG_PLAYERS_COINS: &str = "PlayersCoins";
pub const TAG_PRIMERA: &str = "Primera";
pub const TAG_SETTEBELLO: &str = "Settebello";
pub const TAG_PLAYERS_SCORES: &str = "PlayersScores";
pub const TAG_CURRENT_PLAYER: &str = "CurrentPlayer";
pub const TAG_GAME_OVER: &str = "GameOver";
pub const TAG_IS_AVATAR: &str = "IsAvatar";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// 房主发完牌，接收方重置并进入出牌阶段。带上房主的对局编号，两端日志可以对上
    StartGame(Option<MatchId>),
    /// 大厅名称，房主 -> 加入方
    Lobby(String),
    /// 权威的剩余牌堆，开局和每次补牌后由发牌方发送
    Deck(Vec<Card>),
    /// 每次出牌后的桌面
    Table(Vec<Card>),
    PlayersHands(Sides<Vec<Card>>),
    CardsTaken(Sides<Vec<Card>>),
    /// 扫桌次数
    PlayersPoints(Sides<u32>),

    // 以下四条只在对局结束时发送一次
    PlayersCoins(Sides<u8>),
    Primera(Sides<u8>),
    Settebello(Sides<bool>),
    PlayersScores(Sides<u32>),

    /// 出牌权，0 表示接收方自己
    CurrentPlayer(u8),
    GameOver(bool),
    IsAvatar(String),
    /// 无法识别标签的字符串一律当作对端的显示名（握手）
    PeerName(String),
}

impl WireMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            WireMessage::StartGame(_) => TAG_START_GAME,
            WireMessage::Lobby(_) => TAG_LOBBY,
            WireMessage::Deck(_) => TAG_DECK,
            WireMessage::Table(_) => TAG_TABLE,
            WireMessage::PlayersHands(_) => TAG_PLAYERS_HANDS,
            WireMessage::CardsTaken(_) => TAG_CARDS_TAKEN,
            WireMessage::PlayersPoints(_) => TAG_PLAYERS_POINTS,
            WireMessage::PlayersCoins(_) => TAG_PLAYERS_COINS,
            WireMessage::Primera(_) => TAG_PRIMERA,
            WireMessage::Settebello(_) => TAG_SETTEBELLO,
            WireMessage::PlayersScores(_) => TAG_PLAYERS_SCORES,
            WireMessage::CurrentPlayer(_) => TAG_CURRENT_PLAYER,
            WireMessage::GameOver(_) => TAG_GAME_OVER,
            WireMessage::IsAvatar(_) => TAG_IS_AVATAR,
            WireMessage::PeerName(_) => "PeerName",
        }
    }

    /// 编码成一帧文本
    pub fn encode(&self) -> String {
        match self {
            WireMessage::StartGame(None) => TAG_START_GAME.to_string(),
            WireMessage::StartGame(Some(match_id)) => format!("{}:{}", self.tag(), match_id),
            WireMessage::PeerName(name) => name.clone(),
            WireMessage::Lobby(name) | WireMessage::IsAvatar(name) => format!("{}:{}", self.tag(), name),
            WireMessage::CurrentPlayer(index) => format!("{}:{}", self.tag(), index),
            WireMessage::GameOver(over) => format!("{}:{}", self.tag(), over),
            WireMessage::Deck(cards) | WireMessage::Table(cards) => json_frame(self.tag(), cards),
            WireMessage::PlayersHands(sides) | WireMessage::CardsTaken(sides) => json_frame(self.tag(), sides),
            WireMessage::PlayersPoints(sides) | WireMessage::PlayersScores(sides) => json_frame(self.tag(), sides),
            WireMessage::PlayersCoins(sides) | WireMessage::Primera(sides) => json_frame(self.tag(), sides),
            WireMessage::Settebello(sides) => json_frame(self.tag(), sides),
        }
    }

    /// 解析一帧文本
    ///
    /// 标签已知但负载不合法时返回错误，调用方应丢弃这条消息；
    /// 标签未知时整条文本按对端显示名处理。
    pub fn decode(frame: &str) -> Result<WireMessage, DecodeError> {
        if frame == TAG_START_GAME {
            return Ok(WireMessage::StartGame(None));
        }

        let Some((tag, payload)) = frame.split_once(':') else {
            if let Some(tag) = known_tag(frame) {
                return Err(DecodeError::MissingPayload { tag });
            }
            return Ok(WireMessage::PeerName(frame.to_string()));
        };
        let Some(tag) = known_tag(tag) else {
            return Ok(WireMessage::PeerName(frame.to_string()));
        };

        let msg = match tag {
            TAG_START_GAME => match payload.trim().parse::<MatchId>() {
                Ok(match_id) => WireMessage::StartGame(Some(match_id)),
                Err(_) => return Err(DecodeError::BadScalar { tag, raw: payload.to_string() }),
            },
            TAG_LOBBY => WireMessage::Lobby(payload.to_string()),
            TAG_IS_AVATAR => WireMessage::IsAvatar(payload.to_string()),
            TAG_DECK => WireMessage::Deck(parse_json(tag, payload)?),
            TAG_TABLE => WireMessage::Table(parse_json(tag, payload)?),
            TAG_PLAYERS_HANDS => WireMessage::PlayersHands(parse_json(tag, payload)?),
            TAG_CARDS_TAKEN => WireMessage::CardsTaken(parse_json(tag, payload)?),
            TAG_PLAYERS_POINTS => WireMessage::PlayersPoints(parse_json(tag, payload)?),
            TAG_PLAYERS_COINS => WireMessage::PlayersCoins(parse_json(tag, payload)?),
            TAG_PRIMERA => WireMessage::Primera(parse_json(tag, payload)?),
            TAG_SETTEBELLO => WireMessage::Settebello(parse_json(tag, payload)?),
            TAG_PLAYERS_SCORES => WireMessage::PlayersScores(parse_json(tag, payload)?),
            TAG_CURRENT_PLAYER => match payload.trim().parse::<u8>() {
                Ok(index @ (0 | 1)) => WireMessage::CurrentPlayer(index),
                _ => return Err(DecodeError::BadScalar { tag, raw: payload.to_string() }),
            },
            TAG_GAME_OVER => match payload.trim().parse::<bool>() {
                Ok(over) => WireMessage::GameOver(over),
                Err(_) => return Err(DecodeError::BadScalar { tag, raw: payload.to_string() }),
            },
            _ => WireMessage::PeerName(frame.to_string()),
        };
        Ok(msg)
    }
}

impl fmt::Display for WireMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

fn known_tag(tag: &str) -> Option<&'static str> {
    [
        TAG_START_GAME, TAG_LOBBY, TAG_DECK, TAG_TABLE, TAG_PLAYERS_HANDS, TAG_CARDS_TAKEN,
        TAG_PLAYERS_POINTS, TAG_PLAYERS_COINS, TAG_PRIMERA, TAG_SETTEBELLO, TAG_PLAYERS_SCORES,
        TAG_CURRENT_PLAYER, TAG_GAME_OVER, TAG_IS_AVATAR,
    ]
    .into_iter()
    .find(|known| *known == tag)
}

fn json_frame<T: Serialize>(tag: &str, payload: &T) -> String {
    // 这里的类型都是简单的派生结构，序列化不会失败
    let json = serde_json::to_string(payload).unwrap_or_default();
    format!("{}:{}", tag, json)
}

fn parse_json<T: DeserializeOwned>(tag: &'static str, payload: &str) -> Result<T, DecodeError> {
    serde_json::from_str(payload).map_err(|source| DecodeError::BadPayload { tag, source })
}
