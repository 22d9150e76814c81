use crate::card::{CaptureIntent, Card};
use crate::state::{MatchPhase, Side};
use thiserror::Error;

/// 本地非法出牌。在改动状态和发送消息之前就被拒绝，只报告给本地调用方。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("当前阶段 {0:?} 不能出牌")]
    WrongPhase(MatchPhase),
    #[error("还没轮到 {0:?} 出牌")]
    NotYourTurn(Side),
    #[error("手里没有 {0}")]
    CardNotInHand(Card),
    #[error("手里没有与 {0:?} 对应的牌")]
    NoMatchingCard(CaptureIntent),
}

/// 收到的消息无法解析。处理策略是记录日志后丢弃，不改动状态。
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("消息 {tag} 缺少负载")]
    MissingPayload { tag: &'static str },
    #[error("消息 {tag} 的负载格式错误: {source}")]
    BadPayload {
        tag: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("消息 {tag} 的取值无效: {raw}")]
    BadScalar { tag: &'static str, raw: String },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("只有房主可以开始对局")]
    NotHost,
    #[error("对局还在进行中（{0:?}），不能重新发牌")]
    MatchInProgress(MatchPhase),
    #[error("对端已断开，对局作废")]
    Disconnected,
    #[error("还没有进行中的对局，忽略消息 {0}")]
    NoMatch(&'static str),
    #[error("消息顺序错误: {0} 之前缺少结算明细")]
    OutOfOrder(&'static str),
}

pub type SessionResult<T> = Result<T, SessionError>;
