//! 视角翻转适配层
//!
//! 两台设备各自把本机玩家记作 `Player`，所以同一份数据在线上必须翻转视角：
//! 发送方把 `(我的, 对手的)` 写成 `(对手的, 我的)`，接收方直接照抄到自己的字段。
//! 所有翻转都集中在这里，其它模块只处理本机视角的数据。

use crate::error::SessionError;
use crate::logic::MoveReport;
use crate::message::WireMessage;
use crate::scoring::ScoreBreakdown;
use crate::state::{MatchPhase, MatchState, Side, Sides};
use tracing::debug;
use uuid::Uuid;

// --- 出站：本机视角 -> 对端视角 ---

/// 房主发完牌后的开局消息
pub fn deal_messages(state: &MatchState) -> Vec<WireMessage> {
    vec![
        WireMessage::StartGame(Some(state.match_id)),
        WireMessage::Deck(state.deck.clone()),
        WireMessage::Table(state.table.clone()),
        WireMessage::PlayersHands(state.hands.clone().swapped()),
        turn_message(state.turn),
    ]
}

/// 本机出牌被接受后要推给对端的消息，出牌权消息总是排在状态消息之后
pub fn move_messages(state: &MatchState, report: &MoveReport) -> Vec<WireMessage> {
    let mut messages = Vec::new();

    if report.redealt {
        messages.push(WireMessage::Deck(state.deck.clone()));
    }
    messages.push(WireMessage::Table(state.table.clone()));
    messages.push(WireMessage::PlayersHands(state.hands.clone().swapped()));

    let leftovers_awarded = report.leftovers.as_ref().is_some_and(|(_, cards)| !cards.is_empty());
    if report.outcome.is_capture() || leftovers_awarded {
        messages.push(WireMessage::CardsTaken(state.captured.clone().swapped()));
    }
    if report.outcome.is_scopa() {
        messages.push(WireMessage::PlayersPoints(state.scopas.clone().swapped()));
    }
    if let Some(score) = &report.final_score {
        messages.extend(score_messages(score));
    }

    messages.push(turn_message(state.turn));
    if report.final_score.is_some() {
        messages.push(WireMessage::GameOver(true));
    }
    messages
}

/// 结算明细拆成四条消息
pub fn score_messages(score: &ScoreBreakdown) -> Vec<WireMessage> {
    let settebello = Sides::new(
        score.settebello == Some(Side::Player),
        score.settebello == Some(Side::Opponent),
    );
    vec![
        WireMessage::PlayersCoins(score.coins.clone().swapped()),
        WireMessage::Primera(score.sevens.clone().swapped()),
        WireMessage::Settebello(settebello.swapped()),
        WireMessage::PlayersScores(score.totals.clone().swapped()),
    ]
}

/// 出牌权用接收方的编号：轮到对端时发 0
pub fn turn_message(turn: Side) -> WireMessage {
    WireMessage::CurrentPlayer(turn.flip().index())
}

// --- 入站：对端消息原样装入 ---

/// 装入一条消息后发生的变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    MatchStarted,
    Updated(&'static str),
    Turn(Side),
    Scored(ScoreBreakdown),
    MatchOver,
}

/// 接收方的镜像收件箱
///
/// 结算明细分四条消息到达，在 `PlayersScores` 到达前先暂存在这里。
#[derive(Debug, Default)]
pub struct Inbox {
    coins: Option<Sides<u8>>,
    sevens: Option<Sides<u8>>,
    settebello: Option<Option<Side>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Inbox::default();
    }

    /// 把一条对局消息装入镜像状态。握手类消息不归这里处理。
    pub fn install(&mut self, state: &mut MatchState, msg: WireMessage) -> Result<Installed, SessionError> {
        let tag = msg.tag();
        if state.phase == MatchPhase::WaitingForPlayers && !matches!(msg, WireMessage::StartGame(_)) {
            return Err(SessionError::NoMatch(tag));
        }

        let installed = match msg {
            WireMessage::StartGame(match_id) => {
                self.clear();
                state.begin_mirrored_match(match_id.unwrap_or_else(Uuid::new_v4));
                Installed::MatchStarted
            }
            WireMessage::Deck(deck) => {
                state.install_deck(deck);
                Installed::Updated(tag)
            }
            WireMessage::Table(table) => {
                state.install_table(table);
                Installed::Updated(tag)
            }
            WireMessage::PlayersHands(hands) => {
                state.install_hands(hands);
                Installed::Updated(tag)
            }
            WireMessage::CardsTaken(captured) => {
                state.install_captures(captured);
                Installed::Updated(tag)
            }
            WireMessage::PlayersPoints(scopas) => {
                state.install_scopas(scopas);
                Installed::Updated(tag)
            }
            WireMessage::PlayersCoins(coins) => {
                self.coins = Some(coins);
                Installed::Updated(tag)
            }
            WireMessage::Primera(sevens) => {
                self.sevens = Some(sevens);
                Installed::Updated(tag)
            }
            WireMessage::Settebello(holder) => {
                self.settebello = Some(match (holder.player, holder.opponent) {
                    (true, _) => Some(Side::Player),
                    (false, true) => Some(Side::Opponent),
                    (false, false) => None,
                });
                Installed::Updated(tag)
            }
            WireMessage::PlayersScores(totals) => {
                // 明细没到齐时保留已经收到的部分
                let (Some(coins), Some(sevens), Some(settebello)) =
                    (self.coins.clone(), self.sevens.clone(), self.settebello)
                else {
                    return Err(SessionError::OutOfOrder(tag));
                };
                self.clear();
                let score = ScoreBreakdown {
                    cards: state.captured.map(|pile| pile.len() as u8),
                    coins,
                    sevens,
                    settebello,
                    scopas: state.scopas.clone(),
                    totals,
                };
                state.install_final_score(score.clone());
                Installed::Scored(score)
            }
            WireMessage::CurrentPlayer(index) => {
                // 解码时已经保证只有 0/1
                let turn = Side::from_index(index).unwrap_or(Side::Player);
                state.install_turn(turn);
                Installed::Turn(turn)
            }
            WireMessage::GameOver(true) => {
                state.finish();
                Installed::MatchOver
            }
            WireMessage::GameOver(false) => Installed::Updated(tag),
            WireMessage::Lobby(_) | WireMessage::IsAvatar(_) | WireMessage::PeerName(_) => Installed::Updated(tag),
        };
        debug!(tag, "已装入对端消息");
        Ok(installed)
    }
}
