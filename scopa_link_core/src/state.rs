use crate::card::Card;
use crate::scoring::ScoreBreakdown;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use uuid::Uuid;

pub type MatchId = Uuid;

/// 对局中的一方，永远以本机视角命名：
/// `Player` 是本机玩家，`Opponent` 是对端设备上的玩家。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// 线上用的 0/1 编号
    pub fn index(self) -> u8 {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Side> {
        match index {
            0 => Some(Side::Player),
            1 => Some(Side::Opponent),
            _ => None,
        }
    }
}

/// 双方各一份的数据，如手牌、吃牌堆、扫桌次数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sides<T> {
    pub player: T,
    pub opponent: T,
}

impl<T> Sides<T> {
    pub fn new(player: T, opponent: T) -> Self {
        Sides { player, opponent }
    }

    /// 换成对端的视角：对端的 player 就是我的 opponent
    pub fn swapped(self) -> Self {
        Sides { player: self.opponent, opponent: self.player }
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Sides<U> {
        Sides { player: f(&self.player), opponent: f(&self.opponent) }
    }
}

impl<T> Index<Side> for Sides<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }
}

impl<T> IndexMut<Side> for Sides<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchPhase {
    WaitingForPlayers,
    Dealing,
    InPlay,
    /// 双方手牌都出完了，马上会重新发牌或进入结算
    HandExhausted,
    ScoringPending,
    MatchOver,
}

/// 每台设备各持有一份的对局状态，两份互为镜像
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub match_id: MatchId,
    pub phase: MatchPhase,
    // 从前往后消耗
    pub deck: Vec<Card>,
    // 桌面按摆放顺序保存，吃牌的平局规则依赖这个顺序
    pub table: Vec<Card>,
    pub hands: Sides<Vec<Card>>,
    pub captured: Sides<Vec<Card>>,
    pub scopas: Sides<u32>,
    pub turn: Side,
    // 最后一次成功吃牌的一方，结算前剩余桌牌归他
    pub last_capturer: Option<Side>,
    pub dealer: Side,
    pub final_score: Option<ScoreBreakdown>,
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState {
            match_id: Uuid::nil(),
            phase: MatchPhase::WaitingForPlayers,
            deck: Vec::new(),
            table: Vec::new(),
            hands: Sides::default(),
            captured: Sides::default(),
            scopas: Sides::default(),
            turn: Side::Player,
            last_capturer: None,
            dealer: Side::Player,
            final_score: None,
        }
    }
}

// --- MatchState 的实现方法 ---

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 牌堆、手牌、桌面和吃牌堆的总张数，任何完整状态下都应是 40
    pub fn card_count(&self) -> usize {
        self.deck.len()
            + self.table.len()
            + self.hands.player.len()
            + self.hands.opponent.len()
            + self.captured.player.len()
            + self.captured.opponent.len()
    }

    pub fn is_in_play(&self) -> bool {
        self.phase == MatchPhase::InPlay
    }

    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::MatchOver
    }

    /// 轮到本机玩家出牌
    pub fn is_my_turn(&self) -> bool {
        self.is_in_play() && self.turn == Side::Player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_flip_and_index() {
        assert_eq!(Side::Player.flip(), Side::Opponent);
        assert_eq!(Side::Opponent.flip().flip(), Side::Opponent);
        assert_eq!(Side::from_index(Side::Opponent.index()), Some(Side::Opponent));
        assert_eq!(Side::from_index(2), None);
    }

    #[test]
    fn test_sides_swapped_and_index() {
        let mut sides = Sides::new(3u32, 5u32);
        sides[Side::Opponent] += 1;
        assert_eq!(sides[Side::Opponent], 6);
        let swapped = sides.clone().swapped();
        assert_eq!(swapped.player, 6);
        assert_eq!(swapped.opponent, 3);
        assert_eq!(swapped.swapped(), sides);
    }

    #[test]
    fn test_empty_state_has_no_cards() {
        let state = MatchState::new();
        assert_eq!(state.card_count(), 0);
        assert_eq!(state.phase, MatchPhase::WaitingForPlayers);
        assert!(!state.is_my_turn());
    }
}
