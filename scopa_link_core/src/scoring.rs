use crate::card::{Card, Rank, Suit};
use crate::state::{Side, Sides};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 对局结束时的结算明细
///
/// 保存的是双方的原始统计量而不是判定结果，
/// 这样接收方可以原样装入对端发来的数字，不需要自己重算。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 吃牌张数
    pub cards: Sides<u8>,
    /// 吃到的金币花色张数
    pub coins: Sides<u8>,
    /// 吃到的 7 的张数 (简化版 primera)
    pub sevens: Sides<u8>,
    /// 谁吃到了金币7
    pub settebello: Option<Side>,
    /// 对局中累计的扫桌次数
    pub scopas: Sides<u32>,
    /// 总分 = 四项判定得分 + 扫桌次数
    pub totals: Sides<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Winner(Side),
    Draw,
}

/// 结算整局。纯函数，同样的输入永远得到同样的结果。
///
/// 调用前剩余桌牌必须已经归入最后吃牌的一方，
/// 否则金币、7 和金币7 的统计会漏牌。
pub fn score_match(captured: &Sides<Vec<Card>>, scopas: &Sides<u32>) -> ScoreBreakdown {
    let cards = captured.map(|pile| pile.len() as u8);
    let coins = captured.map(|pile| pile.iter().filter(|c| c.suit == Suit::Coins).count() as u8);
    let sevens = captured.map(|pile| pile.iter().filter(|c| c.rank == Rank::Seven).count() as u8);
    let settebello = if captured.player.contains(&Card::SETTEBELLO) {
        Some(Side::Player)
    } else if captured.opponent.contains(&Card::SETTEBELLO) {
        Some(Side::Opponent)
    } else {
        None
    };

    let mut breakdown = ScoreBreakdown {
        cards,
        coins,
        sevens,
        settebello,
        scopas: scopas.clone(),
        totals: scopas.clone(),
    };
    for side in breakdown.criteria_winners().into_iter().flatten() {
        breakdown.totals[side] += 1;
    }
    breakdown
}

/// 严格多者得一分，相等不给分
fn majority(tally: &Sides<u8>) -> Option<Side> {
    match tally.player.cmp(&tally.opponent) {
        Ordering::Greater => Some(Side::Player),
        Ordering::Less => Some(Side::Opponent),
        Ordering::Equal => None,
    }
}

impl ScoreBreakdown {
    pub fn cards_point(&self) -> Option<Side> {
        majority(&self.cards)
    }

    pub fn coins_point(&self) -> Option<Side> {
        majority(&self.coins)
    }

    pub fn settebello_point(&self) -> Option<Side> {
        self.settebello
    }

    pub fn primera_point(&self) -> Option<Side> {
        majority(&self.sevens)
    }

    /// 四项判定各自的得分方，顺序：张数、金币、金币7、primera
    pub fn criteria_winners(&self) -> [Option<Side>; 4] {
        [self.cards_point(), self.coins_point(), self.settebello_point(), self.primera_point()]
    }

    pub fn outcome(&self) -> MatchOutcome {
        match self.totals.player.cmp(&self.totals.opponent) {
            Ordering::Greater => MatchOutcome::Winner(Side::Player),
            Ordering::Less => MatchOutcome::Winner(Side::Opponent),
            Ordering::Equal => MatchOutcome::Draw,
        }
    }
}
