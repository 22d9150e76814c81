use crate::card::*;
use crate::error::MoveError;
use crate::resolver::{CaptureOutcome, resolve};
use crate::scoring::{ScoreBreakdown, score_match};
use crate::state::*;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

/// 开局时翻到桌上的牌数
pub const TABLE_DEAL: usize = 4;
/// 每轮发到每人手里的牌数
pub const HAND_DEAL: usize = 3;

/// 一次被接受的出牌带来的全部变化，供复制层决定要发哪些消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub side: Side,
    pub played: Card,
    pub outcome: CaptureOutcome,
    /// 这一步出完后双方手牌耗尽并从牌堆补了牌
    pub redealt: bool,
    /// 对局结束时剩余桌牌的归属
    pub leftovers: Option<(Side, Vec<Card>)>,
    pub final_score: Option<ScoreBreakdown>,
}

// --- 核心游戏流程函数 ---

impl MatchState {
    /// 开始新的一局（只有房主调用）
    ///
    /// - 重置所有状态，本机作为庄家。
    /// - 洗一副新牌，先翻 4 张到桌面，再轮流给双方各发 3 张。
    /// - 非庄家先出牌。
    pub fn start_new_match<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = MatchState {
            match_id: Uuid::new_v4(),
            phase: MatchPhase::Dealing,
            dealer: Side::Player,
            turn: Side::Opponent,
            ..MatchState::default()
        };

        self.deck = shuffled_deck(rng);
        self.table = self.draw(TABLE_DEAL);
        self.deal_hands();

        self.phase = MatchPhase::InPlay;
        debug!(match_id = %self.match_id, "发牌完成，进入出牌阶段");
    }

    /// 收到房主的开局信号后重置成镜像对局，沿用房主的对局编号，牌面内容随后由消息装入
    pub fn begin_mirrored_match(&mut self, match_id: MatchId) {
        *self = MatchState {
            match_id,
            phase: MatchPhase::InPlay,
            dealer: Side::Opponent,
            turn: Side::Player,
            ..MatchState::default()
        };
        debug!(match_id = %self.match_id, "镜像对局已重置");
    }

    /// 断线或关闭大厅时丢弃当前对局
    pub fn abandon(&mut self) {
        *self = MatchState::default();
    }

    /// 处理一方出牌
    ///
    /// 先校验阶段、轮次和手牌，任何一项不满足都直接返回错误且不改动状态。
    /// 校验通过后：
    /// - 从手牌移除出的牌并计算吃牌结果；
    /// - 更新桌面、吃牌堆和扫桌次数，吃到牌时记录最后吃牌方；
    /// - 交换出牌权；
    /// - 双方手牌都出完时补牌，牌堆也空了就结算。
    pub fn play_card(&mut self, side: Side, card: Card) -> Result<MoveReport, MoveError> {
        if self.phase != MatchPhase::InPlay {
            return Err(MoveError::WrongPhase(self.phase));
        }
        if side != self.turn {
            return Err(MoveError::NotYourTurn(side));
        }
        let Some(pos) = self.hands[side].iter().position(|c| *c == card) else {
            return Err(MoveError::CardNotInHand(card));
        };

        self.hands[side].remove(pos);
        let outcome = resolve(card, &self.table);
        match &outcome {
            CaptureOutcome::NoCapture => self.table.push(card),
            CaptureOutcome::Capture { cards, scopa } => {
                self.table.retain(|c| !cards.contains(c));
                self.captured[side].push(card);
                self.captured[side].extend(cards.iter().copied());
                if *scopa {
                    self.scopas[side] += 1;
                }
                self.last_capturer = Some(side);
            }
        }
        self.turn = side.flip();
        debug!(?side, %card, capture = outcome.is_capture(), scopa = outcome.is_scopa(), "出牌");

        let mut report = MoveReport {
            side,
            played: card,
            outcome,
            redealt: false,
            leftovers: None,
            final_score: None,
        };

        if self.hands.player.is_empty() && self.hands.opponent.is_empty() {
            self.phase = MatchPhase::HandExhausted;
            if self.deck.is_empty() {
                let (holder, leftovers, score) = self.finish_scoring();
                report.leftovers = Some((holder, leftovers));
                report.final_score = Some(score);
            } else {
                self.deal_hands();
                self.phase = MatchPhase::InPlay;
                report.redealt = true;
                debug!(remaining = self.deck.len(), "手牌耗尽，重新发牌");
            }
        }

        Ok(report)
    }

    // --- 复制层使用的装入函数 ---
    // 对端算好的结果原样写入，不重新计算吃牌。

    pub fn install_deck(&mut self, deck: Vec<Card>) {
        self.deck = deck;
    }

    pub fn install_table(&mut self, table: Vec<Card>) {
        self.table = table;
    }

    pub fn install_hands(&mut self, hands: Sides<Vec<Card>>) {
        self.hands = hands;
    }

    /// 装入吃牌堆。哪一方的牌堆变大，哪一方就是最后吃牌方。
    pub fn install_captures(&mut self, captured: Sides<Vec<Card>>) {
        for side in [Side::Player, Side::Opponent] {
            if captured[side].len() > self.captured[side].len() {
                self.last_capturer = Some(side);
            }
        }
        self.captured = captured;
    }

    pub fn install_scopas(&mut self, scopas: Sides<u32>) {
        self.scopas = scopas;
    }

    pub fn install_turn(&mut self, turn: Side) {
        self.turn = turn;
    }

    pub fn install_final_score(&mut self, score: ScoreBreakdown) {
        self.phase = MatchPhase::ScoringPending;
        self.final_score = Some(score);
    }

    /// 对端宣告对局结束
    pub fn finish(&mut self) {
        self.phase = MatchPhase::MatchOver;
    }

    // --- 辅助逻辑函数 ---

    /// 从牌堆前端取最多 n 张
    fn draw(&mut self, n: usize) -> Vec<Card> {
        let n = n.min(self.deck.len());
        self.deck.drain(..n).collect()
    }

    /// 双方各补 3 张，从先出牌的一方开始轮流抽。桌面不补。
    fn deal_hands(&mut self) {
        let first = self.turn;
        for _ in 0..HAND_DEAL {
            for side in [first, first.flip()] {
                if let Some(card) = self.draw(1).pop() {
                    self.hands[side].push(card);
                }
            }
        }
    }

    /// 剩余桌牌归最后吃牌方（从没人吃过牌时归庄家），然后只结算一次
    fn finish_scoring(&mut self) -> (Side, Vec<Card>, ScoreBreakdown) {
        self.phase = MatchPhase::ScoringPending;

        let holder = self.last_capturer.unwrap_or(self.dealer);
        let leftovers: Vec<Card> = self.table.drain(..).collect();
        self.captured[holder].extend(leftovers.iter().copied());
        self.last_capturer = Some(holder);

        let score = score_match(&self.captured, &self.scopas);
        self.final_score = Some(score.clone());
        self.phase = MatchPhase::MatchOver;
        debug!(match_id = %self.match_id, totals = ?score.totals, "对局结束");

        (holder, leftovers, score)
    }
}

// --- 单元测试 ---
