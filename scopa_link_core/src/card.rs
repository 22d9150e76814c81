use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// --- 核心数据结构定义 ---

/// 花色 (Suit)，意大利牌的四种花色
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Coins,  // 金币 (denari)
    Cups,   // 圣杯 (coppe)
    Swords, // 宝剑 (spade)
    Clubs,  // 权杖 (bastoni)
}

/// 点数 (Rank)
/// 变体顺序就是计分顺序: Ace = 1 ... King = 10
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    King,
}

/// 单张牌 (Card)。整副牌每种组合只有一张，所以结构相等就是同一张牌。
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// 一副牌的张数
pub const DECK_SIZE: usize = 40;

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Coins, Suit::Cups, Suit::Swords, Suit::Clubs];
}

impl Rank {
    pub const ALL: [Rank; 10] = [
        Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five,
        Rank::Six, Rank::Seven, Rank::Eight, Rank::Nine, Rank::King,
    ];

    /// 吃牌计算用的点数，1..=10
    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        match value {
            1..=10 => Some(Rank::ALL[(value - 1) as usize]),
            _ => None,
        }
    }
}

impl Card {
    /// 金币7 (settebello)，单独计一分
    pub const SETTEBELLO: Card = Card { rank: Rank::Seven, suit: Suit::Coins };

    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Suit::Coins => "🪙",
            Suit::Cups => "🍷",
            Suit::Swords => "🗡️",
            Suit::Clubs => "🪵",
        })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rank::Ace => write!(f, "A"),
            Rank::King => write!(f, "K"),
            other => write!(f, "{}", other.value()),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardParseError {
    #[error("未知花色: {0}")]
    UnknownSuit(String),
    #[error("无效点数: {0}")]
    InvalidValue(String),
    #[error("格式应为 <点数> <花色>，收到: {0}")]
    Malformed(String),
}

impl FromStr for Suit {
    type Err = CardParseError;

    /// 同时接受英文和意大利语花色名，语音识别给出的是意大利语
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coins" | "coin" | "denari" | "denaro" => Ok(Suit::Coins),
            "cups" | "cup" | "coppe" | "coppa" => Ok(Suit::Cups),
            "swords" | "sword" | "spade" | "spada" => Ok(Suit::Swords),
            "clubs" | "club" | "bastoni" | "bastone" => Ok(Suit::Clubs),
            _ => Err(CardParseError::UnknownSuit(s.to_string())),
        }
    }
}

/// 一次吃牌意图：点数 + 花色。
/// 点击一张牌和语音指令都会归结成这个结构，再交给引擎处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureIntent {
    pub value: u8,
    pub suit: Suit,
}

impl CaptureIntent {
    /// 意图对应的牌；点数不在 1..=10 时为 None
    pub fn card(&self) -> Option<Card> {
        Rank::from_value(self.value).map(|rank| Card::new(rank, self.suit))
    }
}

impl FromStr for CaptureIntent {
    type Err = CardParseError;

    /// 解析 "7 denari"、"7 di denari" 或 "re coppe" 这类短语
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s
            .split_whitespace()
            .filter(|w| !w.eq_ignore_ascii_case("di"))
            .collect();
        let &[value, suit] = words.as_slice() else {
            return Err(CardParseError::Malformed(s.to_string()));
        };

        let value = match value.to_lowercase().as_str() {
            "a" | "asso" | "ace" => 1,
            "k" | "re" | "king" => 10,
            v => v.parse::<u8>().map_err(|_| CardParseError::InvalidValue(value.to_string()))?,
        };
        if Rank::from_value(value).is_none() {
            return Err(CardParseError::InvalidValue(value.to_string()));
        }

        Ok(CaptureIntent { value, suit: suit.parse()? })
    }
}

// --- 牌组生成 ---

/// 完整的 40 张牌，按花色优先排列
pub fn all_cards() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for &suit in &Suit::ALL {
        for &rank in &Rank::ALL {
            deck.push(Card { rank, suit });
        }
    }
    deck
}

/// 洗好的一副新牌（均匀随机排列）
pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = all_cards();
    deck.shuffle(rng);
    deck
}

// --- 单元测试 ---
