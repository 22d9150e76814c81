use crate::card::Card;
use serde::{Deserialize, Serialize};

/// 出一张牌之后的吃牌结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureOutcome {
    /// 吃不到任何牌，出的牌留在桌上
    NoCapture,
    /// 吃掉桌上的一组牌。`scopa` 为真表示这组牌就是整张桌面（扫桌）
    Capture { cards: Vec<Card>, scopa: bool },
}

impl CaptureOutcome {
    pub fn is_capture(&self) -> bool {
        matches!(self, CaptureOutcome::Capture { .. })
    }

    pub fn is_scopa(&self) -> bool {
        matches!(self, CaptureOutcome::Capture { scopa: true, .. })
    }
}

/// 在桌面上寻找点数和等于出牌点数的组合
///
/// 按组合大小从小到大枚举，同样大小时按桌面摆放顺序的字典序枚举，
/// 第一个命中的组合就是结果。因此：
/// - 返回的组合张数一定是所有合法组合中最少的；
/// - 存在多个最少张数组合时，取摆放位置字典序最小的那一个。
pub fn resolve(played: Card, table: &[Card]) -> CaptureOutcome {
    let target = played.value();
    let positions: Vec<usize> = (0..table.len()).collect();

    for size in 1..=table.len() {
        let hit = get_combinations(&positions, size)
            .into_iter()
            .find(|combo| combo.iter().map(|&i| table[i].value() as u32).sum::<u32>() == target as u32);

        if let Some(combo) = hit {
            return CaptureOutcome::Capture {
                cards: combo.iter().map(|&i| table[i]).collect(),
                scopa: size == table.len(),
            };
        }
    }

    CaptureOutcome::NoCapture
}

/// 辅助函数：从一个切片中生成所有大小为 k 的组合（保持原顺序，字典序输出）
fn get_combinations<T: Clone>(data: &[T], k: usize) -> Vec<Vec<T>> {
    if k == 0 {
        return vec![vec![]];
    }
    if data.len() < k {
        return vec![];
    }

    let mut result = vec![];
    let (first, rest) = data.split_at(1);

    // 包含第一个元素的组合
    let mut combinations_with_first = get_combinations(rest, k - 1);
    for combo in &mut combinations_with_first {
        combo.insert(0, first[0].clone());
    }
    result.append(&mut combinations_with_first);

    // 不包含第一个元素的组合
    if data.len() > k {
        let mut combinations_without_first = get_combinations(rest, k);
        result.append(&mut combinations_without_first);
    }

    result
}

// --- 单元测试 ---
