//! 棋谱行格式化
//!
//! 格式：`<序号> <阵营符号><目标格><棋子标签>[成](<起点>|打)`
//! 示例：`1 ▲7六歩(77)`、`5 △5五角成(88)`、`8 ▲歩(打)` 风格的 `12 △2三歩(打)`

use crate::piece::Side;
use crate::usi::{MoveOrigin, UsiMove};

/// 段的汉字写法（一到九）
const RANK_KANJI: [char; 9] = ['一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// 格式化一行棋谱
///
/// `already_promoted` 表示标签本身已是升变形态：此时即使着法带升变标记
/// 也不再追加「成」后缀，避免重复标注。序号由调用方维护，每提交一手
/// 恰好递增一次。
pub fn format_line(
    ordinal: u32,
    mv: &UsiMove,
    label: &str,
    already_promoted: bool,
    side: Side,
) -> String {
    let dest = format!("{}{}", mv.to.file(), RANK_KANJI[mv.to.y as usize]);

    let mut piece_text = label.to_string();
    if mv.promote && !already_promoted {
        piece_text.push('成');
    }

    let origin = match mv.origin {
        MoveOrigin::Board(from) => format!("({})", from.human()),
        MoveOrigin::Drop(_) => "(打)".to_string(),
    };

    format!("{} {}{}{}{}", ordinal, side.marker(), dest, piece_text, origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_board_move() {
        let mv = UsiMove::parse("7g7f").unwrap();
        let line = format_line(1, &mv, "歩", false, Side::Sente);
        assert_eq!(line, "1 ▲7六歩(77)");
    }

    #[test]
    fn test_format_drop() {
        let mv = UsiMove::parse("P*2c").unwrap();
        let line = format_line(12, &mv, "歩", false, Side::Gote);
        assert_eq!(line, "12 △2三歩(打)");
    }

    #[test]
    fn test_promotion_suffix_appended_once() {
        // 升变着法 + 升变前代码：恰好追加一次「成」
        let mv = UsiMove::parse("8h2b+").unwrap();
        let line = format_line(5, &mv, "角", false, Side::Sente);
        assert_eq!(line, "5 ▲2二角成(88)");
    }

    #[test]
    fn test_no_double_promotion_suffix() {
        // 标签已是升变形态时不再追加后缀
        let mv = UsiMove::parse("2b8h+").unwrap();
        let line = format_line(6, &mv, "馬", true, Side::Gote);
        assert_eq!(line, "6 △8八馬(22)");
    }

    #[test]
    fn test_unpromoted_move_keeps_label() {
        let mv = UsiMove::parse("2h2d").unwrap();
        let line = format_line(3, &mv, "飛", false, Side::Sente);
        assert_eq!(line, "3 ▲2四飛(28)");
    }
}
