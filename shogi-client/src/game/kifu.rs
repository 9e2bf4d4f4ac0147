//! 棋谱记录
//!
//! 行只增不改，序号从 1 开始、每提交一手严格 +1。
//! 重新渲染只读取已有行，不会重新生成。

use protocol::{format_line, Side, UsiMove};

/// 棋谱日志
#[derive(Debug, Clone)]
pub struct KifuLog {
    lines: Vec<String>,
    next_ordinal: u32,
}

impl KifuLog {
    /// 创建空棋谱
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            next_ordinal: 1,
        }
    }

    /// 追加一行棋谱并返回它
    ///
    /// 序号在此处恰好递增一次，因此每提交一手只能调用一次。
    pub fn append(
        &mut self,
        mv: &UsiMove,
        label: &str,
        already_promoted: bool,
        side: Side,
    ) -> &str {
        let line = format_line(self.next_ordinal, mv, label, already_promoted, side);
        self.next_ordinal += 1;
        self.lines.push(line);
        self.lines.last().expect("line was just pushed")
    }

    /// 已记录的所有行
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 已记录的手数
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 清空棋谱（对局重置时调用）
    pub fn clear(&mut self) {
        self.lines.clear();
        self.next_ordinal = 1;
    }
}

impl Default for KifuLog {
    fn default() -> Self {
        Self::new()
    }
}
