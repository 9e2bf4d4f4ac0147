//! 回合与选择状态机
//!
//! 单一会话对象持有全部可变状态（局面、选择、高亮、棋谱），
//! 所有变更都经由它的方法进行，没有游离的全局状态。
//!
//! 选择是带标签的联合体：任一时刻至多一个具体选择，进入新选择
//! 必然清除旧选择。对方回合（等待应答）与终局状态下一切输入被拒绝。

use protocol::{Board, Hands, MoveOrigin, Piece, PieceKind, Side, Square, UsiMove};
use tracing::debug;

use super::kifu::KifuLog;
use super::position::PositionStore;

/// 拖拽起点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    /// 从盘上某格拖起
    Board(Square),
    /// 从持驹区拖起
    Hand { side: Side, kind: PieceKind },
}

/// 交互状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionState {
    /// 无选择，等待玩家操作
    Idle,
    /// 已选中盘上棋子
    BoardPieceSelected(Square),
    /// 已选中持驹
    HandPieceSelected { side: Side, kind: PieceKind },
    /// 拖拽中
    Dragging(DragOrigin),
    /// 等待对方应答（输入被拒绝）
    AwaitingReply,
    /// 对局结束（输入被拒绝）
    GameOver { winner: Option<String> },
}

/// 待提交的着法意图
///
/// `piece` 是走子前盘面上的棋子（打入时为持驹），其升变前代码
/// 用于棋谱标签；`needs_promotion_choice` 为 true 时需要先经过
/// 一次升变确认才能定稿。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    pub origin: MoveOrigin,
    pub to: Square,
    pub piece: Piece,
    pub needs_promotion_choice: bool,
}

/// 一次手势的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// 输入被拒绝或无事发生
    Ignored,
    /// 选择发生变化，渲染层应重绘
    SelectionChanged,
    /// 产生着法意图，交由会话控制器提交
    Intent(MoveIntent),
}

/// 客户端游戏会话
#[derive(Debug)]
pub struct GameSession {
    store: PositionStore,
    state: InteractionState,
    highlights: Vec<Square>,
    /// 选择世代：选择每变化一次递增，用于丢弃过期的高亮响应
    selection_epoch: u64,
    kifu: KifuLog,
    player_side: Side,
    /// 展示给用户的错误提示
    status_message: Option<String>,
    /// 首次加载局面失败后锁定，禁止一切交互
    locked: bool,
}

impl GameSession {
    /// 创建新会话，玩家执先手
    pub fn new() -> Self {
        Self {
            store: PositionStore::new(),
            state: InteractionState::Idle,
            highlights: Vec::new(),
            selection_epoch: 0,
            kifu: KifuLog::new(),
            player_side: Side::Sente,
            status_message: None,
            locked: false,
        }
    }

    // === 读取接口（渲染层使用） ===

    pub fn board(&self) -> &Board {
        self.store.board()
    }

    pub fn hands(&self) -> &Hands {
        self.store.hands()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn highlights(&self) -> &[Square] {
        &self.highlights
    }

    pub fn kifu(&self) -> &KifuLog {
        &self.kifu
    }

    pub fn player_side(&self) -> Side {
        self.player_side
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// 回合指示文字
    pub fn turn_text(&self) -> String {
        if self.locked {
            return "局面加载失败".to_string();
        }
        match &self.state {
            InteractionState::AwaitingReply => "对方思考中…".to_string(),
            InteractionState::GameOver { winner: Some(w) } => format!("对局结束：{}胜", w),
            InteractionState::GameOver { winner: None } => "对局结束".to_string(),
            _ => "轮到你走棋".to_string(),
        }
    }

    /// 当前是否接受玩家输入（等待应答、终局、锁定时均不接受）
    pub fn input_allowed(&self) -> bool {
        !self.locked
            && matches!(
                self.state,
                InteractionState::Idle
                    | InteractionState::BoardPieceSelected(_)
                    | InteractionState::HandPieceSelected { .. }
                    | InteractionState::Dragging(_)
            )
    }

    // === 局面更新 ===

    /// 应用一份解码完成的局面快照
    pub fn apply_snapshot(&mut self, board: Board, hands: Hands) {
        self.store.replace(board, hands);
    }

    /// 追加一行棋谱
    pub fn append_kifu(&mut self, mv: &UsiMove, label: &str, already_promoted: bool, side: Side) {
        self.kifu.append(mv, label, already_promoted, side);
    }

    // === 手势处理 ===

    /// 处理盘上格子的点击
    pub fn square_clicked(&mut self, sq: Square) -> ClickOutcome {
        if self.locked {
            return ClickOutcome::Ignored;
        }
        match self.state.clone() {
            InteractionState::AwaitingReply
            | InteractionState::GameOver { .. }
            | InteractionState::Dragging(_) => ClickOutcome::Ignored,
            InteractionState::Idle => self.try_select_board(sq),
            InteractionState::BoardPieceSelected(src) => {
                if src == sq {
                    // 再次点击同一格：取消选择
                    self.clear_selection();
                    ClickOutcome::SelectionChanged
                } else if self.own_piece_at(sq) {
                    // 点击另一枚己方棋子：替换选择
                    self.select(InteractionState::BoardPieceSelected(sq));
                    ClickOutcome::SelectionChanged
                } else {
                    self.emit_board_intent(src, sq)
                }
            }
            InteractionState::HandPieceSelected { kind, .. } => self.emit_drop_intent(kind, sq),
        }
    }

    /// 处理持驹区的点击
    pub fn hand_clicked(&mut self, side: Side, kind: PieceKind) -> ClickOutcome {
        if self.locked {
            return ClickOutcome::Ignored;
        }
        match self.state.clone() {
            InteractionState::AwaitingReply
            | InteractionState::GameOver { .. }
            | InteractionState::Dragging(_) => ClickOutcome::Ignored,
            InteractionState::HandPieceSelected { side: s, kind: k } if s == side && k == kind => {
                // 再次点击同一持驹：取消选择
                self.clear_selection();
                ClickOutcome::SelectionChanged
            }
            _ => {
                if side != self.player_side {
                    return ClickOutcome::Ignored;
                }
                // 数量为 0 的持驹不可选
                if self.store.hands().side(side).count(kind) == 0 {
                    return ClickOutcome::Ignored;
                }
                self.select(InteractionState::HandPieceSelected { side, kind });
                ClickOutcome::SelectionChanged
            }
        }
    }

    /// 处理拖拽开始，返回是否进入拖拽状态
    pub fn drag_started(&mut self, origin: DragOrigin) -> bool {
        if !self.input_allowed() {
            return false;
        }
        let valid = match origin {
            DragOrigin::Board(sq) => self.own_piece_at(sq),
            DragOrigin::Hand { side, kind } => {
                side == self.player_side && self.store.hands().side(side).count(kind) > 0
            }
        };
        if !valid {
            return false;
        }
        self.select(InteractionState::Dragging(origin));
        true
    }

    /// 处理拖拽落下
    pub fn dropped(&mut self, sq: Square) -> ClickOutcome {
        match self.state.clone() {
            InteractionState::Dragging(DragOrigin::Board(src)) => {
                if src == sq {
                    self.clear_selection();
                    ClickOutcome::SelectionChanged
                } else {
                    self.emit_board_intent(src, sq)
                }
            }
            InteractionState::Dragging(DragOrigin::Hand { kind, .. }) => {
                self.emit_drop_intent(kind, sq)
            }
            _ => ClickOutcome::Ignored,
        }
    }

    // === 会话阶段切换（由控制器驱动） ===

    /// 进入等待对方应答阶段
    pub fn begin_awaiting(&mut self) {
        self.status_message = None;
        self.state = InteractionState::AwaitingReply;
        self.bump_selection();
    }

    /// 对方应手已应用，回合交还玩家
    pub fn opponent_done(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// 着法在提交前被放弃（升变确认被关闭），回合交还玩家
    pub fn abort_awaiting(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// 当前阶段失败：回合交还玩家并展示错误，局面与棋谱保持不变
    pub fn fail_awaiting(&mut self, message: String) {
        debug!("会话阶段失败: {}", message);
        self.status_message = Some(message);
        self.state = InteractionState::Idle;
    }

    /// 对局结束
    pub fn game_over(&mut self, winner: Option<String>) {
        self.state = InteractionState::GameOver { winner };
        self.bump_selection();
    }

    /// 首次加载失败后锁定会话，禁止一切交互
    pub fn lock_fatal(&mut self) {
        self.locked = true;
        self.state = InteractionState::Idle;
        self.bump_selection();
    }

    /// 重置会话（清空棋谱与选择，局面等待重新拉取）
    pub fn reset(&mut self) {
        self.store = PositionStore::new();
        self.state = InteractionState::Idle;
        self.kifu.clear();
        self.status_message = None;
        self.locked = false;
        self.bump_selection();
    }

    // === 高亮 ===

    /// 当前选择世代，发起合法落点查询时捕获
    pub fn selection_epoch(&self) -> u64 {
        self.selection_epoch
    }

    /// 应用高亮结果；选择已变化时丢弃并返回 false
    pub fn apply_highlights(&mut self, epoch: u64, squares: Vec<Square>) -> bool {
        if epoch != self.selection_epoch {
            debug!("选择已变化，丢弃过期高亮");
            return false;
        }
        self.highlights = squares;
        true
    }

    // === 内部辅助 ===

    fn own_piece_at(&self, sq: Square) -> bool {
        self.store
            .board()
            .get(sq)
            .is_some_and(|p| p.side == self.player_side)
    }

    fn try_select_board(&mut self, sq: Square) -> ClickOutcome {
        if self.own_piece_at(sq) {
            self.select(InteractionState::BoardPieceSelected(sq));
            ClickOutcome::SelectionChanged
        } else {
            ClickOutcome::Ignored
        }
    }

    fn select(&mut self, state: InteractionState) {
        self.state = state;
        self.bump_selection();
    }

    fn clear_selection(&mut self) {
        self.state = InteractionState::Idle;
        self.bump_selection();
    }

    fn bump_selection(&mut self) {
        self.selection_epoch += 1;
        self.highlights.clear();
    }

    fn emit_board_intent(&mut self, from: Square, to: Square) -> ClickOutcome {
        let Some(piece) = self.store.board().get(from) else {
            // 选择指向的格子已不存在棋子，放弃该选择
            self.clear_selection();
            return ClickOutcome::Ignored;
        };
        // 升变确认条件：棋子尚可升变，且起点或终点在升变区内
        let needs_promotion_choice = piece.can_promote()
            && (from.in_promotion_zone(self.player_side)
                || to.in_promotion_zone(self.player_side));
        self.clear_selection();
        ClickOutcome::Intent(MoveIntent {
            origin: MoveOrigin::Board(from),
            to,
            piece,
            needs_promotion_choice,
        })
    }

    fn emit_drop_intent(&mut self, kind: PieceKind, to: Square) -> ClickOutcome {
        self.clear_selection();
        ClickOutcome::Intent(MoveIntent {
            origin: MoveOrigin::Drop(kind),
            to,
            piece: Piece::new(kind, self.player_side),
            needs_promotion_choice: false,
        })
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Sfen, INITIAL_SFEN};

    fn session_with(sfen: &str) -> GameSession {
        let mut session = GameSession::new();
        session.apply_snapshot(Sfen::parse_board(sfen).unwrap(), Hands::default());
        session
    }

    fn initial_session() -> GameSession {
        session_with(INITIAL_SFEN)
    }

    #[test]
    fn test_select_toggle_and_replace() {
        let mut session = initial_session();
        let pawn = Square::new_unchecked(2, 6);
        let other_pawn = Square::new_unchecked(3, 6);

        assert_eq!(session.square_clicked(pawn), ClickOutcome::SelectionChanged);
        assert_eq!(session.state(), &InteractionState::BoardPieceSelected(pawn));

        // 点击另一枚己方棋子：替换选择
        assert_eq!(
            session.square_clicked(other_pawn),
            ClickOutcome::SelectionChanged
        );
        assert_eq!(
            session.state(),
            &InteractionState::BoardPieceSelected(other_pawn)
        );

        // 再次点击同一格：取消
        assert_eq!(
            session.square_clicked(other_pawn),
            ClickOutcome::SelectionChanged
        );
        assert_eq!(session.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_cannot_select_opponent_piece_or_empty_square() {
        let mut session = initial_session();
        // 后手歩
        assert_eq!(
            session.square_clicked(Square::new_unchecked(2, 2)),
            ClickOutcome::Ignored
        );
        // 空格
        assert_eq!(
            session.square_clicked(Square::new_unchecked(4, 4)),
            ClickOutcome::Ignored
        );
        assert_eq!(session.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_move_intent_without_promotion() {
        let mut session = initial_session();
        let from = Square::new_unchecked(2, 6);
        let to = Square::new_unchecked(2, 5);

        session.square_clicked(from);
        let outcome = session.square_clicked(to);

        let ClickOutcome::Intent(intent) = outcome else {
            panic!("expected a move intent, got {outcome:?}");
        };
        assert_eq!(intent.origin, MoveOrigin::Board(from));
        assert_eq!(intent.to, to);
        assert!(!intent.needs_promotion_choice);
        // 意图发出后选择已清除
        assert_eq!(session.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_promotion_choice_when_entering_zone() {
        // 先手歩在敌阵第三段的入口处
        let mut session = session_with("9/9/9/4P4/9/9/9/9/4K4");
        let from = Square::new_unchecked(4, 3);
        let to = Square::new_unchecked(4, 2);

        session.square_clicked(from);
        let ClickOutcome::Intent(intent) = session.square_clicked(to) else {
            panic!("expected a move intent");
        };
        assert!(intent.needs_promotion_choice);
    }

    #[test]
    fn test_no_promotion_choice_for_gold() {
        // 金没有升变形态，即使进入敌阵也不询问
        let mut session = session_with("9/9/9/4G4/9/9/9/9/4K4");
        session.square_clicked(Square::new_unchecked(4, 3));
        let ClickOutcome::Intent(intent) =
            session.square_clicked(Square::new_unchecked(4, 2))
        else {
            panic!("expected a move intent");
        };
        assert!(!intent.needs_promotion_choice);
    }

    #[test]
    fn test_no_promotion_choice_for_already_promoted_piece() {
        let mut session = session_with("9/9/4+P4/9/9/9/9/9/4K4");
        session.square_clicked(Square::new_unchecked(4, 2));
        let ClickOutcome::Intent(intent) =
            session.square_clicked(Square::new_unchecked(4, 1))
        else {
            panic!("expected a move intent");
        };
        assert!(!intent.needs_promotion_choice);
    }

    #[test]
    fn test_hand_selection_requires_stock() {
        let mut session = initial_session();
        // 持驹为空：拒绝
        assert_eq!(
            session.hand_clicked(Side::Sente, PieceKind::Pawn),
            ClickOutcome::Ignored
        );

        let board = session.board().clone();
        let mut hands = Hands::default();
        hands.side_mut(Side::Sente).set(PieceKind::Pawn, 1);
        session.apply_snapshot(board, hands);

        assert_eq!(
            session.hand_clicked(Side::Sente, PieceKind::Pawn),
            ClickOutcome::SelectionChanged
        );
        assert_eq!(
            session.state(),
            &InteractionState::HandPieceSelected {
                side: Side::Sente,
                kind: PieceKind::Pawn
            }
        );

        // 对方持驹不可选
        assert_eq!(
            session.hand_clicked(Side::Gote, PieceKind::Pawn),
            ClickOutcome::Ignored
        );
    }

    #[test]
    fn test_hand_selection_replaces_board_selection() {
        // 进入一种选择必然清除另一种：联合体不变式
        let mut session = initial_session();
        let board = session.board().clone();
        let mut hands = Hands::default();
        hands.side_mut(Side::Sente).set(PieceKind::Silver, 1);
        session.apply_snapshot(board, hands);

        session.square_clicked(Square::new_unchecked(2, 6));
        assert!(matches!(
            session.state(),
            InteractionState::BoardPieceSelected(_)
        ));

        session.hand_clicked(Side::Sente, PieceKind::Silver);
        assert!(matches!(
            session.state(),
            InteractionState::HandPieceSelected { .. }
        ));
    }

    #[test]
    fn test_drop_intent_never_promotes() {
        let mut session = initial_session();
        let board = session.board().clone();
        let mut hands = Hands::default();
        hands.side_mut(Side::Sente).set(PieceKind::Pawn, 1);
        session.apply_snapshot(board, hands);

        session.hand_clicked(Side::Sente, PieceKind::Pawn);
        let ClickOutcome::Intent(intent) =
            session.square_clicked(Square::new_unchecked(4, 4))
        else {
            panic!("expected a drop intent");
        };
        assert_eq!(intent.origin, MoveOrigin::Drop(PieceKind::Pawn));
        assert!(!intent.needs_promotion_choice);
    }

    #[test]
    fn test_input_rejected_while_awaiting_reply() {
        let mut session = initial_session();
        session.begin_awaiting();

        assert_eq!(
            session.square_clicked(Square::new_unchecked(2, 6)),
            ClickOutcome::Ignored
        );
        assert_eq!(
            session.hand_clicked(Side::Sente, PieceKind::Pawn),
            ClickOutcome::Ignored
        );
        assert!(!session.drag_started(DragOrigin::Board(Square::new_unchecked(2, 6))));
        assert!(!session.input_allowed());
    }

    #[test]
    fn test_input_rejected_after_game_over() {
        let mut session = initial_session();
        session.game_over(Some("先手".to_string()));

        assert_eq!(
            session.square_clicked(Square::new_unchecked(2, 6)),
            ClickOutcome::Ignored
        );
        assert_eq!(session.turn_text(), "对局结束：先手胜");
    }

    #[test]
    fn test_fail_awaiting_restores_turn() {
        let mut session = initial_session();
        session.begin_awaiting();
        session.fail_awaiting("connection refused".to_string());

        assert!(session.input_allowed());
        assert_eq!(session.status_message(), Some("connection refused"));
        // 下一次进入等待阶段时清除提示
        session.begin_awaiting();
        assert_eq!(session.status_message(), None);
    }

    #[test]
    fn test_drag_flow() {
        let mut session = initial_session();
        let from = Square::new_unchecked(2, 6);
        let to = Square::new_unchecked(2, 5);

        assert!(session.drag_started(DragOrigin::Board(from)));
        assert_eq!(session.state(), &InteractionState::Dragging(DragOrigin::Board(from)));

        let ClickOutcome::Intent(intent) = session.dropped(to) else {
            panic!("expected a move intent");
        };
        assert_eq!(intent.origin, MoveOrigin::Board(from));
    }

    #[test]
    fn test_drag_back_to_source_cancels() {
        let mut session = initial_session();
        let from = Square::new_unchecked(2, 6);
        session.drag_started(DragOrigin::Board(from));

        assert_eq!(session.dropped(from), ClickOutcome::SelectionChanged);
        assert_eq!(session.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_drag_requires_own_piece() {
        let mut session = initial_session();
        // 对方棋子
        assert!(!session.drag_started(DragOrigin::Board(Square::new_unchecked(2, 2))));
        // 空持驹
        assert!(!session.drag_started(DragOrigin::Hand {
            side: Side::Sente,
            kind: PieceKind::Rook
        }));
        assert_eq!(session.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_stale_highlights_discarded() {
        let mut session = initial_session();
        session.square_clicked(Square::new_unchecked(2, 6));
        let epoch = session.selection_epoch();

        // 选择变化后，旧世代的高亮被丢弃
        session.square_clicked(Square::new_unchecked(3, 6));
        assert!(!session.apply_highlights(epoch, vec![Square::new_unchecked(2, 5)]));
        assert!(session.highlights().is_empty());

        // 当前世代的高亮正常应用
        let epoch = session.selection_epoch();
        assert!(session.apply_highlights(epoch, vec![Square::new_unchecked(3, 5)]));
        assert_eq!(session.highlights(), &[Square::new_unchecked(3, 5)]);
    }

    #[test]
    fn test_locked_session_ignores_everything() {
        let mut session = initial_session();
        session.lock_fatal();

        assert_eq!(
            session.square_clicked(Square::new_unchecked(2, 6)),
            ClickOutcome::Ignored
        );
        assert!(!session.drag_started(DragOrigin::Board(Square::new_unchecked(2, 6))));
        assert_eq!(session.turn_text(), "局面加载失败");
    }

    #[test]
    fn test_reset_clears_kifu_and_state() {
        let mut session = initial_session();
        let mv = UsiMove::parse("7g7f").unwrap();
        session.append_kifu(&mv, "歩", false, Side::Sente);
        session.game_over(None);

        session.reset();
        assert!(session.kifu().is_empty());
        assert_eq!(session.state(), &InteractionState::Idle);
        assert!(session.input_allowed());
    }
}
