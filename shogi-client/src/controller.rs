//! 着法会话编排
//!
//! [`SessionController`] 把状态机、升变确认与远端规则服务串成完整的
//! 提交流程：手势 → 意图 → （升变确认）→ 提交 → 应用应答。对方应手
//! 有两种到达方式，由应答内容决定走哪条路：
//! - 同步协议：走子应答中直接携带 `ai_move`
//! - 轮询协议：应答中无 `ai_move`，后台循环调用 `/poll` 直到就绪
//!
//! 会话被重置时，所有在途请求通过世代号作废：迟到的响应与当前
//! 世代不符，到达后被静默丢弃，不触碰任何状态。

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use protocol::{
    MoveOrigin, MoveReply, MoveRequest, Piece, PieceKind, PollReply, Sfen, ShogiError, Side,
    Square, UsiMove, UNKNOWN_LABEL,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::game::{ClickOutcome, DragOrigin, GameSession, InteractionState, MoveIntent};
use crate::network::{Authority, AuthorityError};
use crate::prompt::PromotionPrompt;

/// 客户端错误
#[derive(Error, Debug)]
pub enum ClientError {
    /// 服务端返回的局面无法解码
    #[error("malformed position from server: {0}")]
    Position(#[from] ShogiError),

    /// 远端规则服务通信失败
    #[error(transparent)]
    Authority(#[from] AuthorityError),

    /// 当前不是玩家回合，提交被拒绝（不会发起任何网络请求）
    #[error("not the player's turn")]
    NotPlayersTurn,
}

/// 会话控制器配置
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// 轮询对方应手的间隔
    pub poll_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// 渲染层一次重绘所需的全部数据
#[derive(Debug, Clone)]
pub struct SessionView {
    pub board: protocol::Board,
    pub hands: protocol::Hands,
    pub highlights: Vec<Square>,
    pub kifu_lines: Vec<String>,
    pub turn_text: String,
    pub status_message: Option<String>,
}

/// 共享的会话状态
///
/// `poll_generation` 是在途请求的世代号：重置时递增，走子与轮询的
/// 响应落地前都要核对自己出发时的世代，不符即作废。
struct Inner {
    session: GameSession,
    poll_active: bool,
    poll_generation: u64,
}

/// 着法会话控制器
pub struct SessionController<A, P> {
    inner: Arc<Mutex<Inner>>,
    authority: Arc<A>,
    prompt: P,
    poll_interval: Duration,
}

impl<A, P> SessionController<A, P>
where
    A: Authority + 'static,
    P: PromotionPrompt,
{
    /// 创建控制器，使用默认配置
    pub fn new(authority: A, prompt: P) -> Self {
        Self::with_config(authority, prompt, ControllerConfig::default())
    }

    /// 创建控制器
    pub fn with_config(authority: A, prompt: P, config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                session: GameSession::new(),
                poll_active: false,
                poll_generation: 0,
            })),
            authority: Arc::new(authority),
            prompt,
            poll_interval: config.poll_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("session mutex poisoned")
    }

    /// 首次加载局面
    ///
    /// 解码失败说明与服务端的契约已破裂，会话被锁定，后续交互
    /// 全部拒绝；传输失败则仅展示错误，可以重试。
    pub async fn load_initial(&self) -> Result<(), ClientError> {
        match self.fetch_and_apply().await {
            Ok(()) => Ok(()),
            Err(e @ ClientError::Position(_)) => {
                error!("初始局面解码失败: {}", e);
                self.lock().session.lock_fatal();
                Err(e)
            }
            Err(e) => {
                warn!("初始局面获取失败: {}", e);
                self.lock().session.fail_awaiting(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_and_apply(&self) -> Result<(), ClientError> {
        let response = self.authority.fetch_position().await?;
        let board = Sfen::parse_board(&response.sfen)?;
        let hands = response.hands.to_hands()?;
        self.lock().session.apply_snapshot(board, hands);
        Ok(())
    }

    // === 手势入口（渲染层调用） ===

    /// 盘上格子被点击
    pub async fn square_clicked(&self, x: u8, y: u8) -> Result<(), ClientError> {
        let Some(sq) = Square::new(x, y) else {
            return Ok(());
        };
        let outcome = self.lock().session.square_clicked(sq);
        self.handle_outcome(outcome).await
    }

    /// 持驹区被点击
    pub async fn hand_clicked(&self, side: Side, kind: PieceKind) -> Result<(), ClientError> {
        let outcome = self.lock().session.hand_clicked(side, kind);
        self.handle_outcome(outcome).await
    }

    /// 拖拽开始，返回是否进入拖拽状态
    pub fn drag_started(&self, origin: DragOrigin) -> bool {
        self.lock().session.drag_started(origin)
    }

    /// 拖拽落下
    pub async fn dropped(&self, x: u8, y: u8) -> Result<(), ClientError> {
        let Some(sq) = Square::new(x, y) else {
            return Ok(());
        };
        let outcome = self.lock().session.dropped(sq);
        self.handle_outcome(outcome).await
    }

    async fn handle_outcome(&self, outcome: ClickOutcome) -> Result<(), ClientError> {
        match outcome {
            ClickOutcome::Intent(intent) => self.submit_move(intent).await,
            ClickOutcome::SelectionChanged | ClickOutcome::Ignored => Ok(()),
        }
    }

    /// 提交着法意图
    ///
    /// 升变确认（如需要）先于提交完成；对话框被关闭时整个着法
    /// 作废，不发起任何网络请求。失败时局面与棋谱保持不变。
    pub async fn submit_move(&self, intent: MoveIntent) -> Result<(), ClientError> {
        let generation = {
            let mut guard = self.lock();
            if !guard.session.input_allowed() {
                return Err(ClientError::NotPlayersTurn);
            }
            guard.session.begin_awaiting();
            guard.poll_generation
        };

        let promote = if intent.needs_promotion_choice {
            match self.prompt.confirm(intent.piece, intent.to).await {
                Some(choice) => choice,
                None => {
                    debug!("升变确认被关闭，放弃该着法");
                    let mut guard = self.lock();
                    if guard.poll_generation == generation {
                        guard.session.abort_awaiting();
                    }
                    return Ok(());
                }
            }
        } else {
            false
        };

        let mv = UsiMove {
            origin: intent.origin,
            to: intent.to,
            promote,
        };
        info!(%mv, "提交着法");
        let result = self.authority.submit_move(&MoveRequest::from(&mv)).await;

        let mut guard = self.lock();
        if guard.poll_generation != generation {
            debug!("会话已重置，丢弃迟到的走子响应");
            return Ok(());
        }
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("走子失败: {}", e);
                guard.session.fail_awaiting(e.to_string());
                return Err(e.into());
            }
        };
        if let Err(e) = absorb_reply(&mut guard.session, &reply, Some((&mv, intent.piece))) {
            warn!("应答局面解码失败，保留旧局面: {}", e);
            guard.session.fail_awaiting(e.to_string());
            return Err(e);
        }
        if reply.game_over {
            info!(winner = ?reply.winner, "对局结束");
            guard.session.game_over(reply.winner.clone());
            return Ok(());
        }
        if reply.ai_move.is_some() {
            // 同步协议：应答中已含对方着法
            guard.session.opponent_done();
            return Ok(());
        }
        // 轮询协议：后台循环等待对方走子
        drop(guard);
        self.start_polling();
        Ok(())
    }

    /// 启动轮询循环，返回是否真的启动了新循环
    ///
    /// 已有循环在跑或当前并非等待应答阶段时为空操作。
    pub fn start_polling(&self) -> bool {
        let generation = {
            let mut guard = self.lock();
            if guard.poll_active {
                debug!("轮询已在进行，忽略重复启动");
                return false;
            }
            if !matches!(guard.session.state(), InteractionState::AwaitingReply) {
                return false;
            }
            guard.poll_active = true;
            guard.poll_generation
        };
        tokio::spawn(run_poll_loop(
            Arc::clone(&self.inner),
            Arc::clone(&self.authority),
            self.poll_interval,
            generation,
        ));
        true
    }

    /// 查询某格棋子的合法落点并应用为高亮
    ///
    /// 高亮仅为提示，查询失败只记日志；响应到达时选择已变化的话
    /// 结果被丢弃。
    pub async fn request_highlights(&self, x: u8, y: u8) {
        let Some(sq) = Square::new(x, y) else {
            return;
        };
        let epoch = {
            let guard = self.lock();
            if !guard.session.input_allowed() {
                return;
            }
            guard.session.selection_epoch()
        };
        match self.authority.legal_destinations(sq).await {
            Err(e) => warn!(%sq, "合法落点查询失败: {}", e),
            Ok(notations) => {
                let squares: Vec<Square> = notations
                    .iter()
                    .filter_map(|n| UsiMove::parse(n).ok())
                    .map(|mv| mv.to)
                    .collect();
                self.lock().session.apply_highlights(epoch, squares);
            }
        }
    }

    /// 重置对局
    ///
    /// 先作废所有在途请求，再通知服务端重置，最后重新拉取局面。
    pub async fn reset(&self) -> Result<(), ClientError> {
        {
            let mut guard = self.lock();
            guard.poll_generation += 1;
            guard.poll_active = false;
        }
        if let Err(e) = self.authority.reset().await {
            warn!("重置失败: {}", e);
            self.lock().session.fail_awaiting(e.to_string());
            return Err(e.into());
        }
        self.lock().session.reset();
        match self.fetch_and_apply().await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("重置后拉取局面失败: {}", e);
                self.lock().session.fail_awaiting(e.to_string());
                Err(e)
            }
        }
    }

    /// 渲染层的只读快照
    pub fn view(&self) -> SessionView {
        let guard = self.lock();
        let session = &guard.session;
        SessionView {
            board: session.board().clone(),
            hands: session.hands().clone(),
            highlights: session.highlights().to_vec(),
            kifu_lines: session.kifu().lines().to_vec(),
            turn_text: session.turn_text(),
            status_message: session.status_message().map(str::to_string),
        }
    }
}

/// 轮询循环：定时询问对方是否已走子，直到就绪、失败或被重置作废
async fn run_poll_loop<A>(
    inner: Arc<Mutex<Inner>>,
    authority: Arc<A>,
    interval: Duration,
    generation: u64,
) where
    A: Authority + 'static,
{
    loop {
        tokio::time::sleep(interval).await;
        {
            let guard = inner.lock().expect("session mutex poisoned");
            if guard.poll_generation != generation {
                return;
            }
        }
        let result = authority.poll_opponent().await;

        let mut guard = inner.lock().expect("session mutex poisoned");
        if guard.poll_generation != generation {
            debug!("轮询已被作废，丢弃迟到的响应");
            return;
        }
        match result {
            Err(e) => {
                warn!("轮询失败: {}", e);
                guard.poll_active = false;
                guard.session.fail_awaiting(e.to_string());
                return;
            }
            Ok(PollReply::Thinking { .. }) => {
                debug!("对方仍在思考");
            }
            Ok(PollReply::Ready(reply)) => {
                guard.poll_active = false;
                match absorb_reply(&mut guard.session, &reply, None) {
                    Err(e) => {
                        warn!("轮询应答解码失败，保留旧局面: {}", e);
                        guard.session.fail_awaiting(e.to_string());
                    }
                    Ok(()) => {
                        if reply.game_over {
                            info!(winner = ?reply.winner, "对局结束");
                            guard.session.game_over(reply.winner.clone());
                        } else {
                            guard.session.opponent_done();
                        }
                    }
                }
                return;
            }
        }
    }
}

/// 把走子/轮询应答落进会话
///
/// 棋盘与持驹必须都解码成功才开始落地，不允许部分应用。玩家的
/// 棋谱行（如有）用走子前的棋子代码，对方的棋谱行从新快照的目标
/// 格读取代码。
fn absorb_reply(
    session: &mut GameSession,
    reply: &MoveReply,
    player_entry: Option<(&UsiMove, Piece)>,
) -> Result<(), ClientError> {
    let board = Sfen::parse_board(&reply.board_sfen)?;
    let hands = reply.hands.to_hands()?;
    if let Some((mv, piece)) = player_entry {
        session.append_kifu(mv, piece.label(), piece.promoted, piece.side);
    }
    session.apply_snapshot(board, hands);
    if let Some(usi) = reply.ai_move.as_deref() {
        record_opponent_move(session, usi);
    }
    Ok(())
}

/// 记录对方应手的棋谱行
///
/// 解析失败只跳过该行，不中断局面更新。目标格意外为空时使用
/// 占位标签，渲染不中断。
fn record_opponent_move(session: &mut GameSession, usi: &str) {
    let opponent = session.player_side().opponent();
    let mv = match UsiMove::parse(usi) {
        Ok(mv) => mv,
        Err(e) => {
            warn!("无法解析对方着法 {}: {}", usi, e);
            return;
        }
    };
    let (label, already_promoted) = match mv.origin {
        MoveOrigin::Drop(kind) => (Piece::new(kind, opponent).label(), false),
        MoveOrigin::Board(_) => match session.board().get(mv.to) {
            Some(piece) => (piece.label(), piece.promoted),
            None => (UNKNOWN_LABEL, false),
        },
    };
    session.append_kifu(&mv, label, already_promoted, opponent);
}
