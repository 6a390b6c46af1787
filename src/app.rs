//! 书籍列表组件
//!
//! 挂载时一次性加载书籍，提交表单时创建书籍，卸载时取消所有进行中的请求

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiError, BooksApi};
use crate::model::{BookId, FormPayload};
use crate::render::BookListView;
use crate::view_state::{ViewSnapshot, ViewStore};

/// 加载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// 加载成功，包含书籍数量
    Loaded(usize),
    /// 加载失败（已记录日志，列表保持为空）
    Failed,
    /// 组件已卸载
    Cancelled,
}

/// 提交结果
///
/// 仅供调用方判断走了哪条路径，不会渲染到界面上
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 创建成功
    Created(BookId),
    /// 服务端校验失败，错误映射已替换
    Rejected,
    /// 其他失败（已记录日志，状态不变）
    Failed,
    /// 组件已卸载
    Cancelled,
}

/// 书籍列表组件
pub struct BookListApp<A: BooksApi + 'static> {
    api: Arc<A>,
    store: Arc<ViewStore>,
    shutdown: watch::Sender<bool>,
    mounted: AtomicBool,
    loader: Mutex<Option<JoinHandle<LoadOutcome>>>,
}

impl<A: BooksApi + 'static> BookListApp<A> {
    pub fn new(api: A) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            api: Arc::new(api),
            store: Arc::new(ViewStore::new()),
            shutdown,
            mounted: AtomicBool::new(false),
            loader: Mutex::new(None),
        }
    }

    /// 挂载组件，启动一次性加载任务
    ///
    /// 必须在 tokio 运行时内调用。
    ///
    /// # 返回
    /// 首次挂载返回 true；重复挂载或已卸载时返回 false，不会再次请求
    pub fn mount(&self) -> bool {
        if self.is_unmounted() || self.mounted.swap(true, Ordering::AcqRel) {
            return false;
        }

        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);
        let shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            tokio::select! {
                outcome = load_books(api.as_ref(), &store) => outcome,
                _ = wait_for_shutdown(shutdown) => LoadOutcome::Cancelled,
            }
        });

        match self.loader.lock() {
            Ok(mut loader) => *loader = Some(handle),
            Err(e) => {
                tracing::error!("锁定加载任务失败: {}", e);
                handle.abort();
            }
        }
        true
    }

    /// 等待挂载时的加载任务结束
    ///
    /// # 返回
    /// 未挂载或结果已被取走时返回 None
    pub async fn loaded(&self) -> Option<LoadOutcome> {
        let handle = self.loader.lock().ok()?.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_cancelled() => Some(LoadOutcome::Cancelled),
            Err(e) => {
                tracing::error!("加载任务异常退出: {}", e);
                Some(LoadOutcome::Failed)
            }
        }
    }

    /// 提交表单，创建新书籍
    ///
    /// 任何失败都不会返回给调用方，只体现在 `SubmitOutcome` 和日志中
    pub async fn add_book(&self, payload: FormPayload) -> SubmitOutcome {
        let shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return SubmitOutcome::Cancelled;
        }

        tokio::select! {
            outcome = submit_book(self.api.as_ref(), &self.store, &payload) => outcome,
            _ = wait_for_shutdown(shutdown) => SubmitOutcome::Cancelled,
        }
    }

    /// 卸载组件
    ///
    /// 取消进行中的请求并关闭状态存储，迟到的响应不会再修改状态
    pub fn unmount(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        self.store.close();
        if let Ok(loader) = self.loader.lock() {
            if let Some(handle) = loader.as_ref() {
                handle.abort();
            }
        }
        tracing::debug!("书籍列表组件已卸载");
    }

    pub fn is_unmounted(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> ViewSnapshot {
        self.store.snapshot()
    }

    /// 订阅状态变化，用于重新渲染
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.store.subscribe()
    }

    /// 当前视图
    pub fn view(&self) -> BookListView {
        BookListView::project(&self.store.snapshot())
    }
}

impl<A: BooksApi + 'static> Drop for BookListApp<A> {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn load_books(api: &dyn BooksApi, store: &ViewStore) -> LoadOutcome {
    match api.list_books().await {
        Ok(books) => {
            let count = books.len();
            if !store.replace_books(books) {
                return LoadOutcome::Cancelled;
            }
            tracing::info!(count, "书籍列表已加载");
            LoadOutcome::Loaded(count)
        }
        Err(e) => {
            tracing::error!("请求失败: {}", e);
            LoadOutcome::Failed
        }
    }
}

async fn submit_book(api: &dyn BooksApi, store: &ViewStore, payload: &FormPayload) -> SubmitOutcome {
    match api.create_book(payload).await {
        Ok(book) => {
            let id = book.id.clone();
            if !store.apply_created(book) {
                return SubmitOutcome::Cancelled;
            }
            tracing::info!(%id, "书籍已创建");
            SubmitOutcome::Created(id)
        }
        Err(ApiError::Validation(errors)) => {
            tracing::debug!(fields = errors.len(), "提交未通过校验");
            if !store.replace_errors(errors) {
                return SubmitOutcome::Cancelled;
            }
            SubmitOutcome::Rejected
        }
        Err(e) => {
            tracing::error!("请求失败: {}", e);
            SubmitOutcome::Failed
        }
    }
}

/// 等待卸载信号；发送端被丢弃同样视为卸载
async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|closed| *closed).await;
}
