use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::model::{Book, ValidationErrors};

/// 视图状态快照
///
/// 两份状态各自不可变，每次事件整体替换，读者不会看到部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    /// 书籍列表（加载时按服务端顺序，之后只追加）
    pub books: Arc<Vec<Book>>,
    /// 最近一次校验失败的错误映射
    pub errors: Arc<ValidationErrors>,
}

/// 视图状态存储
///
/// 通过 watch 通道发布快照，渲染端订阅后即可拿到最新状态。
/// 组件卸载后 `close()`，之后的写入全部丢弃。
pub struct ViewStore {
    tx: watch::Sender<ViewSnapshot>,
    closed: AtomicBool,
}

impl ViewStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewSnapshot::default());
        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> ViewSnapshot {
        self.tx.borrow().clone()
    }

    /// 订阅快照变化
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// 关闭存储，之后的更新都会被忽略
    ///
    /// 在 watch 的写锁内置位，与 `publish` 互斥
    pub fn close(&self) {
        self.tx.send_if_modified(|_| {
            self.closed.store(true, Ordering::Release);
            false
        });
    }

    /// 用服务端列表替换书籍
    ///
    /// 加载期间已经追加的书籍（服务端列表里没有的）保留在末尾，列表只增不减
    ///
    /// # 返回
    /// 存储已关闭时返回 false
    pub fn replace_books(&self, books: Vec<Book>) -> bool {
        self.publish(move |state| {
            let mut merged = books;
            let appended: Vec<Book> = state
                .books
                .iter()
                .filter(|current| !merged.iter().any(|book| book.id == current.id))
                .cloned()
                .collect();
            merged.extend(appended);
            state.books = Arc::new(merged);
        })
    }

    /// 用新的错误映射整体替换（不合并）
    pub fn replace_errors(&self, errors: ValidationErrors) -> bool {
        let errors = Arc::new(errors);
        self.publish(move |state| state.errors = errors)
    }

    /// 创建成功：清空错误并追加书籍，作为同一个快照发布
    ///
    /// 追加基于最新快照，而不是提交开始时的旧列表
    pub fn apply_created(&self, book: Book) -> bool {
        self.publish(move |state| {
            let mut books = Vec::with_capacity(state.books.len() + 1);
            books.extend(state.books.iter().cloned());
            books.push(book);
            state.books = Arc::new(books);
            state.errors = Arc::new(ValidationErrors::new());
        })
    }

    fn publish(&self, update: impl FnOnce(&mut ViewSnapshot)) -> bool {
        // 检查和修改都在写锁内完成，close() 之后不会再有更新漏过去
        let published = self.tx.send_if_modified(|state| {
            if self.is_closed() {
                return false;
            }
            update(state);
            true
        });
        if !published {
            tracing::debug!("视图已卸载，忽略状态更新");
        }
        published
    }
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}
