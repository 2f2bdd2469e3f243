use std::future::Future;

use tokio::sync::watch;

use super::{NewsError, NewsResult};

/// 触发取消的一端
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        // 所有接收端都已释放时发送失败，可以忽略
        let _ = self.tx.send(true);
    }
}

/// 取消信号，在每个 I/O 等待点上检查
#[derive(Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelSignal { rx })
    }

    /// 永远不会触发的信号
    pub fn never() -> Self {
        let (_, signal) = Self::pair();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // 发送端已释放，信号不会再触发
                std::future::pending::<()>().await;
            }
        }
    }

    /// 执行 `fut`，信号触发时放弃该 future 并返回 `NewsError::Cancelled`
    pub async fn guard<F, T>(&self, fut: F) -> NewsResult<T>
    where
        F: Future<Output = NewsResult<T>>,
    {
        if self.is_cancelled() {
            return Err(NewsError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(NewsError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn never_signal_lets_futures_complete() {
        let signal = CancelSignal::never();
        let value = signal.guard(async { Ok::<_, NewsError>(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!signal.is_cancelled());
    }

    #[tokio::test]
    async fn fired_signal_aborts_pending_future() {
        let (handle, signal) = CancelSignal::pair();
        let task = tokio::spawn(async move {
            signal
                .guard(async {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok::<_, NewsError>(())
                })
                .await
        });

        handle.cancel();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(NewsError::Cancelled)));
    }

    #[tokio::test]
    async fn already_cancelled_signal_skips_future() {
        let (handle, signal) = CancelSignal::pair();
        handle.cancel();
        let result = signal.guard(async { Ok::<_, NewsError>(1) }).await;
        assert!(matches!(result, Err(NewsError::Cancelled)));
    }
}
