//! 取消令牌
//!
//! 子令牌在自身或任一祖先被取消时都视为已取消；取消子令牌不影响父令牌。

use std::sync::Arc;

use futures_util::future::select_all;
use tokio::sync::watch;

struct TokenNode {
    cancelled: watch::Sender<bool>,
    parent: Option<Arc<TokenNode>>,
}

#[derive(Clone)]
pub struct CancellationToken {
    node: Arc<TokenNode>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Arc<TokenNode>>) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            node: Arc::new(TokenNode { cancelled, parent }),
        }
    }

    pub fn child_token(&self) -> Self {
        Self::with_parent(Some(self.node.clone()))
    }

    pub fn cancel(&self) {
        self.node.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.chain().any(|node| *node.cancelled.borrow())
    }

    /// 等待自身或任一祖先被取消
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let waiters = self.chain().map(|node| {
            let mut rx = node.cancelled.subscribe();
            Box::pin(async move {
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    // 发送端随节点一起存活，这里不会发生
                    std::future::pending::<()>().await;
                }
            })
        });
        select_all(waiters).await;
    }

    fn chain(&self) -> impl Iterator<Item = &TokenNode> {
        std::iter::successors(Some(self.node.as_ref()), |node| node.parent.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parent_cancels_children() {
        let root = CancellationToken::new();
        let child = root.child_token();
        let grandchild = child.child_token();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert!(!root.is_cancelled());

        let sibling = root.child_token();
        root.cancel();
        assert!(sibling.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_on_ancestor() {
        let root = CancellationToken::new();
        let child = root.child_token().child_token();

        let waiter = tokio::spawn(async move { child.cancelled().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        root.cancel();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish after root cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.child_token().cancelled())
            .await
            .unwrap();
    }
}
