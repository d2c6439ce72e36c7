use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tokio::time::sleep;

/// Collapses rapid successive values into the most recent one.
///
/// Each call waits out the quiescence period; if a newer call arrived in the
/// meantime the older call yields `None`. Used to keep per-keystroke search
/// term edits from each becoming a cache lookup and a network fetch.
#[derive(Debug)]
pub struct Debouncer {
    quiescence: Duration,
    epoch: AtomicU64,
}

impl Debouncer {
    /// Build a debouncer with the given quiescence period.
    pub fn new(quiescence: Duration) -> Self {
        Self {
            quiescence,
            epoch: AtomicU64::new(0),
        }
    }

    /// Wait out the quiescence period and return the value if no newer call
    /// superseded this one.
    pub async fn settle(&self, value: String) -> Option<String> {
        let ticket = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        sleep(self.quiescence).await;
        (self.epoch.load(Ordering::SeqCst) == ticket).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lone_value_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        assert_eq!(
            debouncer.settle("portal".into()).await,
            Some("portal".into())
        );
    }

    #[tokio::test]
    async fn rapid_edits_keep_only_the_last() {
        let debouncer = std::sync::Arc::new(Debouncer::new(Duration::from_millis(30)));

        let first = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("p".into()).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("po".into()).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = tokio::spawn({
            let debouncer = debouncer.clone();
            async move { debouncer.settle("portal".into()).await }
        });

        assert_eq!(first.await.unwrap(), None);
        assert_eq!(second.await.unwrap(), None);
        assert_eq!(third.await.unwrap(), Some("portal".into()));
    }
}
