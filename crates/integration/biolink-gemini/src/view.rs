//! Results scoped to the lifetime of the view that asked for them

use std::future::Future;

use tokio::sync::watch;

/// Held by a view for as long as it is on screen. Dropping it discards
/// every result still pending on one of its handles.
#[derive(Debug)]
pub struct ViewGuard {
    alive: watch::Sender<()>,
}

impl ViewGuard {
    pub fn new() -> Self {
        let (alive, _) = watch::channel(());
        Self { alive }
    }

    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            alive: self.alive.subscribe(),
        }
    }

    /// Tear the view down
    pub fn close(self) {}
}

impl Default for ViewGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ViewHandle {
    alive: watch::Receiver<()>,
}

impl ViewHandle {
    pub fn is_alive(&self) -> bool {
        self.alive.has_changed().is_ok()
    }

    /// Drive `work` while the view lives.
    ///
    /// `Some(output)` if the view is still there when `work` finishes,
    /// `None` if the view went away first. The unfinished future is dropped.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        if !self.is_alive() {
            return None;
        }
        let mut alive = self.alive.clone();
        let closed = async move { while alive.changed().await.is_ok() {} };

        tokio::select! {
            biased;
            _ = closed => {
                tracing::debug!("view closed, discarding pending result");
                None
            }
            output = work => Some(output),
        }
    }
}
