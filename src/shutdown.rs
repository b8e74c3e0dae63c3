use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// One-way stop flag shared by the hunter loops and the scanners' pauses.
pub struct Shutdown {
    stopped: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self { stopped }
    }

    pub fn trigger(&self) {
        self.stopped.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Sleeps for `duration` unless triggered first. Returns whether the
    /// caller should keep running.
    pub async fn pause(&self, duration: Duration) -> bool {
        let mut stopped = self.stopped.subscribe();
        if *stopped.borrow_and_update() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_triggered(),
            _ = stopped.wait_for(|stopped| *stopped) => false,
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM. The SIGTERM handler is installed before
/// this returns.
#[cfg(unix)]
pub fn termination_signal() -> io::Result<impl Future<Output = ()> + Send> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    Ok(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
            _ = terminate.recv() => info!("SIGTERM received"),
        }
    })
}

#[cfg(not(unix))]
pub fn termination_signal() -> io::Result<impl Future<Output = ()> + Send> {
    Ok(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_trigger_interrupts_pause() {
        let shutdown = Arc::new(Shutdown::new());
        assert!(!shutdown.is_triggered());

        let sleeper = {
            let shutdown = Arc::clone(&shutdown);
            tokio::spawn(async move { shutdown.pause(Duration::from_secs(3600)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.trigger();

        let keep_running = tokio::time::timeout(Duration::from_secs(5), sleeper)
            .await
            .unwrap()
            .unwrap();
        assert!(!keep_running);
        assert!(!shutdown.pause(Duration::from_secs(3600)).await);
    }

    #[tokio::test]
    async fn test_short_pause_completes() {
        let shutdown = Shutdown::new();
        assert!(shutdown.pause(Duration::from_millis(5)).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sigterm_resolves_termination_signal() {
        let signal = termination_signal().unwrap();
        let status = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("kill -TERM {}", std::process::id()))
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), signal).await.unwrap();
    }
}
