//! Stop triggers for interactive dictation

use std::fmt;

use tokio::sync::oneshot;

/// What ended a dictation from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopTrigger {
    /// Enter pressed
    Enter,
    /// Ctrl+C (SIGINT)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for StopTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Enter => "Enter",
            Self::Interrupt => "Ctrl+C",
            Self::Terminate => "SIGTERM",
        };
        write!(f, "{}", text)
    }
}

/// Resolve when the user asks dictation to stop.
///
/// Closed stdin (EOF) never triggers, so `voice-notes dictate < /dev/null`
/// runs until a signal or the max duration.
pub async fn wait_for_stop() -> StopTrigger {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => StopTrigger::Interrupt,
        _ = terminate() => StopTrigger::Terminate,
        _ = enter_pressed() => StopTrigger::Enter,
    }
}

async fn enter_pressed() {
    let (tx, rx) = oneshot::channel();

    // A plain thread: a blocked stdin read must not hold up runtime shutdown
    std::thread::spawn(move || {
        let mut line = String::new();
        if let Ok(n) = std::io::stdin().read_line(&mut line) {
            if n > 0 {
                let _ = tx.send(());
            }
        }
    });

    if rx.await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(_) => std::future::pending::<()>().await,
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await
}
