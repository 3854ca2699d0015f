//! Termination-signal wait used to drive graceful shutdown.

/// Completes when the process receives a termination signal.
///
/// On unix this is `SIGINT`, `SIGTERM`, or `SIGQUIT`; elsewhere it is
/// Ctrl-C. Each call registers independent listeners. `Err` means signal
/// registration itself failed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
        _ = sigquit.recv() => {}
    }
    Ok(())
}

/// Completes when the process receives Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
