use crate::utils::error::Result;

/// 有子命令時等它結束並回傳它的 exit code，否則等 Ctrl-C / SIGTERM 後回傳 0
pub async fn wait_for_exit(command: &[String]) -> Result<i32> {
    let Some((program, args)) = command.split_first() else {
        shutdown_signal().await;
        return Ok(0);
    };

    let mut child = tokio::process::Command::new(program).args(args).spawn()?;
    tracing::info!("🚀 Started monitored process: {}", command.join(" "));

    let status = tokio::select! {
        status = child.wait() => status?,
        _ = shutdown_signal() => {
            tracing::info!("Stopping monitored process");
            child.start_kill()?;
            child.wait().await?
        }
    };

    tracing::info!("Monitored process exited: {}", status);
    // 被 signal 砍掉時沒有 code
    Ok(status.code().unwrap_or(1))
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
