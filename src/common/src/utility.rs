use tokio::{net::UdpSocket, signal, sync::broadcast};

/// Broadcast channel that fires once on ctrl-c or SIGTERM.
pub fn create_shutdown_channel() -> (broadcast::Sender<()>, broadcast::Receiver<()>) {
    let (shutdown_sender, shutdown_receiver) = broadcast::channel::<()>(1);
    let sender = shutdown_sender.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        // No receivers left means everything already stopped
        let _ = sender.send(());
    });
    (shutdown_sender, shutdown_receiver)
}

// Source: https://pg3.dev/post/7
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}

/// Local address with a free port, for test servers.
pub async fn random_address() -> std::io::Result<String> {
    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    Ok(socket.local_addr()?.to_string())
}

pub fn url<A, B, C>(protocol: A, base_url: B, endpoint: C) -> String
where
    A: ToString,
    B: ToString,
    C: ToString,
{
    format!(
        "{}://{}/{}",
        protocol.to_string(),
        base_url.to_string(),
        endpoint.to_string().trim_start_matches('/')
    )
}
