use anyhow::Result;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

/// TCP proxy in front of the broker. Cutting the proxied connections looks like a network failure
/// for the client.
pub struct Proxy {
    addr: SocketAddr,
    generation: Arc<Mutex<CancellationToken>>,
}

impl Proxy {
    pub async fn start(upstream: &str) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let generation = Arc::new(Mutex::new(CancellationToken::new()));
        let current = generation.clone();
        let upstream = upstream.to_owned();

        tokio::spawn(async move {
            while let Ok((mut inbound, _)) = listener.accept().await {
                let cut = current.lock().unwrap().clone();
                let upstream = upstream.clone();

                tokio::spawn(async move {
                    let Ok(mut outbound) = TcpStream::connect(&upstream).await else {
                        return;
                    };

                    tokio::select! {
                        _ = cut.cancelled() => {}
                        _ = tokio::io::copy_bidirectional(&mut inbound, &mut outbound) => {}
                    }
                });
            }
        });

        Ok(Self { addr, generation })
    }

    pub fn uri(&self) -> String {
        format!("amqp://guest:guest@{}/%2f", self.addr)
    }

    /// Cut all the connections going through the proxy. New connections are accepted.
    pub fn sever(&self) {
        let mut generation = self.generation.lock().unwrap();

        generation.cancel();
        *generation = CancellationToken::new();
    }
}
