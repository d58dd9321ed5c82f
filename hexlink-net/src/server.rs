//! TCP server: accepts players and runs one session task per connection
//!
//! Everything runs on a single thread. The registry is shared with the
//! session tasks through `Rc<RefCell<_>>` on a `LocalSet`, and no borrow is
//! ever held across an await point.

use crate::registry::MatchRegistry;
use crate::session;
use crate::ServerConfig;
use std::cell::RefCell;
use std::future::Future;
use std::net::SocketAddr;
use std::rc::Rc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};
use tokio::task::LocalSet;

/// State shared by every session on the server thread
pub(crate) struct Shared {
    pub registry: RefCell<MatchRegistry>,
    /// Signalled whenever the registry changes
    pub changed: Notify,
}

pub struct Server {
    listener: TcpListener,
    shared: Rc<Shared>,
    tick: Duration,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.addr()).await?;
        Ok(Self {
            listener,
            shared: Rc::new(Shared {
                registry: RefCell::new(MatchRegistry::new()),
                changed: Notify::new(),
            }),
            tick: config.tick(),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves. Must run inside a
    /// [`LocalSet`].
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            let (stream, address) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                _ = &mut shutdown => {
                    tracing::info!("Server shutting down");
                    return Ok(());
                }
            };

            let player = self.shared.registry.borrow_mut().add_player();
            self.shared.changed.notify_waiters();
            tracing::info!("Accepted {} as player {}", address, player);

            let (reader, writer) = stream.into_split();
            tokio::task::spawn_local(session::serve(
                reader,
                writer,
                player,
                Rc::clone(&self.shared),
                self.tick,
            ));
        }
    }

    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }
}

/// Bind and serve on the current thread until the process ends
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let local = LocalSet::new();
    local
        .run_until(async move {
            let server = Server::bind(&config).await?;
            tracing::info!("HEXLINK server listening on {}", server.local_addr()?);
            server.run().await
        })
        .await?;
    Ok(())
}

/// A server running on its own thread. Dropping the handle stops it.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Start a server on a background thread and wait until it is listening
pub fn spawn_server(config: ServerConfig) -> anyhow::Result<ServerHandle> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let (ready_tx, ready_rx) = std::sync::mpsc::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let thread = std::thread::spawn(move || {
        let local = LocalSet::new();
        local.block_on(&runtime, async move {
            let server = match Server::bind(&config).await {
                Ok(server) => server,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let _ = ready_tx.send(server.local_addr());
            let stopped = async {
                let _ = shutdown_rx.await;
            };
            if let Err(e) = server.run_until(stopped).await {
                tracing::error!("Server stopped: {}", e);
            }
        });
    });

    let addr = ready_rx.recv()??;
    Ok(ServerHandle {
        addr,
        shutdown: Some(shutdown_tx),
        thread: Some(thread),
    })
}
