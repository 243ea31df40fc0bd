//! One accepted connection relayed to every destination
//!
//! Bytes from the inbound socket are copied to every open destination;
//! bytes from any destination are copied back to the inbound socket. A
//! closed destination leaves the set; once the set is empty, the inbound
//! side closes, the shutdown signal fires or the client goes away, the
//! whole tunnel is torn down exactly once.

use std::collections::BTreeMap;
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinSet;

use super::events::{log_proxy_event, ProxyEvent, TcpProxyDestination};

const BUFFER_SIZE: usize = 16 * 1024;
const CHANNEL_DEPTH: usize = 64;

/// Why a destination left the tunnel
enum Departure {
    Closed(usize),
    Failed(usize, String),
}

struct Tunnel {
    remote: SocketAddr,
    events: broadcast::Sender<ProxyEvent>,
    active: BTreeMap<usize, (TcpProxyDestination, mpsc::Sender<Vec<u8>>)>,
    tasks: JoinSet<()>,
    to_client: Option<mpsc::Sender<Vec<u8>>>,
    already_closed: bool,
}

impl Tunnel {
    fn emit(&self, event: ProxyEvent) {
        log_proxy_event(&event);
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn remove_destination(&mut self, id: usize, error: Option<String>) {
        let Some((destination, sender)) = self.active.remove(&id) else {
            return;
        };
        if let Some(error) = error {
            self.emit(ProxyEvent::TargetError {
                remote: self.remote,
                destination: destination.clone(),
                error,
            });
        }
        self.emit(ProxyEvent::TargetClosing {
            remote: self.remote,
            destination: destination.clone(),
        });
        drop(sender);
        self.emit(ProxyEvent::TargetClosed {
            remote: self.remote,
            destination,
        });
    }

    async fn close(&mut self) {
        if self.already_closed {
            return;
        }
        self.already_closed = true;

        self.emit(ProxyEvent::TunnelClosing {
            remote: self.remote,
        });
        let ids: Vec<usize> = self.active.keys().copied().collect();
        for id in ids {
            self.remove_destination(id, None);
        }
        self.to_client = None;

        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}

        self.emit(ProxyEvent::TunnelClosed {
            remote: self.remote,
        });
    }
}

/// Relay `inbound` until the tunnel closes.
pub(super) async fn run_tunnel(
    inbound: TcpStream,
    remote: SocketAddr,
    destinations: Vec<TcpProxyDestination>,
    events: broadcast::Sender<ProxyEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (mut client_read, client_write) = inbound.into_split();
    let (to_client, client_rx) = mpsc::channel(CHANNEL_DEPTH);
    let (departures_tx, mut departures) = mpsc::unbounded_channel();

    let mut tunnel = Tunnel {
        remote,
        events,
        active: BTreeMap::new(),
        tasks: JoinSet::new(),
        to_client: Some(to_client.clone()),
        already_closed: false,
    };
    tunnel.tasks.spawn(write_client(client_write, client_rx));

    for (id, destination) in destinations.into_iter().enumerate() {
        tunnel.emit(ProxyEvent::TargetOpening {
            remote,
            destination: destination.clone(),
        });
        let connect = TcpStream::connect((destination.addr.as_str(), destination.port));
        let connected = tokio::select! {
            connected = connect => connected,
            _ = stopping(&mut shutdown) => {
                tunnel.close().await;
                return;
            }
        };
        match connected {
            Ok(stream) => {
                tunnel.emit(ProxyEvent::TargetOpened {
                    remote,
                    destination: destination.clone(),
                });
                let (read, write) = stream.into_split();
                let (sender, receiver) = mpsc::channel(CHANNEL_DEPTH);
                tunnel
                    .tasks
                    .spawn(write_destination(id, write, receiver, departures_tx.clone()));
                tunnel.tasks.spawn(read_destination(
                    id,
                    read,
                    to_client.clone(),
                    departures_tx.clone(),
                ));
                tunnel.active.insert(id, (destination, sender));
            }
            Err(e) => tunnel.emit(ProxyEvent::TargetError {
                remote,
                destination,
                error: e.to_string(),
            }),
        }
    }
    drop(to_client);

    let mut buf = vec![0u8; BUFFER_SIZE];
    while !tunnel.active.is_empty() {
        tokio::select! {
            read = client_read.read(&mut buf) => match read {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let senders: Vec<mpsc::Sender<Vec<u8>>> =
                        tunnel.active.values().map(|(_, s)| s.clone()).collect();
                    let chunk = &buf[..n];
                    let fan_out = async {
                        for sender in senders {
                            // A closed writer reports its departure separately.
                            let _ = sender.send(chunk.to_vec()).await;
                        }
                    };
                    tokio::select! {
                        _ = fan_out => {}
                        _ = stopping(&mut shutdown) => break,
                    }
                }
            },
            Some(departure) = departures.recv() => match departure {
                Departure::Closed(id) => tunnel.remove_destination(id, None),
                Departure::Failed(id, error) => tunnel.remove_destination(id, Some(error)),
            },
            _ = stopping(&mut shutdown) => break,
        }
    }

    tunnel.close().await;
}

/// Resolves once the proxy asks its tunnels to stop or goes away.
pub(super) async fn stopping(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stopping| *stopping).await;
}

async fn write_client(mut write: OwnedWriteHalf, mut incoming: mpsc::Receiver<Vec<u8>>) {
    while let Some(chunk) = incoming.recv().await {
        if write.write_all(&chunk).await.is_err() {
            return;
        }
    }
    let _ = write.shutdown().await;
}

async fn write_destination(
    id: usize,
    mut write: OwnedWriteHalf,
    mut outgoing: mpsc::Receiver<Vec<u8>>,
    departures: mpsc::UnboundedSender<Departure>,
) {
    while let Some(chunk) = outgoing.recv().await {
        if let Err(e) = write.write_all(&chunk).await {
            let _ = departures.send(Departure::Failed(id, e.to_string()));
            return;
        }
    }
    let _ = write.shutdown().await;
}

async fn read_destination(
    id: usize,
    mut read: OwnedReadHalf,
    to_client: mpsc::Sender<Vec<u8>>,
    departures: mpsc::UnboundedSender<Departure>,
) {
    let mut buf = vec![0u8; BUFFER_SIZE];
    let departure = loop {
        match read.read(&mut buf).await {
            Ok(0) => break Departure::Closed(id),
            Ok(n) => {
                if to_client.send(buf[..n].to_vec()).await.is_err() {
                    break Departure::Closed(id);
                }
            }
            Err(e) => break Departure::Failed(id, describe(&e)),
        }
    };
    let _ = departures.send(departure);
}

fn describe(error: &io::Error) -> String {
    format!("{:?}: {}", error.kind(), error)
}
