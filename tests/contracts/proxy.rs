//! Contract: a tunnel fans client bytes out to every destination and
//! survives losing one of them.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;

use targetsync::infrastructure::proxy::ProxyEvent;
use targetsync::TcpProxy;

const WAIT: Duration = Duration::from_secs(5);

async fn read_exactly(stream: &mut TcpStream, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    timeout(WAIT, stream.read_exact(&mut buf))
        .await
        .expect("timed out reading")
        .expect("read failed");
    buf
}

async fn wait_for(events: &mut broadcast::Receiver<ProxyEvent>, wanted: impl Fn(&ProxyEvent) -> bool) {
    timeout(WAIT, async {
        loop {
            match events.recv().await {
                Ok(event) if wanted(&event) => return,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("event never arrived");
}

/// CONTRACT: closing one destination keeps the tunnel open for the others.
#[tokio::test]
async fn contract_fan_out_survives_one_destination_closing() {
    let first = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let second = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let first_port = first.local_addr().unwrap().port();
    let second_port = second.local_addr().unwrap().port();

    let proxy = TcpProxy::with_bind(0, IpAddr::V4(Ipv4Addr::LOCALHOST));
    let _a = proxy.add_destination("127.0.0.1", first_port);
    let _b = proxy.add_destination("127.0.0.1", second_port);
    let mut events = proxy.subscribe();
    proxy.start().await.unwrap();

    let mut client = TcpStream::connect(proxy.local_addr().unwrap()).await.unwrap();
    let (mut up_a, _) = timeout(WAIT, first.accept()).await.unwrap().unwrap();
    let (mut up_b, _) = timeout(WAIT, second.accept()).await.unwrap().unwrap();

    client.write_all(b"ping").await.unwrap();
    assert_eq!(read_exactly(&mut up_a, 4).await, b"ping");
    assert_eq!(read_exactly(&mut up_b, 4).await, b"ping");

    up_a.write_all(b"from-a").await.unwrap();
    assert_eq!(read_exactly(&mut client, 6).await, b"from-a");

    drop(up_a);
    wait_for(&mut events, |e| {
        matches!(e, ProxyEvent::TargetClosed { destination, .. } if destination.port == first_port)
    })
    .await;

    client.write_all(b"again").await.unwrap();
    assert_eq!(read_exactly(&mut up_b, 5).await, b"again");
    up_b.write_all(b"from-b").await.unwrap();
    assert_eq!(read_exactly(&mut client, 6).await, b"from-b");

    // Losing the last destination closes the client side.
    drop(up_b);
    let mut buf = [0u8; 1];
    let read = timeout(WAIT, client.read(&mut buf)).await.unwrap();
    assert!(matches!(read, Ok(0) | Err(_)));
    wait_for(&mut events, |e| matches!(e, ProxyEvent::TunnelClosed { .. })).await;

    proxy.stop().await.unwrap();
}

/// CONTRACT: an unreachable destination is reported and skipped.
#[tokio::test]
async fn contract_unreachable_destination_does_not_block_tunnel() {
    let reachable = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let reachable_port = reachable.local_addr().unwrap().port();
    let dead_port = {
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        probe.local_addr().unwrap().port()
    };

    let proxy = TcpProxy::with_bind(0, IpAddr::V4(Ipv4Addr::LOCALHOST));
    let _dead = proxy.add_destination("127.0.0.1", dead_port);
    let _live = proxy.add_destination("127.0.0.1", reachable_port);
    let mut events = proxy.subscribe();
    proxy.start().await.unwrap();

    let mut client = TcpStream::connect(proxy.local_addr().unwrap()).await.unwrap();
    let (mut upstream, _) = timeout(WAIT, reachable.accept()).await.unwrap().unwrap();
    wait_for(&mut events, |e| {
        matches!(e, ProxyEvent::TargetError { destination, .. } if destination.port == dead_port)
    })
    .await;

    client.write_all(b"hello").await.unwrap();
    assert_eq!(read_exactly(&mut upstream, 5).await, b"hello");

    proxy.stop().await.unwrap();
}

/// CONTRACT: stopping the proxy tears down open tunnels.
#[tokio::test]
async fn contract_stop_closes_tunnels() {
    let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = upstream.local_addr().unwrap().port();

    let proxy = TcpProxy::with_bind(0, IpAddr::V4(Ipv4Addr::LOCALHOST));
    let _dest = proxy.add_destination("127.0.0.1", port);
    proxy.start().await.unwrap();

    let mut client = TcpStream::connect(proxy.local_addr().unwrap()).await.unwrap();
    let (_up, _) = timeout(WAIT, upstream.accept()).await.unwrap().unwrap();

    assert!(proxy.stop().await.unwrap());
    let mut buf = [0u8; 1];
    let read = timeout(WAIT, client.read(&mut buf)).await.unwrap();
    assert!(matches!(read, Ok(0) | Err(_)));
}

/// CONTRACT: a destination that stops reading never blocks `stop()`.
#[tokio::test]
async fn contract_stop_is_not_blocked_by_stalled_destination() {
    let upstream = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_port = upstream.local_addr().unwrap().port();

    let proxy = TcpProxy::with_bind(0, IpAddr::V4(Ipv4Addr::LOCALHOST));
    let _dest = proxy.add_destination("127.0.0.1", upstream_port);
    let mut events = proxy.subscribe();
    proxy.start().await.unwrap();

    let mut client = TcpStream::connect(proxy.local_addr().unwrap()).await.unwrap();
    // Accepted but never read from.
    let (_stalled, _) = timeout(WAIT, upstream.accept()).await.unwrap().unwrap();
    wait_for(&mut events, |e| matches!(e, ProxyEvent::TargetOpened { .. })).await;

    let writer = tokio::spawn(async move {
        let chunk = vec![0u8; 1024 * 1024];
        for _ in 0..64 {
            if client.write_all(&chunk).await.is_err() {
                break;
            }
        }
    });
    // Let the socket buffers and the tunnel channels fill up.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let stopped = timeout(WAIT, proxy.stop()).await;
    assert!(matches!(stopped, Ok(Ok(true))), "stop() did not complete");
    assert!(!proxy.is_running());

    writer.abort();
}
