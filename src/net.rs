use std::net::{IpAddr, Ipv4Addr};
use tokio::net::UdpSocket;
use tracing::debug;

/// LAN address other devices on the network can reach this host at.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick the
/// outbound interface. Falls back to loopback when there is no route.
pub async fn local_ip() -> IpAddr {
    match probe_local_ip().await {
        Ok(ip) => ip,
        Err(e) => {
            debug!("Local IP discovery failed: {}", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

async fn probe_local_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.connect(("8.8.8.8", 80)).await?;
    Ok(socket.local_addr()?.ip())
}
