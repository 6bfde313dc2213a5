use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Largest datagram read off the socket. DIS PDUs never approach it.
pub const MAX_DATAGRAM_SIZE: usize = 8192;

#[derive(Debug, Clone, Default)]
pub struct EndpointStats {
    pub datagrams_sent: u64,
    pub datagrams_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Nonblocking broadcast capable UDP socket.
pub struct DisEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    stats: EndpointStats,
    recv_buffer: Box<[u8; MAX_DATAGRAM_SIZE]>,
}

impl DisEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        socket.set_broadcast(true)?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            stats: EndpointStats::default(),
            recv_buffer: Box::new([0u8; MAX_DATAGRAM_SIZE]),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    pub fn send_to(&mut self, data: &[u8], addr: SocketAddr) -> io::Result<usize> {
        if data.len() > MAX_DATAGRAM_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Datagram exceeds maximum size",
            ));
        }

        let bytes = self.socket.send_to(data, addr)?;

        self.stats.datagrams_sent += 1;
        self.stats.bytes_sent += bytes as u64;

        Ok(bytes)
    }

    /// Hands every datagram waiting on the socket to `on_datagram`, returning
    /// once the socket would block.
    pub fn receive<F>(&mut self, mut on_datagram: F) -> io::Result<usize>
    where
        F: FnMut(&[u8], SocketAddr),
    {
        let mut count = 0;

        loop {
            match self.socket.recv_from(&mut self.recv_buffer[..]) {
                Ok((size, addr)) => {
                    self.stats.datagrams_received += 1;
                    self.stats.bytes_received += size as u64;
                    count += 1;

                    on_datagram(&self.recv_buffer[..size], addr);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_receive_drains_until_would_block() {
        let mut receiver = DisEndpoint::bind("127.0.0.1:0").unwrap();
        let mut sender = DisEndpoint::bind("127.0.0.1:0").unwrap();

        sender.send_to(&[1, 2, 3], receiver.local_addr()).unwrap();
        sender.send_to(&[4, 5], receiver.local_addr()).unwrap();

        let mut sizes = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(2);
        while sizes.len() < 2 && Instant::now() < deadline {
            receiver
                .receive(|data, _| sizes.push(data.len()))
                .unwrap();
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(sizes, vec![3, 2]);
        assert_eq!(receiver.stats().datagrams_received, 2);
        assert_eq!(sender.stats().bytes_sent, 5);
    }

    #[test]
    fn test_oversized_datagram_rejected() {
        let mut endpoint = DisEndpoint::bind("127.0.0.1:0").unwrap();
        let target = endpoint.local_addr();
        let data = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        assert!(endpoint.send_to(&data, target).is_err());
        assert_eq!(endpoint.stats().datagrams_sent, 0);
    }
}
