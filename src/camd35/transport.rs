//! Where encoded camd35 frames are delivered.

use std::{
    fs::File,
    io::{self, Write},
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
    path::PathBuf,
    time::Duration,
};

use bytes::Bytes;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, trace};

use crate::constants::CAMD35_BUF_SIZE;
use crate::error::{Error, Result};
use crate::types::FrameKind;

pub trait Transport: Send {
    fn send(&mut self, kind: FrameKind, frame: &[u8]) -> Result<()>;

    /// Waits for the answer to the last request. `None` means no answer.
    fn recv(&mut self) -> Result<Option<Bytes>> {
        Ok(None)
    }
}

/// Writes each frame to `NNN-emm.dump` / `NNN-ecm.dump`, numbered across kinds.
#[derive(Debug)]
pub struct FileCapture {
    dir: PathBuf,
    count: u32,
}

impl FileCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), count: 0 }
    }

    pub fn next_path(&self, kind: FrameKind) -> PathBuf {
        self.dir.join(format!("{:03}-{}.dump", self.count + 1, kind.as_str()))
    }
}

impl Transport for FileCapture {
    fn send(&mut self, kind: FrameKind, frame: &[u8]) -> Result<()> {
        let path = self.next_path(kind);
        File::create(&path)
            .and_then(|mut f| f.write_all(frame))
            .map_err(|source| Error::Capture { path: path.clone(), source })?;
        self.count += 1;
        trace!(path = %path.display(), len = frame.len(), "frame captured");
        Ok(())
    }
}

/// Live camd35 over UDP.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    pub fn connect(server: SocketAddrV4, timeout: Duration) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(Error::Transport)?;
        let any = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        socket.bind(&any.into()).map_err(Error::Transport)?;
        socket.connect(&SocketAddr::V4(server).into()).map_err(Error::Transport)?;
        socket.set_read_timeout(Some(timeout)).map_err(Error::Transport)?;
        debug!(%server, "camd35 socket ready");
        Ok(Self { socket: socket.into() })
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, kind: FrameKind, frame: &[u8]) -> Result<()> {
        let n = self.socket.send(frame).map_err(Error::Transport)?;
        trace!(kind = kind.as_str(), n, "frame sent");
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<Bytes>> {
        let mut buf = vec![0u8; CAMD35_BUF_SIZE];
        match self.socket.recv(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(Bytes::from(buf)))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(Error::Transport(e)),
        }
    }
}
