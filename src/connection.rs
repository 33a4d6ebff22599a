// ABOUTME: PDU framing over a buffered byte stream
// ABOUTME: Accumulates reads into a buffer and cuts exactly one PDU at a time

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::trace;

use crate::codec::{Encodable, Pdu, PduHeader};
use crate::error::{SmppError, SmppResult};

/// Frame-level I/O for one SMPP session.
///
/// Generic over the byte stream so the production transport is a
/// `tokio::net::TcpStream` while tests drive the same code over
/// `tokio::io::duplex`. The framer validates `command_length` bounds and
/// otherwise never interprets PDU bodies.
#[derive(Debug)]
pub struct Connection<S> {
    // Write-buffered so one PDU reaches the socket in a single flush.
    stream: BufWriter<S>,
    // Read accumulation buffer; a partial PDU stays here between reads.
    buffer: BytesMut,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(4 * 1024),
        }
    }

    /// Read one complete PDU.
    ///
    /// Returns `Ok(None)` on a clean end of stream (peer closed between
    /// PDUs). A close that cuts a PDU in half is `ConnectionClosed`.
    /// Cancellation-safe: a partial PDU survives in the buffer, so this
    /// may be wrapped in a timeout and retried.
    pub async fn read_pdu(&mut self) -> SmppResult<Option<Pdu>> {
        loop {
            if let Some(pdu) = self.extract_pdu()? {
                return Ok(Some(pdu));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(SmppError::ConnectionClosed)
                };
            }
        }
    }

    /// Cut one PDU from the front of the buffer if it is complete.
    fn extract_pdu(&mut self) -> SmppResult<Option<Pdu>> {
        if self.buffer.len() < PduHeader::SIZE {
            return Ok(None);
        }

        // Bounds are validated here, before waiting for the body: a bogus
        // command_length means the stream is already desynchronized.
        let header = PduHeader::parse(&self.buffer[..PduHeader::SIZE])?;

        let total = header.command_length as usize;
        if self.buffer.len() < total {
            return Ok(None);
        }

        self.buffer.advance(PduHeader::SIZE);
        let body = self.buffer.split_to(total - PduHeader::SIZE).freeze();

        trace!(
            command_id = header.command_id,
            status = header.command_status,
            sequence = header.sequence_number,
            len = total,
            "pdu received"
        );

        Ok(Some(Pdu { header, body }))
    }

    /// Serialize and write one PDU as a single flushed write.
    pub async fn write_pdu<P: Encodable>(&mut self, pdu: &P) -> SmppResult<()> {
        let bytes = pdu.to_bytes();

        trace!(
            command = ?pdu.command_id(),
            sequence = pdu.sequence_number(),
            len = bytes.len(),
            "pdu sent"
        );

        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Shut down the write half; errors are irrelevant at this point.
    pub async fn shutdown(&mut self) {
        let _ = self.stream.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{CommandId, EnquireLink};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn roundtrip_over_duplex() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(client);

        conn.write_pdu(&EnquireLink { sequence_number: 3 }).await.unwrap();

        let mut echo = [0u8; 16];
        tokio::io::AsyncReadExt::read_exact(&mut server, &mut echo)
            .await
            .unwrap();
        server.write_all(&echo).await.unwrap();

        let pdu = conn.read_pdu().await.unwrap().unwrap();
        assert_eq!(pdu.command(), Some(CommandId::EnquireLink));
        assert_eq!(pdu.sequence(), 3);
        assert!(pdu.body.is_empty());
    }

    #[tokio::test]
    async fn reassembles_split_writes() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(client);

        let bytes = EnquireLink { sequence_number: 9 }.to_bytes();
        let (first, rest) = bytes.split_at(5);

        let reader = tokio::spawn(async move { conn.read_pdu().await });

        server.write_all(first).await.unwrap();
        tokio::task::yield_now().await;
        server.write_all(rest).await.unwrap();

        let pdu = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(pdu.sequence(), 9);
    }

    #[tokio::test]
    async fn two_pdus_in_one_write() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(client);

        let mut bytes = EnquireLink { sequence_number: 1 }.to_bytes().to_vec();
        bytes.extend_from_slice(&EnquireLink { sequence_number: 2 }.to_bytes());
        server.write_all(&bytes).await.unwrap();

        assert_eq!(conn.read_pdu().await.unwrap().unwrap().sequence(), 1);
        assert_eq!(conn.read_pdu().await.unwrap().unwrap().sequence(), 2);
    }

    #[tokio::test]
    async fn clean_eof_yields_none() {
        let (client, server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(client);
        drop(server);
        assert!(conn.read_pdu().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eof_inside_a_pdu_is_an_error() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(client);

        let bytes = EnquireLink { sequence_number: 4 }.to_bytes();
        server.write_all(&bytes[..10]).await.unwrap();
        drop(server);

        assert!(matches!(
            conn.read_pdu().await,
            Err(SmppError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn bogus_length_is_fatal() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut conn = Connection::new(client);

        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&3u32.to_be_bytes());
        server.write_all(&bytes).await.unwrap();

        assert!(matches!(
            conn.read_pdu().await,
            Err(SmppError::Codec(_))
        ));
    }
}
