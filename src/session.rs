// ABOUTME: SMPP session engine: bind lifecycle, sequence allocation, request/response
// ABOUTME: correlation, auto-replies and the unsolicited-PDU inbox

use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::codec::{Encodable, Pdu};
use crate::connection::Connection;
use crate::datatypes::{
    Bind, BindMode, BindResponse, CommandId, CommandStatus, DeliverSmResponse, EnquireLink,
    EnquireLinkResponse, GenericNack, QuerySm, QuerySmResponse, SubmitSm, SubmitSmResponse,
    Unbind, UnbindResponse,
};
use crate::error::{SmppError, SmppResult};

/// Largest sequence number this session allocates; the next request wraps
/// back to 1. Values 0 and anything with bit 31 set are reserved.
const SEQUENCE_MAX: u32 = 0x7FFF_FFFE;

/// Session lifecycle states (Section 2.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Transport connected, no bind performed yet.
    Open,
    /// Bound in the given mode; traffic may flow.
    Bound(BindMode),
    /// Unbind sent, waiting for the response before closing.
    Unbinding,
    /// Transport gone, or poisoned by a fatal error.
    Closed,
}

/// One SMPP session over one byte stream.
///
/// The engine is deliberately single-reader: every operation drives the
/// read path itself until its response arrives, handling whatever else the
/// SMSC interleaves (enquire_link requests are answered, deliver_sm PDUs
/// are acknowledged and queued in the inbox, stale responses for
/// previously timed-out requests are dropped). One `Session` must not be
/// shared across tasks; see the crate docs for the concurrency contract.
#[derive(Debug)]
pub struct Session<S> {
    conn: Connection<S>,
    state: SessionState,
    next_sequence: u32,
    /// In-flight requests: sequence -> expected response command.
    /// An entry outlives a timed-out wait so a late response still
    /// matches instead of poisoning the stream.
    pending: HashMap<u32, CommandId>,
    /// Unsolicited deliver_sm PDUs in wire order, already acknowledged.
    inbox: VecDeque<Pdu>,
    read_timeout: Duration,
}

/// What the dispatcher made of one inbound PDU.
enum Inbound {
    /// A response matched to a pending request.
    Response(Pdu),
    /// Consumed internally (auto-replied, queued, or dropped).
    Handled,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    /// Wrap a connected byte stream. The session starts Open; bind next.
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            conn: Connection::new(stream),
            state: SessionState::Open,
            next_sequence: 1,
            pending: HashMap::new(),
            inbox: VecDeque::new(),
            read_timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, SessionState::Bound(_))
    }

    pub fn can_transmit(&self) -> bool {
        matches!(self.state, SessionState::Bound(mode) if mode.can_transmit())
    }

    pub fn can_receive(&self) -> bool {
        matches!(self.state, SessionState::Bound(mode) if mode.can_receive())
    }

    /// Number of received deliver_sm PDUs waiting to be read.
    pub fn inbox_len(&self) -> usize {
        self.inbox.len()
    }

    /// Allocate the next request sequence number: monotonic from 1,
    /// skipping 0 and the reserved top half of the 32-bit space.
    fn allocate_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = if sequence >= SEQUENCE_MAX {
            1
        } else {
            sequence + 1
        };
        sequence
    }

    /// Perform a bind in the given mode. On success the session is Bound;
    /// a non-zero response status closes the transport and surfaces
    /// [`SmppError::BindFailed`].
    pub async fn bind(&mut self, mut bind: Bind) -> SmppResult<BindResponse> {
        if self.state != SessionState::Open {
            return Err(SmppError::InvalidState("bind requires an open, unbound session"));
        }

        bind.sequence_number = self.allocate_sequence();
        let mode = bind.mode;
        let response = self.request(&bind).await?;

        if response.status() != CommandStatus::Ok {
            let status = response.status();
            warn!(%status, ?mode, "bind rejected");
            self.close().await;
            return Err(SmppError::BindFailed { status });
        }

        self.state = SessionState::Bound(mode);
        debug!(?mode, "session bound");
        Ok(BindResponse::parse(&response)?)
    }

    /// Submit one short message (one segment). Returns the SMSC-assigned
    /// message id.
    pub async fn submit(&mut self, mut submit: SubmitSm) -> SmppResult<SubmitSmResponse> {
        if !self.can_transmit() {
            return Err(SmppError::InvalidState(
                "submit_sm requires a transmitter or transceiver bind",
            ));
        }

        submit.sequence_number = self.allocate_sequence();
        let response = self.request(&submit).await?;

        if response.status() != CommandStatus::Ok {
            return Err(SmppError::SubmitFailed {
                status: response.status(),
            });
        }
        Ok(SubmitSmResponse::parse(&response)?)
    }

    /// Query the state of a previously submitted message. `Ok(None)` when
    /// the SMSC answers with a non-zero status (unknown id, wrong source).
    pub async fn query(&mut self, mut query: QuerySm) -> SmppResult<Option<QuerySmResponse>> {
        if !self.is_bound() {
            return Err(SmppError::InvalidState("query_sm requires a bound session"));
        }

        query.sequence_number = self.allocate_sequence();
        let response = self.request(&query).await?;

        if response.status() != CommandStatus::Ok {
            debug!(status = %response.status(), "query_sm rejected");
            return Ok(None);
        }
        Ok(Some(QuerySmResponse::parse(&response)?))
    }

    /// Send an enquire_link and wait for its response, which is returned
    /// for introspection.
    pub async fn enquire_link(&mut self) -> SmppResult<Pdu> {
        if self.state == SessionState::Closed {
            return Err(SmppError::InvalidState("session is closed"));
        }

        let enquire = EnquireLink {
            sequence_number: self.allocate_sequence(),
        };
        self.request(&enquire).await
    }

    /// Return the oldest queued deliver_sm, or read one PDU from the wire
    /// and run it through the dispatch rules. `Ok(None)` means the read
    /// deadline passed, or the PDU was consumed without producing a
    /// message; both are retryable.
    pub async fn read_inbound(&mut self) -> SmppResult<Option<Pdu>> {
        if let Some(pdu) = self.inbox.pop_front() {
            return Ok(Some(pdu));
        }
        if !self.can_receive() {
            return Err(SmppError::InvalidState(
                "reading requires a receiver or transceiver bind",
            ));
        }

        let read = match timeout(self.read_timeout, self.conn.read_pdu()).await {
            Err(_) => return Ok(None),
            Ok(read) => read,
        };
        let pdu = self.fatal_on_error(read)?;

        match self.dispatch(pdu).await? {
            Inbound::Handled => Ok(self.inbox.pop_front()),
            Inbound::Response(stale) => {
                debug!(sequence = stale.sequence(), "late response dropped");
                Ok(None)
            }
        }
    }

    /// If bound, send unbind and wait briefly for the response (a timeout
    /// here is ignored), then close the transport. Never fails.
    pub async fn unbind_and_close(&mut self) {
        if self.is_bound() {
            self.state = SessionState::Unbinding;
            let unbind = Unbind {
                sequence_number: self.allocate_sequence(),
            };
            match self.request(&unbind).await {
                Ok(_) => debug!("unbind acknowledged"),
                Err(error) => debug!(%error, "unbind not acknowledged"),
            }
        }
        self.close().await;
    }

    /// Drop the transport and mark the session Closed. Idempotent.
    pub async fn close(&mut self) {
        if self.state != SessionState::Closed {
            self.conn.shutdown().await;
            self.state = SessionState::Closed;
        }
    }

    /// Write a request PDU, then drive the read path until its response
    /// arrives or the read deadline expires. On timeout the pending entry
    /// stays so a late response is still recognized.
    async fn request<P: Encodable>(&mut self, pdu: &P) -> SmppResult<Pdu> {
        let sequence = pdu.sequence_number();
        let expected = pdu.command_id().response();

        if let Err(error) = self.conn.write_pdu(pdu).await {
            self.state = SessionState::Closed;
            return Err(error);
        }
        self.pending.insert(sequence, expected);

        loop {
            let read = match timeout(self.read_timeout, self.conn.read_pdu()).await {
                Err(_) => return Err(SmppError::Timeout),
                Ok(read) => read,
            };
            let pdu = self.fatal_on_error(read)?;

            match self.dispatch(pdu).await? {
                Inbound::Response(response) if response.sequence() == sequence => {
                    if response.header.command_id != expected as u32 {
                        self.state = SessionState::Closed;
                        return Err(SmppError::ProtocolViolation(format!(
                            "expected {:?} for sequence {}, got {:#010x}",
                            expected, sequence, response.header.command_id
                        )));
                    }
                    return Ok(response);
                }
                Inbound::Response(stale) => {
                    // A response to a request whose wait timed out earlier.
                    debug!(sequence = stale.sequence(), "late response dropped");
                }
                Inbound::Handled => {}
            }
        }
    }

    /// Map a framing-layer result: EOF and decode errors poison the
    /// session, because the stream position can no longer be trusted.
    fn fatal_on_error(&mut self, read: SmppResult<Option<Pdu>>) -> SmppResult<Pdu> {
        match read {
            Ok(Some(pdu)) => Ok(pdu),
            Ok(None) => {
                self.state = SessionState::Closed;
                Err(SmppError::ConnectionClosed)
            }
            Err(error) => {
                self.state = SessionState::Closed;
                Err(error)
            }
        }
    }

    /// Write an auto-reply; a failed write poisons the session.
    async fn reply<P: Encodable>(&mut self, pdu: &P) -> SmppResult<()> {
        if let Err(error) = self.conn.write_pdu(pdu).await {
            self.state = SessionState::Closed;
            return Err(error);
        }
        Ok(())
    }

    /// The correlation rules. Everything inbound funnels through here,
    /// whether a caller is waiting for a specific response or just reading
    /// for deliveries.
    async fn dispatch(&mut self, pdu: Pdu) -> SmppResult<Inbound> {
        let sequence = pdu.sequence();

        let Some(command) = pdu.command() else {
            return self.on_unknown_command(pdu).await;
        };

        match command {
            // Keep-alive requests are answered immediately, at the peer's
            // sequence number, before anything else proceeds.
            CommandId::EnquireLink => {
                self.reply(&EnquireLinkResponse {
                    sequence_number: sequence,
                })
                .await?;
                Ok(Inbound::Handled)
            }

            // Deliveries are acknowledged on the spot and queued for
            // read_sms in wire order.
            CommandId::DeliverSm => {
                self.reply(&DeliverSmResponse {
                    sequence_number: sequence,
                })
                .await?;
                self.inbox.push_back(pdu);
                Ok(Inbound::Handled)
            }

            // The peer wants out: acknowledge, then treat the session as
            // closed. Any in-progress wait surfaces the closure.
            CommandId::Unbind => {
                let _ = self
                    .conn
                    .write_pdu(&UnbindResponse {
                        sequence_number: sequence,
                    })
                    .await;
                self.close().await;
                Err(SmppError::ConnectionClosed)
            }

            // A generic_nack kills the in-flight request it points at; a
            // nack with sequence 0 (peer could not read ours) kills
            // whatever is in flight.
            CommandId::GenericNack => {
                let status = pdu.status();
                let matched = self.pending.remove(&sequence).is_some()
                    || (sequence == 0 && !self.pending.is_empty());
                if matched {
                    if sequence == 0 {
                        self.pending.clear();
                    }
                    Err(SmppError::ProtocolViolation(format!(
                        "request rejected with generic_nack: {status}"
                    )))
                } else {
                    warn!(sequence, %status, "unmatched generic_nack ignored");
                    Ok(Inbound::Handled)
                }
            }

            response if response.is_response() => {
                if self.pending.remove(&sequence).is_some() {
                    Ok(Inbound::Response(pdu))
                } else {
                    // A response nothing asked for: the streams are no
                    // longer aligned and nothing after this can be trusted.
                    self.close().await;
                    Err(SmppError::ProtocolViolation(format!(
                        "unsolicited {response:?} for sequence {sequence}"
                    )))
                }
            }

            // A recognized request the SMSC has no business sending to an
            // ESME (submit_sm, bind, query_sm).
            request => {
                warn!(?request, sequence, "unexpected request from peer, sending generic_nack");
                self.reply(&GenericNack::invalid_command_id(sequence)).await?;
                Ok(Inbound::Handled)
            }
        }
    }

    /// Unknown command ids: nack requests, drop unmatchable responses,
    /// fail the request a matchable one answers.
    async fn on_unknown_command(&mut self, pdu: Pdu) -> SmppResult<Inbound> {
        let command_id = pdu.header.command_id;
        let sequence = pdu.sequence();

        if pdu.is_response() {
            if self.pending.remove(&sequence).is_some() {
                return Err(SmppError::UnknownCommand { command_id });
            }
            warn!(command_id, sequence, "unknown response ignored");
            return Ok(Inbound::Handled);
        }

        warn!(command_id, sequence, "unknown request, sending generic_nack");
        self.reply(&GenericNack::invalid_command_id(sequence)).await?;
        Ok(Inbound::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> Session<tokio::io::DuplexStream> {
        let (stream, _server) = tokio::io::duplex(64);
        Session::new(stream, Duration::from_millis(100))
    }

    #[test]
    fn sequence_allocation_is_monotonic() {
        let mut session = session();
        assert_eq!(session.allocate_sequence(), 1);
        assert_eq!(session.allocate_sequence(), 2);
        assert_eq!(session.allocate_sequence(), 3);
    }

    #[test]
    fn sequence_wraps_below_reserved_range() {
        let mut session = session();
        session.next_sequence = SEQUENCE_MAX - 1;
        assert_eq!(session.allocate_sequence(), SEQUENCE_MAX - 1);
        assert_eq!(session.allocate_sequence(), SEQUENCE_MAX);
        // never 0, never 0x7FFFFFFF or above
        assert_eq!(session.allocate_sequence(), 1);
        assert_eq!(session.allocate_sequence(), 2);
    }

    #[test]
    fn fresh_session_is_open_and_unbound() {
        let session = session();
        assert_eq!(session.state(), SessionState::Open);
        assert!(!session.is_bound());
        assert!(!session.can_transmit());
        assert!(!session.can_receive());
        assert_eq!(session.inbox_len(), 0);
    }
}
