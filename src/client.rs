// ABOUTME: High-level ESME client: bind, send_sms with segmentation, read_sms,
// ABOUTME: query_status, enquire_link and close over one SMPP session

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::codec::Pdu;
use crate::datatypes::{
    Address, Bind, BindMode, BindResponse, DataCoding, InboundSms, NumericPlanIndicator, QuerySm,
    QuerySmResponse, SmppTime, SubmitSm, Tlv, TypeOfNumber,
};
use crate::error::{SmppError, SmppResult};
use crate::keepalive::{KeepAliveConfig, KeepAliveManager, KeepAliveStatus};
use crate::segmenter::{CsmsMethod, Segmenter};
use crate::session::{Session, SessionState};

/// Authentication material presented in a bind request.
#[derive(Debug, Clone)]
pub struct BindCredentials {
    pub system_id: String,
    pub password: String,
    /// ESME category, operator-assigned; usually empty.
    pub system_type: String,
}

impl BindCredentials {
    pub fn new(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            password: password.into(),
            system_type: String::new(),
        }
    }

    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = system_type.into();
        self
    }
}

/// Client configuration. Immutable once the client is constructed.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: BindCredentials,
    /// TON/NPI announced in bind requests for the address_range.
    pub addr_ton: TypeOfNumber,
    pub addr_npi: NumericPlanIndicator,
    /// Address range routed to a receiver bind; usually empty.
    pub address_range: String,
    /// How messages over the single-part budget are carried.
    pub csms_method: CsmsMethod,
    /// Default registered_delivery flag for submitted messages.
    pub registered_delivery: u8,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(credentials: BindCredentials) -> Self {
        Self {
            credentials,
            addr_ton: TypeOfNumber::Unknown,
            addr_npi: NumericPlanIndicator::Unknown,
            address_range: String::new(),
            csms_method: CsmsMethod::default(),
            registered_delivery: 0,
            read_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_csms_method(mut self, method: CsmsMethod) -> Self {
        self.csms_method = method;
        self
    }

    pub fn with_address_range(mut self, range: impl Into<String>) -> Self {
        self.address_range = range.into();
        self
    }

    pub fn with_registered_delivery(mut self, flag: u8) -> Self {
        self.registered_delivery = flag;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

/// Per-message options with sensible defaults.
#[derive(Debug, Clone, Default)]
pub struct SmsOptions {
    pub service_type: String,
    pub data_coding: DataCoding,
    /// Priority level 0 (lowest) to 3.
    pub priority_flag: u8,
    /// SMPP time string; empty means immediate.
    pub schedule_delivery_time: String,
    /// SMPP time string; empty means the SMSC default.
    pub validity_period: String,
    /// Overrides the client-wide registered_delivery flag when set.
    pub registered_delivery: Option<u8>,
    /// Extra TLVs appended to every segment.
    pub tags: Vec<Tlv>,
}

/// One outbound message. `text` is encoded according to the data coding:
/// UCS-2 converts to UTF-16BE, everything else passes the bytes through
/// untouched (the caller supplies pre-packed GSM 03.38 or plain ASCII).
#[derive(Debug, Clone)]
pub struct SmsMessage {
    pub from: Address,
    pub to: Address,
    pub text: String,
    pub options: SmsOptions,
}

impl SmsMessage {
    pub fn new(from: Address, to: Address, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            text: text.into(),
            options: SmsOptions::default(),
        }
    }

    pub fn with_data_coding(mut self, data_coding: DataCoding) -> Self {
        self.options.data_coding = data_coding;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.options.priority_flag = priority;
        self
    }

    pub fn with_schedule(mut self, schedule_delivery_time: impl Into<String>) -> Self {
        self.options.schedule_delivery_time = schedule_delivery_time.into();
        self
    }

    pub fn with_validity(mut self, validity_period: impl Into<String>) -> Self {
        self.options.validity_period = validity_period.into();
        self
    }

    pub fn with_registered_delivery(mut self, flag: u8) -> Self {
        self.options.registered_delivery = Some(flag);
        self
    }

    pub fn with_tag(mut self, tag: Tlv) -> Self {
        self.options.tags.push(tag);
        self
    }
}

/// The ESME client.
///
/// Not safe for concurrent use: all operations take `&mut self` and one
/// session must stay on one task. Generic over the byte stream; the
/// default is a TCP transport built with [`Client::connect`], while tests
/// and custom transports go through [`Client::with_stream`].
#[derive(Debug)]
pub struct Client<S = TcpStream> {
    config: ClientConfig,
    session: Option<Session<S>>,
    segmenter: Segmenter,
    keep_alive: Option<KeepAliveManager>,
    peer: Option<String>,
}

/// Seed for the concatenation reference counter; wall-clock derived so
/// consecutive process starts do not replay the same references.
fn reference_seed() -> u16 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_millis() as u16)
        .unwrap_or(1)
}

/// Encode message text for the wire according to the data coding.
fn encode_text(text: &str, coding: DataCoding) -> Vec<u8> {
    match coding {
        DataCoding::Ucs2 => text
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect(),
        _ => text.as_bytes().to_vec(),
    }
}

async fn open_stream(addr: &str, connect_timeout: Duration) -> SmppResult<TcpStream> {
    match timeout(connect_timeout, TcpStream::connect(addr)).await {
        Err(_) => Err(SmppError::Timeout),
        Ok(stream) => Ok(stream?),
    }
}

impl Client<TcpStream> {
    /// Open a TCP transport to the SMSC. The session is created Open;
    /// follow with one of the bind operations.
    pub async fn connect(addr: impl Into<String>, config: ClientConfig) -> SmppResult<Self> {
        let addr = addr.into();
        let stream = open_stream(&addr, config.connect_timeout).await?;
        let session = Session::new(stream, config.read_timeout);
        Ok(Self {
            session: Some(session),
            segmenter: Segmenter::new(reference_seed()),
            keep_alive: None,
            peer: Some(addr),
            config,
        })
    }

    /// Re-open the transport to the remembered peer after `close` or a
    /// fatal error. Does not bind.
    pub async fn reconnect(&mut self) -> SmppResult<()> {
        let Some(addr) = self.peer.clone() else {
            return Err(SmppError::InvalidState("no peer address to reconnect to"));
        };
        if let Some(mut old) = self.session.take() {
            old.close().await;
        }
        let stream = open_stream(&addr, self.config.connect_timeout).await?;
        self.session = Some(Session::new(stream, self.config.read_timeout));
        Ok(())
    }

    /// Bind as a transmitter, re-opening the transport first if it is
    /// closed.
    pub async fn bind_transmitter(&mut self) -> SmppResult<BindResponse> {
        self.bind(BindMode::Transmitter).await
    }

    /// Bind as a receiver, re-opening the transport first if it is closed.
    pub async fn bind_receiver(&mut self) -> SmppResult<BindResponse> {
        self.bind(BindMode::Receiver).await
    }

    /// Bind as a transceiver, re-opening the transport first if it is
    /// closed.
    pub async fn bind_transceiver(&mut self) -> SmppResult<BindResponse> {
        self.bind(BindMode::Transceiver).await
    }

    async fn bind(&mut self, mode: BindMode) -> SmppResult<BindResponse> {
        let closed = self
            .session
            .as_ref()
            .map_or(true, |session| session.state() == SessionState::Closed);
        if closed {
            self.reconnect().await?;
        }
        self.bind_as(mode).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S> {
    /// Build a client over an already-connected byte stream.
    pub fn with_stream(stream: S, config: ClientConfig) -> Self {
        let session = Session::new(stream, config.read_timeout);
        Self {
            session: Some(session),
            segmenter: Segmenter::new(reference_seed()),
            keep_alive: None,
            peer: None,
            config,
        }
    }

    fn session_mut(&mut self) -> SmppResult<&mut Session<S>> {
        self.session
            .as_mut()
            .filter(|session| session.state() != SessionState::Closed)
            .ok_or(SmppError::InvalidState("transport is closed"))
    }

    /// Bind the current session in the given mode using the configured
    /// credentials.
    pub async fn bind_as(&mut self, mode: BindMode) -> SmppResult<BindResponse> {
        let bind = Bind {
            sequence_number: 0, // assigned by the session
            mode,
            system_id: self.config.credentials.system_id.clone(),
            password: self.config.credentials.password.clone(),
            system_type: self.config.credentials.system_type.clone(),
            addr_ton: self.config.addr_ton,
            addr_npi: self.config.addr_npi,
            address_range: self.config.address_range.clone(),
        };
        self.session_mut()?.bind(bind).await
    }

    /// Submit a message, splitting it per the configured CSMS method when
    /// it exceeds the single-part budget. Segments go out sequentially;
    /// the returned id is the one the SMSC assigned to the first segment.
    ///
    /// Fails with [`SmppError::Segmentation`] before anything is written
    /// when the coding/method combination cannot carry the message.
    pub async fn send_sms(&mut self, message: &SmsMessage) -> SmppResult<String> {
        SmppTime::parse(&message.options.schedule_delivery_time)?;
        SmppTime::parse(&message.options.validity_period)?;

        let coding = message.options.data_coding;
        let payload = encode_text(&message.text, coding);
        let segments = self
            .segmenter
            .segment(&payload, coding, self.config.csms_method)?;

        let registered_delivery = message
            .options
            .registered_delivery
            .unwrap_or(self.config.registered_delivery);
        let total = segments.len();

        let session = self
            .session
            .as_mut()
            .filter(|session| session.state() != SessionState::Closed)
            .ok_or(SmppError::InvalidState("transport is closed"))?;

        let mut first_id: Option<String> = None;
        for (index, segment) in segments.into_iter().enumerate() {
            let mut tlvs = segment.tlvs;
            tlvs.extend(message.options.tags.iter().cloned());

            let submit = SubmitSm {
                sequence_number: 0, // assigned by the session
                service_type: message.options.service_type.clone(),
                source: message.from.clone(),
                destination: message.to.clone(),
                esm_class: segment.esm_class_bits,
                protocol_id: 0,
                priority_flag: message.options.priority_flag,
                schedule_delivery_time: message.options.schedule_delivery_time.clone(),
                validity_period: message.options.validity_period.clone(),
                registered_delivery,
                replace_if_present_flag: 0,
                data_coding: coding,
                sm_default_msg_id: 0,
                short_message: segment.short_message,
                tlvs,
            };

            let response = session.submit(submit).await?;
            debug!(
                part = index + 1,
                total,
                message_id = %response.message_id,
                "segment accepted"
            );
            if first_id.is_none() {
                first_id = Some(response.message_id);
            }
        }

        Ok(first_id.unwrap_or_default())
    }

    /// Read one inbound message: the oldest queued deliver_sm, or one PDU
    /// from the wire run through the correlation rules. `Ok(None)` means
    /// nothing was produced before the read deadline; retry at will.
    pub async fn read_sms(&mut self) -> SmppResult<Option<InboundSms>> {
        match self.session_mut()?.read_inbound().await? {
            Some(pdu) => Ok(Some(InboundSms::parse(&pdu)?)),
            None => Ok(None),
        }
    }

    /// Look up the state of a submitted message. `source` must be the
    /// address the message was submitted with. `Ok(None)` when the SMSC
    /// rejects the query.
    pub async fn query_status(
        &mut self,
        message_id: &str,
        source: &Address,
    ) -> SmppResult<Option<QuerySmResponse>> {
        let query = QuerySm {
            sequence_number: 0, // assigned by the session
            message_id: message_id.to_string(),
            source: source.clone(),
        };
        self.session_mut()?.query(query).await
    }

    /// Send an enquire_link and return the SMSC's response PDU.
    pub async fn enquire_link(&mut self) -> SmppResult<Pdu> {
        if let Some(manager) = &mut self.keep_alive {
            manager.on_ping_sent();
        }

        let result = match self
            .session
            .as_mut()
            .filter(|session| session.state() != SessionState::Closed)
        {
            Some(session) => session.enquire_link().await,
            None => Err(SmppError::InvalidState("transport is closed")),
        };

        if let Some(manager) = &mut self.keep_alive {
            match &result {
                Ok(_) => manager.on_ping_success(),
                Err(_) => manager.on_ping_failure(),
            }
        }
        result
    }

    /// Unbind if bound, then close the transport. Never fails; errors on
    /// the way down are logged and swallowed.
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.unbind_and_close().await;
        }
    }

    pub fn is_bound(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.is_bound())
    }

    /// Session state, if a transport exists.
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Closed, |session| session.state())
    }

    /// Start tracking keep-alive timing. Drive it by calling
    /// [`maintain_keep_alive`](Self::maintain_keep_alive) from the
    /// application loop.
    pub fn start_keep_alive(&mut self, config: KeepAliveConfig) {
        self.keep_alive = Some(KeepAliveManager::new(config));
    }

    pub fn stop_keep_alive(&mut self) {
        self.keep_alive = None;
    }

    /// Send an enquire_link if one is due. `Ok(true)` when a ping went
    /// out, `Ok(false)` when none was needed.
    pub async fn maintain_keep_alive(&mut self) -> SmppResult<bool> {
        let due = self
            .keep_alive
            .as_ref()
            .is_some_and(|manager| manager.should_ping());
        if !due {
            return Ok(false);
        }
        self.enquire_link().await?;
        Ok(true)
    }

    pub fn keep_alive_status(&self) -> KeepAliveStatus {
        self.keep_alive
            .as_ref()
            .map(KeepAliveManager::status)
            .unwrap_or_default()
    }

    pub fn is_keep_alive_failed(&self) -> bool {
        self.keep_alive
            .as_ref()
            .is_some_and(KeepAliveManager::is_connection_failed)
    }
}
