//! An SMPP v3.4 client library for External Short Message Entities.
//!
//! The crate implements the ESME side of the Short Message Peer-to-Peer
//! protocol: binding to an SMSC, submitting messages (with transparent
//! splitting of long messages into concatenated parts), receiving
//! mobile-originated messages and delivery receipts, querying message
//! state, and keeping the session alive.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use esme::{Address, BindCredentials, Client, ClientConfig, SmsMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(BindCredentials::new("system_id", "password"));
//!     let mut client = Client::connect("smsc.example.net:2775", config).await?;
//!
//!     client.bind_transmitter().await?;
//!
//!     let message = SmsMessage::new(
//!         Address::international("491701111111")?,
//!         Address::international("491702222222")?,
//!         "Hello, World!",
//!     );
//!     let message_id = client.send_sms(&message).await?;
//!     println!("accepted as {message_id}");
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! Receiving works the same way on a receiver or transceiver bind:
//!
//! ```rust,no_run
//! use esme::{BindCredentials, Client, ClientConfig, InboundSms};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new(BindCredentials::new("system_id", "password"));
//! let mut client = Client::connect("smsc.example.net:2775", config).await?;
//! client.bind_receiver().await?;
//!
//! loop {
//!     match client.read_sms().await? {
//!         Some(InboundSms::Sms(sms)) => {
//!             println!("from {}: {:?}", sms.source, sms.content());
//!         }
//!         Some(InboundSms::Receipt(receipt)) => {
//!             println!("{} is {}", receipt.message_id, receipt.state);
//!         }
//!         None => { /* read deadline passed, keep polling */ }
//!     }
//! }
//! # }
//! ```
//!
//! # Concurrency
//!
//! A [`Client`] (and the [`session::Session`] under it) is **not** safe
//! for concurrent use. Every operation takes `&mut self`, owns the wire
//! until its response arrives, and handles whatever the SMSC interleaves
//! (keep-alive requests are auto-answered, deliveries are acknowledged
//! and queued for [`Client::read_sms`]). Keep one session on one task;
//! open multiple sessions for parallelism.
//!
//! # Errors
//!
//! [`SmppError`] separates fatal conditions (transport and framing
//! failures, protocol violations - the session is closed, reconnect and
//! rebind) from per-request failures ([`SmppError::SubmitFailed`] and
//! friends carry the SMSC's status code, the session stays bound) and
//! retryable timeouts.

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod error;
pub mod keepalive;
pub mod segmenter;
pub mod session;


pub use client::{BindCredentials, Client, ClientConfig, SmsMessage, SmsOptions};
pub use codec::{CodecError, Encodable, Pdu, PduHeader, MAX_PDU_SIZE};
pub use connection::Connection;
pub use datatypes::{
    Address, AddressError, BindMode, BindResponse, CommandId, CommandStatus, DataCoding,
    DeliveryReceipt, InboundSms, MessageState, QuerySmResponse, ReceiptState, ReceiptTime, Sms,
    SmppTime, Tlv,
};
pub use error::{SmppError, SmppResult};
pub use keepalive::{KeepAliveConfig, KeepAliveManager, KeepAliveStatus};
pub use segmenter::{CsmsMethod, Segment, SegmentError, Segmenter};
pub use session::{Session, SessionState};
