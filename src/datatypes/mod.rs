// ABOUTME: Field types and typed PDU models for the SMPP v3.4 subset this ESME speaks

mod address;
mod bind;
mod command_id;
mod command_status;
mod data_coding;
mod datetime;
mod deliver_sm;
mod delivery_receipt;
mod enquire_link;
mod generic_nack;
mod numeric_plan_indicator;
mod query_sm;
mod submit_sm;
mod tlv;
mod type_of_number;
mod unbind;

pub use address::{Address, AddressError, MAX_ALPHANUMERIC_LEN, MAX_NUMERIC_LEN};
pub use bind::{Bind, BindMode, BindResponse, INTERFACE_VERSION};
pub use command_id::{CommandId, RESPONSE_BIT};
pub use command_status::CommandStatus;
pub use data_coding::DataCoding;
pub use datetime::{SmppTime, TimeFormatError};
pub use deliver_sm::{DeliverSmResponse, InboundSms, Sms};
pub use delivery_receipt::{DeliveryReceipt, ReceiptState, ReceiptTime};
pub use enquire_link::{EnquireLink, EnquireLinkResponse};
pub use generic_nack::GenericNack;
pub use numeric_plan_indicator::NumericPlanIndicator;
pub use query_sm::{MessageState, QuerySm, QuerySmResponse};
pub use submit_sm::{SubmitSm, SubmitSmResponse};
pub use tlv::{tags, Tlv};
pub use type_of_number::TypeOfNumber;
pub use unbind::{Unbind, UnbindResponse};

/// esm_class bit marking a deliver_sm as a delivery receipt (Section 5.2.12).
pub const ESM_CLASS_RECEIPT: u8 = 0x04;

/// esm_class bit announcing a User Data Header in short_message (UDHI).
pub const ESM_CLASS_UDHI: u8 = 0x40;
