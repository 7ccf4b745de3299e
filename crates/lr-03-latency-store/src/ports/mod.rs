//! # Ports
//!
//! - `inbound` - API offered to the consumer dispatcher
//! - `outbound` - Table backends the service writes through

pub mod inbound;
pub mod outbound;
