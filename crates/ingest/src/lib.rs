mod admission;
mod parser;
mod types;
mod writer;

pub use admission::apply_route_limit;
pub use parser::{parse_event, parse_tracking_payload, parse_ts};
pub use types::{AdmissionOutcome, IngestError, Result, ValidationError};
pub use writer::{DbEventSink, EventSink, EventWriter, WriteBatch};
