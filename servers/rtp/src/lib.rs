pub mod channel;
pub mod errors;
pub mod events;

pub use channel::{ChannelStatistics, RtpChannel, RtpChannelKind};
pub use errors::{RtpChannelError, RtpChannelResult};
pub use events::{RtpChannelEvent, is_rtcp_bye};
