use std::io;

pub mod dynamic_sized_packet;
pub mod reader;

/// Serialization counterpart of the reader traits: a value writes its
/// wire form into any `io::Write` sink.
pub trait WriteTo<W: io::Write>: Sized {
    type Error;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error>;
}
