pub const CR: u8 = b'\r';
pub const LF: u8 = b'\n';
pub const SPACE: u8 = b' ';

pub const CRLF_STR: &str = "\r\n";
pub const SPACE_STR: &str = " ";
