//! Canonical spellings from RFC 2326 Section 12.
pub const ACCEPT: &str = "Accept";
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
pub const ALLOW: &str = "Allow";
pub const AUTHORIZATION: &str = "Authorization";
pub const BANDWIDTH: &str = "Bandwidth";
pub const BLOCKSIZE: &str = "Blocksize";
pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONFERENCE: &str = "Conference";
pub const CONNECTION: &str = "Connection";
pub const CONTENT_BASE: &str = "Content-Base";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LANGUAGE: &str = "Content-Language";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_LOCATION: &str = "Content-Location";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const C_SEQ: &str = "CSeq";
pub const DATE: &str = "Date";
pub const EXPIRES: &str = "Expires";
pub const FROM: &str = "From";
pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";
pub const LAST_MODIFIED: &str = "Last-Modified";
pub const LOCATION: &str = "Location";
pub const PROXY_AUTHENTICATE: &str = "Proxy-Authenticate";
pub const PROXY_REQUIRE: &str = "Proxy-Require";
pub const PUBLIC: &str = "Public";
pub const RANGE: &str = "Range";
pub const REFERER: &str = "Referer";
pub const REQUIRE: &str = "Require";
pub const RETRY_AFTER: &str = "Retry-After";
pub const RTP_INFO: &str = "RTP-Info";
pub const SCALE: &str = "Scale";
pub const SERVER: &str = "Server";
pub const SESSION: &str = "Session";
pub const SPEED: &str = "Speed";
pub const TIMESTAMP: &str = "Timestamp";
pub const TRANSPORT: &str = "Transport";
pub const UNSUPPORTED: &str = "Unsupported";
pub const USER_AGENT: &str = "User-Agent";
pub const VARY: &str = "Vary";
pub const VIA: &str = "Via";
pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";
