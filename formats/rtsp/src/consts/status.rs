//! @see: RFC 2326 Section 7.1.1 Status Code Definitions
use std::fmt::Display;

use crate::errors::RtspMessageError;

pub mod status_description {
    pub const CONTINUE: &str = "Continue";
    pub const OK: &str = "OK";
    pub const CREATED: &str = "Created";
    pub const LOW_ON_STORAGE_SPACE: &str = "Low on Storage Space";
    pub const MULTIPLE_CHOICES: &str = "Multiple Choices";
    pub const MOVED_PERMANENTLY: &str = "Moved Permanently";
    pub const MOVED_TEMPORARILY: &str = "Moved Temporarily";
    pub const SEE_OTHER: &str = "See Other";
    pub const NOT_MODIFIED: &str = "Not Modified";
    pub const USE_PROXY: &str = "Use Proxy";
    pub const BAD_REQUEST: &str = "Bad Request";
    pub const UNAUTHORIZED: &str = "Unauthorized";
    pub const PAYMENT_REQUIRED: &str = "Payment Required";
    pub const FORBIDDEN: &str = "Forbidden";
    pub const NOT_FOUND: &str = "Not Found";
    pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
    pub const NOT_ACCEPTABLE: &str = "Not Acceptable";
    pub const PROXY_AUTHENTICATION_REQUIRED: &str = "Proxy Authentication Required";
    pub const REQUEST_TIMEOUT: &str = "Request Time-out";
    pub const GONE: &str = "Gone";
    pub const LENGTH_REQUIRED: &str = "Length Required";
    pub const PRECONDITION_FAILED: &str = "Precondition Failed";
    pub const REQUEST_ENTITY_TOO_LARGE: &str = "Request Entity Too Large";
    pub const REQUEST_URI_TOO_LARGE: &str = "Request-URI Too Large";
    pub const UNSUPPORTED_MEDIA_TYPE: &str = "Unsupported Media Type";
    pub const PARAMETER_NOT_UNDERSTOOD: &str = "Parameter Not Understood";
    pub const CONFERENCE_NOT_FOUND: &str = "Conference Not Found";
    pub const NOT_ENOUGH_BANDWIDTH: &str = "Not Enough Bandwidth";
    pub const SESSION_NOT_FOUND: &str = "Session Not Found";
    pub const METHOD_NOT_VALID_IN_THIS_STATE: &str = "Method Not Valid in This State";
    pub const HEADER_FIELD_NOT_VALID_FOR_RESOURCE: &str = "Header Field Not Valid for Resource";
    pub const INVALID_RANGE: &str = "Invalid Range";
    pub const PARAMETER_IS_READ_ONLY: &str = "Parameter Is Read-Only";
    pub const AGGREGATE_OPERATION_NOT_ALLOWED: &str = "Aggregate operation not allowed";
    pub const ONLY_AGGREGATE_OPERATION_ALLOWED: &str = "Only aggregate operation allowed";
    pub const UNSUPPORTED_TRANSPORT: &str = "Unsupported transport";
    pub const DESTINATION_UNREACHABLE: &str = "Destination unreachable";
    pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
    pub const NOT_IMPLEMENTED: &str = "Not Implemented";
    pub const BAD_GATEWAY: &str = "Bad Gateway";
    pub const SERVICE_UNAVAILABLE: &str = "Service Unavailable";
    pub const GATEWAY_TIMEOUT: &str = "Gateway Time-out";
    pub const RTSP_VERSION_NOT_SUPPORTED: &str = "RTSP Version not supported";
    pub const OPTION_NOT_SUPPORTED: &str = "Option not supported";
}

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtspStatus {
    Continue = 100,
    OK = 200,
    Created = 201,
    LowOnStorageSpace = 250,
    MultipleChoices = 300,
    MovedPermanently = 301,
    MovedTemporarily = 302,
    SeeOther = 303,
    NotModified = 304,
    UseProxy = 305,
    BadRequest = 400,
    Unauthorized = 401,
    PaymentRequired = 402,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    NotAcceptable = 406,
    ProxyAuthenticationRequired = 407,
    RequestTimeout = 408,
    Gone = 410,
    LengthRequired = 411,
    PreconditionFailed = 412,
    RequestEntityTooLarge = 413,
    RequestUriTooLarge = 414,
    UnsupportedMediaType = 415,
    ParameterNotUnderstood = 451,
    ConferenceNotFound = 452,
    NotEnoughBandwidth = 453,
    SessionNotFound = 454,
    MethodNotValidInThisState = 455,
    HeaderFieldNotValidForResource = 456,
    InvalidRange = 457,
    ParameterIsReadOnly = 458,
    AggregateOperationNotAllowed = 459,
    OnlyAggregateOperationAllowed = 460,
    UnsupportedTransport = 461,
    DestinationUnreachable = 462,
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
    GatewayTimeout = 504,
    RtspVersionNotSupported = 505,
    OptionNotSupported = 551,
}

impl From<RtspStatus> for u16 {
    fn from(value: RtspStatus) -> Self {
        value as u16
    }
}

impl TryFrom<u16> for RtspStatus {
    type Error = RtspMessageError;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            100 => Ok(Self::Continue),
            200 => Ok(Self::OK),
            201 => Ok(Self::Created),
            250 => Ok(Self::LowOnStorageSpace),
            300 => Ok(Self::MultipleChoices),
            301 => Ok(Self::MovedPermanently),
            302 => Ok(Self::MovedTemporarily),
            303 => Ok(Self::SeeOther),
            304 => Ok(Self::NotModified),
            305 => Ok(Self::UseProxy),
            400 => Ok(Self::BadRequest),
            401 => Ok(Self::Unauthorized),
            402 => Ok(Self::PaymentRequired),
            403 => Ok(Self::Forbidden),
            404 => Ok(Self::NotFound),
            405 => Ok(Self::MethodNotAllowed),
            406 => Ok(Self::NotAcceptable),
            407 => Ok(Self::ProxyAuthenticationRequired),
            408 => Ok(Self::RequestTimeout),
            410 => Ok(Self::Gone),
            411 => Ok(Self::LengthRequired),
            412 => Ok(Self::PreconditionFailed),
            413 => Ok(Self::RequestEntityTooLarge),
            414 => Ok(Self::RequestUriTooLarge),
            415 => Ok(Self::UnsupportedMediaType),
            451 => Ok(Self::ParameterNotUnderstood),
            452 => Ok(Self::ConferenceNotFound),
            453 => Ok(Self::NotEnoughBandwidth),
            454 => Ok(Self::SessionNotFound),
            455 => Ok(Self::MethodNotValidInThisState),
            456 => Ok(Self::HeaderFieldNotValidForResource),
            457 => Ok(Self::InvalidRange),
            458 => Ok(Self::ParameterIsReadOnly),
            459 => Ok(Self::AggregateOperationNotAllowed),
            460 => Ok(Self::OnlyAggregateOperationAllowed),
            461 => Ok(Self::UnsupportedTransport),
            462 => Ok(Self::DestinationUnreachable),
            500 => Ok(Self::InternalServerError),
            501 => Ok(Self::NotImplemented),
            502 => Ok(Self::BadGateway),
            503 => Ok(Self::ServiceUnavailable),
            504 => Ok(Self::GatewayTimeout),
            505 => Ok(Self::RtspVersionNotSupported),
            551 => Ok(Self::OptionNotSupported),
            _ => Err(RtspMessageError::UnknownStatusCode(Some(value))),
        }
    }
}

impl From<RtspStatus> for &'static str {
    fn from(val: RtspStatus) -> Self {
        match val {
            RtspStatus::Continue => status_description::CONTINUE,
            RtspStatus::OK => status_description::OK,
            RtspStatus::Created => status_description::CREATED,
            RtspStatus::LowOnStorageSpace => status_description::LOW_ON_STORAGE_SPACE,
            RtspStatus::MultipleChoices => status_description::MULTIPLE_CHOICES,
            RtspStatus::MovedPermanently => status_description::MOVED_PERMANENTLY,
            RtspStatus::MovedTemporarily => status_description::MOVED_TEMPORARILY,
            RtspStatus::SeeOther => status_description::SEE_OTHER,
            RtspStatus::NotModified => status_description::NOT_MODIFIED,
            RtspStatus::UseProxy => status_description::USE_PROXY,
            RtspStatus::BadRequest => status_description::BAD_REQUEST,
            RtspStatus::Unauthorized => status_description::UNAUTHORIZED,
            RtspStatus::PaymentRequired => status_description::PAYMENT_REQUIRED,
            RtspStatus::Forbidden => status_description::FORBIDDEN,
            RtspStatus::NotFound => status_description::NOT_FOUND,
            RtspStatus::MethodNotAllowed => status_description::METHOD_NOT_ALLOWED,
            RtspStatus::NotAcceptable => status_description::NOT_ACCEPTABLE,
            RtspStatus::ProxyAuthenticationRequired => {
                status_description::PROXY_AUTHENTICATION_REQUIRED
            }
            RtspStatus::RequestTimeout => status_description::REQUEST_TIMEOUT,
            RtspStatus::Gone => status_description::GONE,
            RtspStatus::LengthRequired => status_description::LENGTH_REQUIRED,
            RtspStatus::PreconditionFailed => status_description::PRECONDITION_FAILED,
            RtspStatus::RequestEntityTooLarge => status_description::REQUEST_ENTITY_TOO_LARGE,
            RtspStatus::RequestUriTooLarge => status_description::REQUEST_URI_TOO_LARGE,
            RtspStatus::UnsupportedMediaType => status_description::UNSUPPORTED_MEDIA_TYPE,
            RtspStatus::ParameterNotUnderstood => status_description::PARAMETER_NOT_UNDERSTOOD,
            RtspStatus::ConferenceNotFound => status_description::CONFERENCE_NOT_FOUND,
            RtspStatus::NotEnoughBandwidth => status_description::NOT_ENOUGH_BANDWIDTH,
            RtspStatus::SessionNotFound => status_description::SESSION_NOT_FOUND,
            RtspStatus::MethodNotValidInThisState => {
                status_description::METHOD_NOT_VALID_IN_THIS_STATE
            }
            RtspStatus::HeaderFieldNotValidForResource => {
                status_description::HEADER_FIELD_NOT_VALID_FOR_RESOURCE
            }
            RtspStatus::InvalidRange => status_description::INVALID_RANGE,
            RtspStatus::ParameterIsReadOnly => status_description::PARAMETER_IS_READ_ONLY,
            RtspStatus::AggregateOperationNotAllowed => {
                status_description::AGGREGATE_OPERATION_NOT_ALLOWED
            }
            RtspStatus::OnlyAggregateOperationAllowed => {
                status_description::ONLY_AGGREGATE_OPERATION_ALLOWED
            }
            RtspStatus::UnsupportedTransport => status_description::UNSUPPORTED_TRANSPORT,
            RtspStatus::DestinationUnreachable => status_description::DESTINATION_UNREACHABLE,
            RtspStatus::InternalServerError => status_description::INTERNAL_SERVER_ERROR,
            RtspStatus::NotImplemented => status_description::NOT_IMPLEMENTED,
            RtspStatus::BadGateway => status_description::BAD_GATEWAY,
            RtspStatus::ServiceUnavailable => status_description::SERVICE_UNAVAILABLE,
            RtspStatus::GatewayTimeout => status_description::GATEWAY_TIMEOUT,
            RtspStatus::RtspVersionNotSupported => status_description::RTSP_VERSION_NOT_SUPPORTED,
            RtspStatus::OptionNotSupported => status_description::OPTION_NOT_SUPPORTED,
        }
    }
}

impl Display for RtspStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description: &str = (*self).into();
        write!(f, "{} {}", Into::<u16>::into(*self), description)
    }
}
