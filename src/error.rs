use core::fmt::Debug;
use core::fmt::Display;

/// Failures a tool call can end with. Everything else degrades to a best-effort value.
pub enum Error {
    /// Missing or structurally invalid call arguments.
    Input(String),
    /// DNS, connect, TLS, timeout or I/O failure while talking to the peer.
    Network { cause: &'static str, message: String },
    /// The peer answered with something that is not a usable HTTP response.
    Protocol(String),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Input(_) => "InputError",
            Error::Network { .. } => "NetworkError",
            Error::Protocol(_) => "ProtocolError",
        }
    }

    /// Classify a reqwest failure. Timeouts and connect failures are checked first since
    /// reqwest reports both through the same request error kind.
    pub(crate) fn from_reqwest(e: &reqwest::Error) -> Self {
        let message = error_chain(e);
        if e.is_builder() {
            Error::Input(message)
        } else if e.is_timeout() {
            Error::Network {
                cause: "Timeout",
                message,
            }
        } else if e.is_connect() {
            Error::Network {
                cause: "Connect",
                message,
            }
        } else if has_io_source(e) {
            Error::Network {
                cause: "Io",
                message,
            }
        } else {
            Error::Protocol(message)
        }
    }
}

fn error_chain(e: &dyn core::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

fn has_io_source(e: &reqwest::Error) -> bool {
    let mut source = core::error::Error::source(e);
    while let Some(inner) = source {
        if inner.is::<std::io::Error>() {
            return true;
        }
        source = inner.source();
    }
    false
}

impl core::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Input(s) | Error::Protocol(s) => write!(f, "{}: {s}", self.kind()),
            Error::Network { cause, message } => {
                write!(f, "{}: {cause}: {message}", self.kind())
            }
        }
    }
}
