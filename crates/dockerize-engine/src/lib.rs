pub mod client;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;
#[cfg(unix)]
pub mod unix;

pub use client::{ContainerId, EngineClient};
pub use endpoint::Endpoint;
pub use error::{EngineError, TransportError};
pub use http::HttpTransport;
pub use request::{RequestBody, RequestOptions, ResponseBody};
pub use transport::{EngineTransport, RemoteRequest, RemoteResponse, Transport};
#[cfg(unix)]
pub use unix::UnixSocketTransport;
