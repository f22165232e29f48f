//! Akamai API access: edgerc credentials, EdgeGrid signing and HTTP transport

pub mod edgerc;
pub mod http;
pub mod signer;

pub use edgerc::{load_credentials, Credentials, EdgercError};
pub use http::{HttpResponse, Method, ReqwestTransport, SignedRequest, Transport};
pub use signer::EdgeGridSigner;
