//! InterOps upstream clients.
//!
//! HTTP implementations of the collaborator traits in `interop-core`: the
//! `OpenEMR` password-grant token manager and the integration-engine gateway
//! that receives patient-discovery searches.

pub mod jwt;
pub mod mirth;
pub mod openemr_auth;

pub use jwt::decode_jwt;
pub use mirth::MirthPdGateway;
pub use openemr_auth::{OpenEmrCredentials, OpenEmrTokenManager};
