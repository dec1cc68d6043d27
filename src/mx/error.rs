use thiserror::Error;

/// Failures while resolving mail exchanges.
///
/// Only [`check_mx`](super::check_mx) callers ever see these; inside the
/// verification pipeline every variant degrades to `hasMx=false` instead of
/// aborting the request.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("cannot resolve MX records for an empty domain")]
    EmptyDomain,
    #[error("domain is not representable in ASCII (IDNA)")]
    Idna {
        #[source]
        source: idna::Errors,
    },
    #[error("system resolver unavailable: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("MX query failed: {source}")]
    Lookup {
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}
