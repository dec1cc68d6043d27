use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::Resolver;

use super::{MxError, MxRecord, MxStatus};

/// Resolution seam. The verifier and the tests talk to this trait instead of
/// a concrete resolver.
pub trait LookupMx {
    /// Raw MX records for an ASCII domain. An empty vector means the domain
    /// exists but has no MX records.
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

/// Looks up MX records for `domain` through the system resolver.
///
/// The domain is IDNA-normalized before querying. Records come back sorted
/// by ascending priority with duplicates removed.
pub fn check_mx(domain: &str) -> Result<MxStatus, MxError> {
    let ascii = normalize_domain(domain)?;
    let resolver = Resolver::from_system_conf()
        .map_err(|source| MxError::ResolverInit { source })?;
    resolve_with(&resolver, &ascii)
}

pub(crate) fn resolve_with<R>(resolver: &R, ascii_domain: &str) -> Result<MxStatus, MxError>
where
    R: LookupMx + ?Sized,
{
    let mut records = resolver
        .lookup_mx(ascii_domain)
        .map_err(|source| MxError::Lookup { source })?;

    records.sort();
    records.dedup();

    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|source| MxError::Idna { source })
}

pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|mx| {
                    MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8()))
                })
                .collect()),
            // an NXDOMAIN / empty answer is a signal, not a failure
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                _ => Err(err),
            },
        }
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (self.on_lookup)(domain)
    }
}
