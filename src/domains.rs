//! Certificate common names versus the app's registered domains.
//!
//! The upload flow needs to know which of a certificate's common names are
//! already routed by a domain entry, which still need one, and which of the
//! missing ones the operator actually wants registered.

use inquire::MultiSelect;

use crate::api::ApiError;
use crate::api::types::Domain;
use crate::render;

/// True when a registered hostname covers a certificate common name.
///
/// Names compare case-insensitively with trailing dots ignored. A wildcard
/// domain entry covers exactly one label: `*.x.y` covers `a.x.y` and the
/// literal `*.x.y`, never `x.y` or `a.b.x.y`.
fn hostname_covers(hostname: &str, cert_domain: &str) -> bool {
    let hostname = normalize(hostname);
    let cert_domain = normalize(cert_domain);
    if hostname == cert_domain {
        return true;
    }
    if let Some(parent) = hostname.strip_prefix("*.") {
        if let Some((label, rest)) = cert_domain.split_once('.') {
            return !label.is_empty() && rest == parent;
        }
    }
    false
}

fn normalize(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

/// Whether any registered domain already covers the common name.
pub fn is_registered(cert_domain: &str, registered: &[Domain]) -> bool {
    registered
        .iter()
        .any(|domain| hostname_covers(&domain.hostname, cert_domain))
}

/// Common names partitioned against the app's registered domains.
#[derive(Debug, Default)]
pub struct Buckets {
    pub existing: Vec<String>,
    pub new: Vec<String>,
}

pub fn split_by_registration(cert_domains: &[String], registered: &[Domain]) -> Buckets {
    let mut buckets = Buckets::default();
    for name in cert_domains {
        if is_registered(name, registered) {
            buckets.existing.push(name.clone());
        } else {
            buckets.new.push(name.clone());
        }
    }
    buckets
}

/// Parse a `--domains` value into the names to register: drop names that
/// already have a domain entry, then split off the names the certificate
/// does not actually list. Order preserved, no dedup. The second list is
/// the unlisted names, one entry per dropped occurrence; callers warn about
/// each.
pub fn flag_choices(
    raw: &str,
    cert_domains: &[String],
    existing: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut choices = Vec::new();
    let mut unlisted = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if existing.iter().any(|existing| existing == name) {
            continue;
        }
        if !cert_domains.iter().any(|cert_domain| cert_domain == name) {
            unlisted.push(name.to_string());
            continue;
        }
        choices.push(name.to_string());
    }
    (choices, unlisted)
}

/// Resolve the names to register, either from the flag value or by prompting
/// over the not-yet-registered common names. No new names means no prompt.
pub fn choose(
    flag: Option<&str>,
    cert_domains: &[String],
    buckets: &Buckets,
) -> anyhow::Result<Vec<String>> {
    if buckets.new.is_empty() {
        return Ok(Vec::new());
    }
    match flag {
        Some(raw) => {
            let (choices, unlisted) = flag_choices(raw, cert_domains, &buckets.existing);
            for name in &unlisted {
                render::warn(&format!(
                    "Not adding {name} because it is not listed in the certificate"
                ));
            }
            Ok(choices)
        }
        None => {
            let picked =
                MultiSelect::new("Select domains you would like to add", buckets.new.clone())
                    .prompt()?;
            Ok(picked)
        }
    }
}

/// One domain-creation attempt.
#[derive(Debug)]
pub enum DomainOutcome {
    Added(Domain),
    Failed { hostname: String, error: ApiError },
}

/// Results of a concurrent registration batch. A failed member marks the
/// batch failed without discarding the members that went through.
#[derive(Debug, Default)]
pub struct DomainBatch {
    outcomes: Vec<DomainOutcome>,
}

impl DomainBatch {
    pub fn new(outcomes: Vec<DomainOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn added(&self) -> Vec<&Domain> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DomainOutcome::Added(domain) => Some(domain),
                DomainOutcome::Failed { .. } => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &ApiError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DomainOutcome::Added(_) => None,
                DomainOutcome::Failed { hostname, error } => Some((hostname.as_str(), error)),
            })
            .collect()
    }

    pub fn has_failed(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, DomainOutcome::Failed { .. }))
    }
}

/// DNS record type to document for a hostname: apex names (nothing below the
/// registrable domain) need ALIAS/ANAME, anything deeper takes a CNAME.
/// Wildcards are never apex.
pub fn dns_record_type(hostname: &str) -> &'static str {
    if hostname.contains('*') {
        return "CNAME";
    }
    match psl::domain_str(hostname) {
        Some(apex) if apex == hostname => "ALIAS/ANAME",
        Some(_) => "CNAME",
        None => "ALIAS/ANAME",
    }
}
