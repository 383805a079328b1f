/// Minimal domain helpers shared by the extractors
pub struct DomainUtils;

impl DomainUtils {
    /// Domain part of an address: everything after the last '@'.
    /// Handles `Name <user@example.com>` by dropping the closing bracket.
    pub fn extract_domain(address: &str) -> Option<String> {
        let at_pos = address.rfind('@')?;
        let domain_part = &address[at_pos + 1..];
        let domain_part = match domain_part.find('>') {
            Some(end) => &domain_part[..end],
            None => domain_part,
        };
        Some(domain_part.trim().to_lowercase())
    }

    /// Check if domain ends with any suffix in the list
    pub fn has_suffix(domain: &str, suffixes: &[&str]) -> bool {
        suffixes.iter().any(|suffix| domain.ends_with(suffix))
    }

    /// Check if any entry of the list occurs anywhere in the domain
    pub fn contains_any(domain: &str, needles: &[&str]) -> bool {
        needles.iter().any(|needle| domain.contains(needle))
    }
}
