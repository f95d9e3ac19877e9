//! Canonical definition/instance addresses.
//!
//! Canonical form: `(module.<name>:)* <type>.<name> ([count=<int>] | [for_each=<string>])?`.
//! Terraform-style `[0]` / `["prod"]` spellings normalize into and out
//! of this form; the normalized string is the only identity used
//! downstream (spec §3, §6).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An expansion key distinguishing one instance of a definition from
/// its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpansionKey {
    /// No `count`/`for_each` on the definition; exactly one instance.
    None,
    /// `count = N`, this instance's integer index.
    Count(u64),
    /// `for_each`, this instance's string key.
    ForEach(String),
    /// Unknown cardinality: one placeholder instance stands in for
    /// however many would exist at apply time.
    Symbolic,
}

impl fmt::Display for ExpansionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionKey::None => Ok(()),
            ExpansionKey::Count(n) => write!(f, "[count={n}]"),
            ExpansionKey::ForEach(k) => write!(f, "[for_each={k}]"),
            ExpansionKey::Symbolic => write!(f, "[symbolic]"),
        }
    }
}

/// The static resource block as written, e.g. `aws_instance.web` or
/// `module.app:aws_instance.web`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionAddress {
    module_path: Vec<String>,
    resource_type: String,
    resource_name: String,
}

impl DefinitionAddress {
    pub fn new(
        module_path: Vec<String>,
        resource_type: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            module_path,
            resource_type: resource_type.into(),
            resource_name: resource_name.into(),
        }
    }

    pub fn module_path(&self) -> &[String] {
        &self.module_path
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Parse a canonical or Terraform-style address with no expansion
    /// suffix (a pure definition address).
    pub fn parse(s: &str) -> Result<Self> {
        let canonical = CanonicalAddress::parse(s)?;
        Ok(canonical.definition)
    }

    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for m in &self.module_path {
            out.push_str("module.");
            out.push_str(m);
            out.push(':');
        }
        out.push_str(&self.resource_type);
        out.push('.');
        out.push_str(&self.resource_name);
        out
    }
}

impl fmt::Display for DefinitionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// One expanded copy of a [`DefinitionAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceAddress {
    definition: DefinitionAddress,
    key: ExpansionKey,
}

impl InstanceAddress {
    pub fn new(definition: DefinitionAddress, key: ExpansionKey) -> Self {
        Self { definition, key }
    }

    pub fn definition(&self) -> &DefinitionAddress {
        &self.definition
    }

    pub fn key(&self) -> &ExpansionKey {
        &self.key
    }

    pub fn parse(s: &str) -> Result<Self> {
        let canonical = CanonicalAddress::parse(s)?;
        Ok(Self {
            definition: canonical.definition,
            key: canonical.key,
        })
    }

    pub fn canonical(&self) -> String {
        format!("{}{}", self.definition.canonical(), self.key)
    }

    /// A stable 16-hex-digit identity derived from the canonical
    /// address (spec §3: "instance IDs are a 16-hex-digit truncated
    /// hash of canonical address").
    pub fn instance_id(&self) -> String {
        let digest = blake3::hash(self.canonical().as_bytes());
        hex::encode(&digest.as_bytes()[..8])
    }
}

impl fmt::Display for InstanceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

struct CanonicalAddress {
    definition: DefinitionAddress,
    key: ExpansionKey,
}

impl CanonicalAddress {
    fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress(s.to_string()));
        }

        // Split off a trailing `[...]` suffix, if present.
        let (body, suffix) = match s.find('[') {
            Some(idx) => {
                if !s.ends_with(']') {
                    return Err(Error::InvalidAddress(s.to_string()));
                }
                (&s[..idx], Some(&s[idx + 1..s.len() - 1]))
            }
            None => (s, None),
        };

        let mut segments: Vec<&str> = body.split(':').collect();
        let last = segments
            .pop()
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;

        let mut module_path = Vec::new();
        for seg in segments {
            let rest = seg
                .strip_prefix("module.")
                .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
            if rest.is_empty() {
                return Err(Error::InvalidAddress(s.to_string()));
            }
            module_path.push(rest.to_string());
        }

        let mut parts = last.splitn(2, '.');
        let resource_type = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
        let resource_name = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;

        let key = match suffix {
            None => ExpansionKey::None,
            Some(raw) => parse_expansion_suffix(raw, s)?,
        };

        Ok(CanonicalAddress {
            definition: DefinitionAddress::new(module_path, resource_type, resource_name),
            key,
        })
    }
}

/// Parses either canonical (`count=0`, `for_each=prod`) or
/// Terraform-style (`0`, `"prod"`) bracket contents.
fn parse_expansion_suffix(raw: &str, original: &str) -> Result<ExpansionKey> {
    if let Some(rest) = raw.strip_prefix("count=") {
        let n: u64 = rest
            .parse()
            .map_err(|_| Error::InvalidAddress(original.to_string()))?;
        return Ok(ExpansionKey::Count(n));
    }
    if let Some(rest) = raw.strip_prefix("for_each=") {
        return Ok(ExpansionKey::ForEach(rest.to_string()));
    }
    if raw == "symbolic" {
        return Ok(ExpansionKey::Symbolic);
    }
    // Terraform-style: bare integer, or a quoted string.
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(ExpansionKey::Count(n));
    }
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return Ok(ExpansionKey::ForEach(raw[1..raw.len() - 1].to_string()));
    }
    Err(Error::InvalidAddress(original.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plain_resource() {
        let addr = InstanceAddress::parse("aws_instance.web").unwrap();
        assert_eq!(addr.canonical(), "aws_instance.web");
        assert_eq!(addr.key(), &ExpansionKey::None);
    }

    #[test]
    fn round_trips_canonical_count() {
        let addr = InstanceAddress::parse("aws_instance.web[count=2]").unwrap();
        assert_eq!(addr.canonical(), "aws_instance.web[count=2]");
    }

    #[test]
    fn normalizes_terraform_style_count() {
        let addr = InstanceAddress::parse("aws_instance.web[2]").unwrap();
        assert_eq!(addr.canonical(), "aws_instance.web[count=2]");
    }

    #[test]
    fn normalizes_terraform_style_for_each() {
        let addr = InstanceAddress::parse(r#"aws_instance.web["prod"]"#).unwrap();
        assert_eq!(addr.canonical(), "aws_instance.web[for_each=prod]");
    }

    #[test]
    fn round_trips_module_path() {
        let addr = InstanceAddress::parse("module.app:aws_instance.web[for_each=prod]").unwrap();
        assert_eq!(addr.definition().module_path(), &["app".to_string()]);
        assert_eq!(addr.canonical(), "module.app:aws_instance.web[for_each=prod]");
    }

    #[test]
    fn rejects_malformed_address() {
        assert!(InstanceAddress::parse("").is_err());
        assert!(InstanceAddress::parse("aws_instance").is_err());
        assert!(InstanceAddress::parse("module.:aws_instance.web").is_err());
    }

    #[test]
    fn instance_id_is_stable_hash() {
        let a = InstanceAddress::parse("aws_instance.web[count=0]").unwrap();
        let b = InstanceAddress::parse("aws_instance.web[0]").unwrap();
        assert_eq!(a.instance_id(), b.instance_id());
        assert_eq!(a.instance_id().len(), 16);
    }

    proptest::proptest! {
        #[test]
        fn parse_then_serialize_then_parse_is_idempotent(
            ty in "[a-z][a-z_]{2,10}",
            name in "[a-z][a-z_]{2,10}",
            n in 0u64..1000,
        ) {
            let original = format!("{ty}.{name}[count={n}]");
            let parsed = InstanceAddress::parse(&original).unwrap();
            let reparsed = InstanceAddress::parse(&parsed.canonical()).unwrap();
            proptest::prop_assert_eq!(parsed.canonical(), reparsed.canonical());
        }
    }
}
