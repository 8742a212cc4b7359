//! The fixed set of record kinds sharing one index, and the registry that
//! maps each kind to its slice of the flat schema.
//!
//! On the wire every field is named `<kind>_<attribute>`. The registry
//! resolves that convention once, so the per-query path never parses
//! field names again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::identifier;

/// Header shared by every identifier in the knowledge base.
pub const IDENTIFIER_HEADER: &str = "PRT";

/// Attribute carrying the kind's unique key.
pub const IDENTIFIER_ATTRIBUTE: &str = "protrend_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organism,
    Gene,
    Regulator,
    Effector,
    Pathway,
    RegulatoryFamily,
}

impl EntityKind {
    /// All kinds, in response order.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Organism,
        EntityKind::Gene,
        EntityKind::Regulator,
        EntityKind::Effector,
        EntityKind::Pathway,
        EntityKind::RegulatoryFamily,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Organism => "organism",
            EntityKind::Gene => "gene",
            EntityKind::Regulator => "regulator",
            EntityKind::Effector => "effector",
            EntityKind::Pathway => "pathway",
            EntityKind::RegulatoryFamily => "regulatory_family",
        }
    }

    pub fn prefix(self) -> String {
        format!("{}_", self.name())
    }

    pub fn entity_code(self) -> &'static str {
        match self {
            EntityKind::Organism => "ORG",
            EntityKind::Gene => "GEN",
            EntityKind::Regulator => "REG",
            EntityKind::Effector => "EFC",
            EntityKind::Pathway => "PTH",
            EntityKind::RegulatoryFamily => "RFAM",
        }
    }

    /// Full identifier of the `n`-th record of this kind, e.g. `PRT.ORG.0000123`.
    pub fn identifier(self, n: u64) -> String {
        identifier::encode_parts(IDENTIFIER_HEADER, self.entity_code(), n)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::Operation(format!("unknown entity kind '{s}'")))
    }
}

/// One indexed field owned by a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindField {
    /// Name in the flat index schema (`gene_locus_tag`).
    pub indexed: String,
    /// Name with the kind prefix stripped exactly once (`locus_tag`).
    pub attribute: String,
}

#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    fields: [Vec<KindField>; 6],
    unassigned: Vec<String>,
}

impl KindRegistry {
    /// Resolve the prefix convention over a schema's field names.
    ///
    /// A field belongs to the kind with the longest matching prefix; names
    /// matching no prefix are kept aside in [`KindRegistry::unassigned`].
    pub fn from_field_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        for name in names {
            let name = name.as_ref();
            let owner = EntityKind::ALL
                .into_iter()
                .filter(|kind| name.starts_with(&kind.prefix()) && name.len() > kind.prefix().len())
                .max_by_key(|kind| kind.prefix().len());
            match owner {
                Some(kind) => registry.fields[slot(kind)].push(KindField {
                    indexed: name.to_string(),
                    attribute: name[kind.prefix().len()..].to_string(),
                }),
                None => {
                    tracing::warn!(field = name, "schema field has no entity kind prefix; ignored");
                    registry.unassigned.push(name.to_string());
                }
            }
        }
        registry
    }

    pub fn fields(&self, kind: EntityKind) -> &[KindField] {
        &self.fields[slot(kind)]
    }

    pub fn unassigned(&self) -> &[String] {
        &self.unassigned
    }
}

fn slot(kind: EntityKind) -> usize {
    EntityKind::ALL.iter().position(|k| *k == kind).unwrap_or_default()
}
