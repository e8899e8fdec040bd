//! String-array attribute holding one ACL
//!
//! The attribute owns the rule storage and the flags the evaluator and the
//! surrounding object model read: whether a value was ever configured,
//! whether it changed since last saved, and a generation counter that moves
//! on every successful mutation. The external text form is a comma
//! separated list; newlines are accepted as separators on input.

use super::buffer::RuleBuffer;
use super::mutation;
use super::order::RuleOrder;
use super::rule::{AclType, BatchOp};
use crate::error::{AclError, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One ACL-valued attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "AttributeRepr", try_from = "AttributeRepr")]
pub struct AclAttribute {
    kind: Option<AclType>,
    order: RuleOrder,
    rules: Option<RuleBuffer>,
    set: bool,
    modified: bool,
    generation: u64,
    encoded: OnceLock<String>,
}

impl AclAttribute {
    /// Create an unset ACL attribute of the given type
    pub fn new(acl_type: AclType) -> Self {
        AclAttribute {
            kind: Some(acl_type),
            ..Self::with_order(acl_type.order())
        }
    }

    /// Create an unset string-array attribute sorted by `order`
    pub fn with_order(order: RuleOrder) -> Self {
        AclAttribute {
            kind: None,
            order,
            rules: None,
            set: false,
            modified: false,
            generation: 0,
            encoded: OnceLock::new(),
        }
    }

    /// Parse the external text form
    ///
    /// Entries are separated by `,` or newline and trimmed; empty entries
    /// are dropped. Text with no entries gives an unset attribute.
    ///
    /// # Examples
    ///
    /// ```
    /// use batch_acl::acl::{AclAttribute, AclType};
    ///
    /// let acl = AclAttribute::decode(AclType::Host, "*.example.com, -bad.example.com\n").unwrap();
    /// assert_eq!(acl.encode(), "-bad.example.com,*.example.com");
    ///
    /// assert!(!AclAttribute::decode(AclType::User, " , ").unwrap().is_set());
    /// ```
    pub fn decode(acl_type: AclType, text: &str) -> Result<Self> {
        let mut attr = Self::new(acl_type);
        let entries = split_entries(text);
        if !entries.is_empty() {
            attr.apply(BatchOp::Set, &entries)?;
        }
        Ok(attr)
    }

    /// Render rules comma-joined in stored order
    pub fn encode(&self) -> &str {
        self.encoded.get_or_init(|| match &self.rules {
            Some(rules) if self.set => rules.to_vec().join(","),
            _ => String::new(),
        })
    }

    /// Apply a mutation to the stored rules
    ///
    /// Storage is created on first use. On error every field, including the
    /// absence of storage, is left as it was.
    pub fn apply<S: AsRef<str>>(&mut self, op: BatchOp, incoming: &[S]) -> Result<()> {
        let mut created = None;
        let target = match self.rules.as_mut() {
            Some(rules) => rules,
            None => created.insert(RuleBuffer::new()),
        };
        mutation::apply(target, incoming, op, self.order)?;

        if let Some(rules) = created {
            self.rules = Some(rules);
        }
        self.post_set();
        Ok(())
    }

    /// Apply a mutation using the rules of another attribute
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `incoming` has no value.
    pub fn apply_attr(&mut self, op: BatchOp, incoming: &AclAttribute) -> Result<()> {
        if !incoming.is_set() {
            return Err(AclError::InvalidArgument(format!(
                "{} of an unset attribute",
                op
            )));
        }
        let rules: Vec<&str> = incoming.rules().into_iter().flatten().collect();
        self.apply(op, &rules)
    }

    fn post_set(&mut self) {
        self.set = true;
        self.modified = true;
        self.encoded = OnceLock::new();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Stored rules in order, or `None` if no storage exists
    pub fn rules(&self) -> Option<impl Iterator<Item = &str> + '_> {
        self.rules.as_ref().map(RuleBuffer::iter)
    }

    pub fn len(&self) -> usize {
        self.rules.as_ref().map_or(0, RuleBuffer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once a value has been configured
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// True if changed since the flag was last reset
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn reset_modified(&mut self) {
        self.modified = false;
    }

    /// Counter bumped by every successful mutation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// ACL type, or `None` for a generic string array
    pub fn acl_type(&self) -> Option<AclType> {
        self.kind
    }

    pub fn order(&self) -> RuleOrder {
        self.order
    }

    /// Check for a rule with exactly this text, prefix included
    pub fn contains(&self, rule: &str) -> bool {
        self.rules
            .as_ref()
            .is_some_and(|rules| rules.position(rule).is_some())
    }

    /// Release storage and clear the set flag
    pub fn clear(&mut self) {
        self.rules = None;
        self.set = false;
        self.modified = true;
        self.encoded = OnceLock::new();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PartialEq for AclAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.order == other.order
            && self.set == other.set
            && self.rules().into_iter().flatten().eq(other.rules().into_iter().flatten())
    }
}

impl Eq for AclAttribute {}

fn split_entries(text: &str) -> Vec<&str> {
    text.split([',', '\n'])
        .map(|entry| entry.trim_matches(|c: char| c.is_ascii_whitespace()))
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[derive(Serialize, Deserialize)]
struct AttributeRepr {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<AclType>,
    #[serde(default)]
    order: Option<RuleOrder>,
    rules: Option<Vec<String>>,
}

impl From<AclAttribute> for AttributeRepr {
    fn from(attr: AclAttribute) -> Self {
        let rules = if attr.set {
            Some(attr.rules.as_ref().map(RuleBuffer::to_vec).unwrap_or_default())
        } else {
            None
        };
        AttributeRepr {
            kind: attr.kind,
            order: Some(attr.order),
            rules,
        }
    }
}

impl TryFrom<AttributeRepr> for AclAttribute {
    type Error = AclError;

    fn try_from(repr: AttributeRepr) -> Result<Self> {
        // A typed attribute always sorts by its type's order
        let order = match (repr.kind, repr.order) {
            (Some(kind), Some(order)) if order != kind.order() => {
                return Err(AclError::InvalidArgument(format!(
                    "{} ACL cannot use {:?} order",
                    kind, order
                )));
            }
            (Some(kind), _) => kind.order(),
            (None, Some(order)) => order,
            (None, None) => {
                return Err(AclError::InvalidArgument(
                    "ACL needs a type or an order".to_string(),
                ));
            }
        };

        let mut attr = AclAttribute::with_order(order);
        attr.kind = repr.kind;
        if let Some(rules) = repr.rules {
            attr.apply(BatchOp::Set, &rules)?;
            attr.modified = false;
        }
        Ok(attr)
    }
}
