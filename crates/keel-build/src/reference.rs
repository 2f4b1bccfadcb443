//! Module reference kinds
//!
//! A reference kind is a pair of visibility bits. The private bit makes the
//! referenced module's interface visible to the referrer itself, the interface
//! bit re-exports it to everyone consuming the referrer. `Public` sets both.

use serde::{Deserialize, Serialize};

/// Visibility of a dependency edge between two modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Private = 1,
    Interface = 2,
    Public = 3,
}

impl ReferenceKind {
    const PRIVATE_BIT: u8 = 1 << 0;
    const INTERFACE_BIT: u8 = 1 << 1;

    /// All reference kinds, in declaration-list order
    pub const ALL: [ReferenceKind; 3] = [Self::Public, Self::Private, Self::Interface];

    /// Raw flag value
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Build a reference kind from raw flags; zero or unknown bits yield `None`
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(Self::Private),
            2 => Some(Self::Interface),
            3 => Some(Self::Public),
            _ => None,
        }
    }

    /// Whether properties flow into the referrer's private (compile) view
    pub fn is_private(self) -> bool {
        self.bits() & Self::PRIVATE_BIT != 0
    }

    /// Whether properties flow into the referrer's interface (export) view
    pub fn is_interface(self) -> bool {
        self.bits() & Self::INTERFACE_BIT != 0
    }

    /// Edge style used by graph visualizers
    pub fn dot_style(self) -> &'static str {
        match self {
            Self::Public => "solid",
            Self::Private => "dotted",
            Self::Interface => "dashed",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Private => write!(f, "private"),
            Self::Interface => write!(f, "interface"),
            Self::Public => write!(f, "public"),
        }
    }
}

/// Public, private and interface lists of one declared property.
///
/// Public entries land in both the private and the interface view of the
/// resolved module, private entries only in the private view and interface
/// entries only in the interface view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scoped<T = String> {
    pub public: Vec<T>,
    pub private: Vec<T>,
    pub interface: Vec<T>,
}

impl<T> Scoped<T> {
    /// Create empty lists
    pub fn new() -> Self {
        Self {
            public: Vec::new(),
            private: Vec::new(),
            interface: Vec::new(),
        }
    }

    /// The list holding entries of the given visibility
    pub fn list(&self, kind: ReferenceKind) -> &[T] {
        match kind {
            ReferenceKind::Public => &self.public,
            ReferenceKind::Private => &self.private,
            ReferenceKind::Interface => &self.interface,
        }
    }

    /// Mutable access to the list holding entries of the given visibility
    pub fn list_mut(&mut self, kind: ReferenceKind) -> &mut Vec<T> {
        match kind {
            ReferenceKind::Public => &mut self.public,
            ReferenceKind::Private => &mut self.private,
            ReferenceKind::Interface => &mut self.interface,
        }
    }

    /// Iterate entries tagged with their visibility: public, then private, then interface
    pub fn iter(&self) -> impl Iterator<Item = (ReferenceKind, &T)> {
        ReferenceKind::ALL
            .into_iter()
            .flat_map(move |kind| self.list(kind).iter().map(move |item| (kind, item)))
    }

    /// Total number of entries across all three lists
    pub fn len(&self) -> usize {
        self.public.len() + self.private.len() + self.interface.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_is_private_and_interface() {
        assert_eq!(
            ReferenceKind::Public.bits(),
            ReferenceKind::Private.bits() | ReferenceKind::Interface.bits()
        );
        assert!(ReferenceKind::Public.is_private());
        assert!(ReferenceKind::Public.is_interface());
        assert!(ReferenceKind::Private.is_private());
        assert!(!ReferenceKind::Private.is_interface());
        assert!(!ReferenceKind::Interface.is_private());
        assert!(ReferenceKind::Interface.is_interface());
    }

    #[test]
    fn test_from_bits_rejects_none() {
        assert_eq!(ReferenceKind::from_bits(0), None);
        assert_eq!(ReferenceKind::from_bits(4), None);
        for kind in ReferenceKind::ALL {
            assert_eq!(ReferenceKind::from_bits(kind.bits()), Some(kind));
        }
    }

    #[test]
    fn test_dot_styles() {
        assert_eq!(ReferenceKind::Public.dot_style(), "solid");
        assert_eq!(ReferenceKind::Private.dot_style(), "dotted");
        assert_eq!(ReferenceKind::Interface.dot_style(), "dashed");
    }

    #[test]
    fn test_scoped_iter_order() {
        let mut scoped = Scoped::new();
        scoped.private.push("b".to_string());
        scoped.public.push("a".to_string());
        scoped.list_mut(ReferenceKind::Interface).push("c".to_string());

        let tagged: Vec<_> = scoped.iter().map(|(k, v)| (k, v.as_str())).collect();
        assert_eq!(
            tagged,
            vec![
                (ReferenceKind::Public, "a"),
                (ReferenceKind::Private, "b"),
                (ReferenceKind::Interface, "c"),
            ]
        );
        assert_eq!(scoped.len(), 3);
        assert!(!scoped.is_empty());
    }

    #[test]
    fn test_scoped_deserializes_partial_lists() {
        let scoped: Scoped = serde_json::from_str(r#"{"public":["X=1"]}"#).unwrap();
        assert_eq!(scoped.public, vec!["X=1".to_string()]);
        assert!(scoped.private.is_empty());
        assert!(scoped.interface.is_empty());
    }
}
