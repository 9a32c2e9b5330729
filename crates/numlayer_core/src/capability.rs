//! Capability layers a numeric provider can claim.
//!
//! Layers form a single-rooted chain: `Ordering` < `Enumeration` < `Num`,
//! which then forks into `Integral` on one side and
//! `Fractional` < `Floating` < `RealFrac` < `RealFloat` on the other.
//! `Bounded` stands alone and only says that `min_value`/`max_value` exist.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Ordering,
    Enumeration,
    Num,
    Integral,
    Fractional,
    Floating,
    RealFrac,
    RealFloat,
    Bounded,
}

impl Capability {
    pub const ALL: [Capability; 9] = [
        Capability::Ordering,
        Capability::Enumeration,
        Capability::Num,
        Capability::Integral,
        Capability::Fractional,
        Capability::Floating,
        Capability::RealFrac,
        Capability::RealFloat,
        Capability::Bounded,
    ];

    /// The layer this one is built on, if any.
    pub fn parent(self) -> Option<Capability> {
        match self {
            Capability::Ordering | Capability::Bounded => None,
            Capability::Enumeration => Some(Capability::Ordering),
            Capability::Num => Some(Capability::Enumeration),
            Capability::Integral | Capability::Fractional => Some(Capability::Num),
            Capability::Floating => Some(Capability::Fractional),
            Capability::RealFrac => Some(Capability::Floating),
            Capability::RealFloat => Some(Capability::RealFrac),
        }
    }

    fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Ordering => "ordering",
            Capability::Enumeration => "enumeration",
            Capability::Num => "num",
            Capability::Integral => "integral",
            Capability::Fractional => "fractional",
            Capability::Floating => "floating",
            Capability::RealFrac => "real-frac",
            Capability::RealFloat => "real-float",
            Capability::Bounded => "bounded",
        };
        f.write_str(name)
    }
}

/// A set of capability layers, always closed over parents: claiming
/// `Integral` also claims `Num`, `Enumeration` and `Ordering`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capabilities(u16);

impl Capabilities {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn of(layers: &[Capability]) -> Self {
        layers
            .iter()
            .fold(Self::empty(), |set, &layer| set.with(layer))
    }

    /// Adds `layer` and every layer beneath it.
    pub fn with(self, layer: Capability) -> Self {
        let mut bits = self.0;
        let mut current = Some(layer);
        while let Some(layer) = current {
            bits |= layer.bit();
            current = layer.parent();
        }
        Self(bits)
    }

    pub fn contains(self, layer: Capability) -> bool {
        self.0 & layer.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL
            .into_iter()
            .filter(move |layer| self.contains(*layer))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
