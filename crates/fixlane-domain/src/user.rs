//! User capability types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// A single capability a user may hold. A user may hold several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Provider,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Provider, Role::Admin];

    fn bit(self) -> u8 {
        match self {
            Self::Owner => 0b001,
            Self::Provider => 0b010,
            Self::Admin => 0b100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Provider => "provider",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "provider" => Ok(Self::Provider),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

/// Capability set held by a user.
///
/// Stored as a bitmask (`i16` column). Wire format is a list of role names,
/// header format is a comma-separated list (`owner,provider`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    /// Build from a stored bitmask. Returns `None` when unknown bits are set.
    pub fn from_bits(bits: u8) -> Option<Self> {
        if bits & !0b111 != 0 {
            return None;
        }
        Some(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_owner(self) -> bool {
        self.contains(Role::Owner)
    }

    pub fn is_provider(self) -> bool {
        self.contains(Role::Provider)
    }

    pub fn is_admin(self) -> bool {
        self.contains(Role::Admin)
    }

    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    /// Pick the lens a listing should be served through.
    ///
    /// An explicit request is honoured only when the caller holds that
    /// capability. Without one, provider wins over owner.
    pub fn lens(self, requested: Option<Lens>) -> Lens {
        match requested {
            Some(Lens::Owner) => Lens::Owner,
            Some(Lens::Provider) if self.is_provider() => Lens::Provider,
            Some(Lens::Provider) => Lens::Owner,
            None if self.is_provider() => Lens::Provider,
            None => Lens::Owner,
        }
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, RoleSet::with)
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Role::as_str).collect();
        f.write_str(&names.join(","))
    }
}

impl FromStr for RoleSet {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Role::from_str)
            .collect()
    }
}

impl Serialize for RoleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let roles = Vec::<Role>::deserialize(deserializer)?;
        Ok(roles.into_iter().collect())
    }
}

/// Which side of the marketplace a listing is served for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    Owner,
    Provider,
}
