//! Domain primitives for the recipe catalog.
//!
//! Ids are newtypes so a recipe id can never be passed where an account id is
//! expected. The relation types describe the three "toggle" join tables.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

entity_id!(
    /// Identifier of an account (recipe author, subscriber, cart owner).
    AccountId
);
entity_id!(
    /// Identifier of a published recipe.
    RecipeId
);
entity_id!(
    /// Identifier of an ingredient (a name under one measurement unit).
    IngredientId
);
entity_id!(TagId);

/// The requesting actor as resolved by the auth layer.
///
/// Catalog reads are public, so every read path accepts `Anonymous` and treats it
/// as "no viewer-relative state" rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Account(AccountId),
}

impl Viewer {
    #[must_use]
    pub const fn account_id(&self) -> Option<AccountId> {
        match self {
            Self::Anonymous => None,
            Self::Account(id) => Some(*id),
        }
    }
}

impl From<Option<AccountId>> for Viewer {
    fn from(id: Option<AccountId>) -> Self {
        id.map_or(Self::Anonymous, Self::Account)
    }
}

/// Which boolean-presence join table a toggle operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// user ↔ recipe, "marked as favorite"
    Favorite,
    /// user ↔ recipe, "added to the shopping cart"
    Cart,
    /// subscriber ↔ author
    Subscription,
}

impl RelationKind {
    /// Whether the target of the relation is a recipe (otherwise an account).
    #[must_use]
    pub const fn targets_recipe(&self) -> bool {
        matches!(self, Self::Favorite | Self::Cart)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Cart => "shopping_cart",
            Self::Subscription => "subscription",
        }
    }

    /// Message reported when `add` finds the row already present.
    #[must_use]
    pub const fn already_exists_message(&self) -> &'static str {
        match self {
            Self::Favorite => "recipe is already in favorites",
            Self::Cart => "recipe is already in the shopping cart",
            Self::Subscription => "already subscribed to this author",
        }
    }

    /// Message reported when `remove` finds nothing to delete.
    #[must_use]
    pub const fn not_present_message(&self) -> &'static str {
        match self {
            Self::Favorite => "recipe is not in favorites",
            Self::Cart => "recipe is not in the shopping cart",
            Self::Subscription => "not subscribed to this author",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an idempotent `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Created,
    AlreadyExists,
}

/// Result of an idempotent `remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_convert_and_display() {
        let id = RecipeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(RecipeId::from(42), id);
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&AccountId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AccountId::new(7));
    }

    #[test]
    fn viewer_from_optional_account() {
        assert_eq!(Viewer::from(None), Viewer::Anonymous);
        assert_eq!(
            Viewer::from(Some(AccountId::new(3))).account_id(),
            Some(AccountId::new(3))
        );
        assert_eq!(Viewer::Anonymous.account_id(), None);
    }

    #[test]
    fn relation_kind_targets() {
        assert!(RelationKind::Favorite.targets_recipe());
        assert!(RelationKind::Cart.targets_recipe());
        assert!(!RelationKind::Subscription.targets_recipe());
    }
}
