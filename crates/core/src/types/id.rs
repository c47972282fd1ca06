//! Newtype IDs for type-safe row references.
//!
//! Relational rows are keyed by SQLite `INTEGER PRIMARY KEY` values. Use the
//! `define_id!` macro to create wrappers that prevent mixing IDs from
//! different tables (a deal ID passed where a store ID is expected).

/// Macro to define a type-safe row ID wrapper.
///
/// Creates a newtype wrapper around `i64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`, `parse_key()`
/// - `From<i64>` and `Into<i64>` implementations
/// - a transparent `sqlx::Type` (with the `sqlite` feature)
///
/// # Example
///
/// ```rust
/// # use stores_deals_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::new(1);
/// let bin = BinId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// assert_eq!(shelf.as_i64(), bin.as_i64());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[cfg_attr(feature = "sqlite", derive(::sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID from an i64 value.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }

            /// Parse a document key (the decimal form used in JSON maps).
            ///
            /// Returns `None` for keys that are not plain integers, such as
            /// caller-chosen key-value identifiers like `"amazon"`.
            #[must_use]
            pub fn parse_key(key: &str) -> Option<Self> {
                key.trim().parse::<i64>().ok().map(Self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Row IDs for the relational schema
define_id!(StoreId);
define_id!(DealId);
define_id!(LinkCategoryId);
define_id!(FooterLinkId);
define_id!(AdminId);
