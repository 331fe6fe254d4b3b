//! Newtype IDs for type-safe entity references.
//!
//! Entities live in an external document store, so identifiers are opaque
//! strings rather than database sequence numbers. Use the `define_id!` macro
//! to create wrappers that prevent accidentally mixing IDs from different
//! entity types.

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`, `is_blank()`
/// - `From<String>`, `From<&str>` and `AsRef<str>` implementations
///
/// # Example
///
/// ```rust
/// # use hearth_core::define_id;
/// define_id!(BasketId);
/// define_id!(InvoiceId);
///
/// let basket = BasketId::new("b-1");
/// let invoice = InvoiceId::new("b-1");
///
/// // These are different types, so this won't compile:
/// // let _: BasketId = invoice;
/// assert_eq!(basket.as_str(), invoice.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(CustomOrderId);
