//! Newtype keys for type-safe entity references.
//!
//! The store API identifies entities by opaque strings. Use the `define_key!`
//! macro to create wrappers that prevent mixing an item key with a collection
//! tag or any other string.

/// Macro to define a type-safe, string-backed key wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`, `Default`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>`, `AsRef<str>` and `Display`
///
/// # Example
///
/// ```rust
/// # use souq_core::define_key;
/// define_key!(ProductKey);
/// define_key!(BrandKey);
///
/// let product = ProductKey::new("a1b2");
/// let brand = BrandKey::new("a1b2");
///
/// // These are different types, so this won't compile:
/// // let _: ProductKey = brand;
/// assert_eq!(product.as_str(), brand.as_str());
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key from any string-like value.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Get the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(key: String) -> Self {
                Self(key)
            }
        }

        impl From<&str> for $name {
            fn from(key: &str) -> Self {
                Self(key.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Catalog identifiers
define_key!(ItemUuid);
define_key!(CollectionName);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let uuid = ItemUuid::new("c0ffee");
        assert_eq!(serde_json::to_string(&uuid).unwrap(), "\"c0ffee\"");

        let parsed: ItemUuid = serde_json::from_str("\"c0ffee\"").unwrap();
        assert_eq!(parsed, uuid);
    }

    #[test]
    fn test_display_and_conversions() {
        let collection = CollectionName::from("Bakery");
        assert_eq!(collection.to_string(), "Bakery");
        assert_eq!(collection.as_ref(), "Bakery");
        assert_eq!(collection.into_inner(), "Bakery".to_string());
    }
}
