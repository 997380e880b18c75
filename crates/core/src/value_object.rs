//! Value object trait: equality by value, not identity.
//!
//! Sale fields are plain values. A sale has no identity of its own once it has
//! been handed to the sinks, so everything in the domain layer is a value object.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Price(String);
///
/// impl ValueObject for Price {}
///
/// assert_eq!(Price("40".into()), Price("40".into()));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
