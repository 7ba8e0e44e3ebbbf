//! Macro utilities for reducing enum boilerplate.
//!
//! Provides macros for delegating method calls to the variants of
//! `DependencyReference` and for wiring each variant struct into the enum.

/// Delegate a method call to all `DependencyReference` variants.
///
/// # Examples
///
/// ```ignore
/// impl DependencyReference {
///     pub fn name(&self) -> &str {
///         delegate_to_variants!(self, name)
///     }
/// }
/// ```
///
/// Expands to:
/// ```ignore
/// match self {
///     Self::Hosted(r) => r.name(),
///     Self::ThirdPartyHosted(r) => r.name(),
///     Self::Local(r) => r.name(),
///     Self::Git(r) => r.name(),
///     Self::Sdk(r) => r.name(),
/// }
/// ```
macro_rules! delegate_to_variants {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Hosted(r) => r.$method($($arg),*),
            Self::ThirdPartyHosted(r) => r.$method($($arg),*),
            Self::Local(r) => r.$method($($arg),*),
            Self::Git(r) => r.$method($($arg),*),
            Self::Sdk(r) => r.$method($($arg),*),
        }
    };
}

/// Implements `From<$ty> for DependencyReference` and `TypedReference` for a
/// variant struct.
macro_rules! impl_reference_variant {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for $crate::reference::DependencyReference {
            fn from(reference: $ty) -> Self {
                Self::$variant(reference)
            }
        }

        impl $crate::reference::TypedReference for $ty {
            const KIND: $crate::reference::ReferenceKind =
                $crate::reference::ReferenceKind::$variant;

            fn from_reference(reference: &$crate::reference::DependencyReference) -> Option<&Self> {
                match reference {
                    $crate::reference::DependencyReference::$variant(r) => Some(r),
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use delegate_to_variants;
pub(crate) use impl_reference_variant;
