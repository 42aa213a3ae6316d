//! Log categories
//!
//! A category is a named channel used to group log messages. The set of
//! categories is closed and known when the logging service is built.

use std::fmt::Debug;
use std::hash::Hash;

/// A closed, enumerable set of log categories
///
/// Usually implemented through the [`categories!`](crate::categories) macro.
pub trait Category: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every category in the set
    fn all() -> &'static [Self];

    /// Short display name, used in formatted output and configuration
    fn name(&self) -> &'static str;

    /// Look up a category by its display name
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.name() == name)
    }
}

/// Declare a category enum and implement [`Category`] for it
///
/// ```
/// catlog::categories! {
///     pub enum Channel {
///         App => "app",
///         Net => "net",
///     }
/// }
///
/// use catlog::Category;
/// assert_eq!(Channel::Net.name(), "net");
/// assert_eq!(Channel::all().len(), 2);
/// ```
#[macro_export]
macro_rules! categories {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::Category for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::Category::name(self))
            }
        }
    };
}
