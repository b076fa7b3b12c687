use core::fmt;

/// Declares a string-keyed name type.
///
/// Engine entities (wells, joints, pipes) are addressed by the names the
/// network model uses, so identifiers stay strings; the newtype keeps a well
/// name from being passed where a joint name is expected.
macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

name_type!(
    /// Well name as used in the well model and the network model.
    WellName
);
name_type!(
    /// Network junction (manifold node) name.
    JointName
);
name_type!(
    /// Network pipe segment name.
    PipeName
);
name_type!(
    /// Physical or commingled flowline identity.
    FlowlineName
);
name_type!(
    /// Historian tag name.
    TagName
);
