//! SensorName - cheap-to-clone sensor identity.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Sensor name shared between the registry, the delivery callbacks and snapshots.
///
/// Backed by `Arc<str>`: names are fixed at attach time and cloned into every
/// callback and snapshot afterwards.
///
/// ```
/// use contracts::SensorName;
///
/// let front: SensorName = "front".into();
/// assert_eq!(front, "front");
/// assert_eq!(front.clone().as_str(), "front");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SensorName(Arc<str>);

impl SensorName {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SensorName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SensorName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets `HashMap<SensorName, _>` be queried with `&str`.
impl Borrow<str> for SensorName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SensorName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<SensorName> for String {
    fn from(name: SensorName) -> Self {
        name.0.to_string()
    }
}

impl fmt::Display for SensorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SensorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorName({:?})", &*self.0)
    }
}

impl PartialEq<str> for SensorName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SensorName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
