use serde::{Deserialize, Serialize};

use super::id_macro::impl_id;

/// Identifier of a persisted activity binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

/// Identifier of the per-space active activity row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveActivityId(String);

impl_id!(BindingId, ActiveActivityId);
