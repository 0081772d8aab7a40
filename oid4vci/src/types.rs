//! # Issuance Types
//!
//! Request, response, and metadata types for the pre-authorized issuance
//! flow.

mod credential;
mod credential_offer;
mod metadata;
mod token;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use self::credential::*;
pub use self::credential_offer::*;
pub use self::metadata::*;
pub use self::token::*;

/// The holder claims returned by the [`Subject`] provider for one
/// credential configuration.
///
/// [`Subject`]: crate::provider::Subject
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Dataset {
    /// The credential configuration this dataset is for.
    pub credential_configuration_id: String,

    /// The credential subject claims populated for the holder.
    pub claims: Map<String, Value>,
}
