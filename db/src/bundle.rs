//! Deterministic hashing of definition bundles.
//!
//! A bundle hash is the SHA-256 hex digest of the canonical JSON encoding of
//! a package's definitions. Object keys are sorted during encoding, so the
//! hash does not depend on the key order of the source files.

use sha2::{Digest, Sha256};
use value_schema_core::{SchemaDefinition, SchemaPackage};

use crate::error::Result;

/// Computes the hash of `definitions`.
///
/// # Errors
///
/// Returns [`JsonError`](crate::DatabaseError::JsonError) if a definition
/// cannot be serialized.
///
/// # Examples
///
/// ```
/// use value_schema_core::{SchemaDefinition, number};
/// use value_schema_db::bundle_hash;
///
/// let definitions = vec![SchemaDefinition::new("port", &number().into())];
/// let hash = bundle_hash(&definitions).unwrap();
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, bundle_hash(&definitions).unwrap());
/// ```
pub fn bundle_hash(definitions: &[SchemaDefinition]) -> Result<String> {
    let canonical = serde_json::to_value(definitions)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Stores the hash of the package's definitions in `bundle_hash`.
///
/// # Errors
///
/// Returns [`JsonError`](crate::DatabaseError::JsonError) if a definition
/// cannot be serialized.
pub fn seal_package(package: &mut SchemaPackage) -> Result<()> {
    package.bundle_hash = Some(bundle_hash(&package.definitions)?);
    Ok(())
}

/// Checks the stored hash of `package`, if any, against its definitions.
///
/// Returns `Ok(false)` when the hashes differ and `Ok(true)` when they match
/// or no hash is stored.
///
/// # Errors
///
/// Returns [`JsonError`](crate::DatabaseError::JsonError) if a definition
/// cannot be serialized.
pub fn verify_package(package: &SchemaPackage) -> Result<bool> {
    match &package.bundle_hash {
        Some(expected) => Ok(*expected == bundle_hash(&package.definitions)?),
        None => Ok(true),
    }
}
