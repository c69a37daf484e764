//! Salt generation and synthetic identifier allocation.
//!
//! Every field gets `[<salt><n>]` and every worksheet `[<salt>sh<n>]`. The
//! salt is a run of random lowercase letters that does not occur in any raw
//! calculation, so a synthetic id can never be confused with text the user
//! wrote. The surrounding brackets make the ids prefix-disjoint: `[ab1]` is not
//! a substring of `[ab12]`.

use crate::constants::{MAX_SALT_ATTEMPTS, SHEET_ID_INFIX};
use crate::core::{FieldId, LineageError, SheetId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

/// Draw a salt of `length` lowercase letters that is not a substring of any
/// of `haystacks`.
///
/// Deterministic for a given `seed`: the same workbook and seed always yield
/// the same salt.
pub fn generate_salt<'a, I>(seed: u64, length: usize, haystacks: I) -> Result<String, LineageError>
where
    I: IntoIterator<Item = &'a str>,
{
    if length == 0 {
        return Err(LineageError::ConfigError {
            message: "salt length must be at least 1".to_string(),
        });
    }

    let haystacks: Vec<&str> = haystacks.into_iter().filter(|h| !h.is_empty()).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    for attempt in 1..=MAX_SALT_ATTEMPTS {
        let candidate: String =
            (0..length).map(|_| char::from(rng.gen_range(b'a'..=b'z'))).collect();

        if !haystacks.iter().any(|h| h.contains(candidate.as_str())) {
            debug!("Selected identifier salt '{}' after {} attempt(s)", candidate, attempt);
            return Ok(candidate);
        }
    }

    Err(LineageError::SaltExhausted {
        attempts: MAX_SALT_ATTEMPTS,
    })
}

/// Hands out field and sheet identifiers for one salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    salt: String,
}

impl IdAllocator {
    /// Create an allocator for an already-validated salt.
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
        }
    }

    /// The salt shared by every identifier of this run.
    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Identifier of the field at row `index`.
    #[must_use]
    pub fn field_id(&self, index: usize) -> FieldId {
        FieldId::new(format!("[{}{}]", self.salt, index))
    }

    /// Identifier of the sheet at position `index` of the sorted sheet list.
    #[must_use]
    pub fn sheet_id(&self, index: usize) -> SheetId {
        SheetId::new(format!("[{}{}{}]", self.salt, SHEET_ID_INFIX, index))
    }

    /// Check that no identifier is a substring of another.
    ///
    /// Well-formed ids (one bracket pair, no inner brackets) can only contain
    /// each other when equal, so those are checked for uniqueness; anything
    /// else is compared pairwise against the full set.
    pub fn verify_disjoint<'a, I>(ids: I) -> Result<(), LineageError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: Vec<&str> = ids.into_iter().collect();
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(ids.len());

        for (index, id) in ids.iter().enumerate() {
            if let Some(previous) = seen.insert(id, index) {
                return Err(LineageError::IdCollision {
                    first: ids[previous].to_string(),
                    second: (*id).to_string(),
                });
            }
        }

        for (index, id) in ids.iter().enumerate() {
            if is_well_formed(id) {
                continue;
            }
            for (other_index, other) in ids.iter().enumerate() {
                if index != other_index && (other.contains(id) || id.contains(other)) {
                    let (first, second) =
                        if id.len() <= other.len() { (id, other) } else { (other, id) };
                    return Err(LineageError::IdCollision {
                        first: (*first).to_string(),
                        second: (*second).to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn is_well_formed(id: &str) -> bool {
    id.len() > 2
        && id.starts_with('[')
        && id.ends_with(']')
        && !id[1..id.len() - 1].contains(['[', ']'])
}
