// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report identifier generation.
//!
//! Each symbol comes from a cryptographically secure RNG. Identifiers never
//! depend on the payload or the clock, so they cannot be enumerated.

use rand::Rng;

use crate::types::{ReportId, ID_ALPHABET, ID_LENGTH};

/// Produces fresh report identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> ReportId;
}

/// Uniform draws over `ID_ALPHABET` from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> ReportId {
        let mut rng = rand::thread_rng();
        let symbols = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        ReportId::from_symbols(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_have_expected_shape() {
        let gen = RandomIdGenerator;
        for _ in 0..1000 {
            let id = gen.generate();
            assert_eq!(id.as_str().len(), ID_LENGTH);
            assert!(ReportId::parse(id.as_str()).is_some(), "bad id {}", id);
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let gen = RandomIdGenerator;
        let ids: HashSet<_> = (0..10_000).map(|_| gen.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_every_symbol_is_reachable() {
        let gen = RandomIdGenerator;
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            seen.extend(gen.generate().as_str().bytes());
        }
        assert_eq!(seen.len(), ID_ALPHABET.len());
    }
}
