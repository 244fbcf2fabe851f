//! Member identity hashing.
//!
//! Methods, constructors and fields are indexed by a 64-bit identity computed from their name and
//! descriptor. Two members share an identity exactly when they occupy the same override slot: a
//! subclass method `toString()Ljava/lang/String;` hashes to the same value as the one declared on
//! `java.lang.Object`, which is what makes hierarchy lookups by hash work.
//!
//! The hash mixes the raw UTF-8 bytes with FNV-1a and finishes with an avalanche step. It does
//! not depend on [`std::hash::DefaultHasher`], so values are stable across processes and
//! toolchains.
//!
//! # Example Usage
//!
//! ```rust
//! use classscope::metadata::hash::MemberHash;
//!
//! let a = MemberHash::of("toString", "()Ljava/lang/String;");
//! let b = MemberHash::new()
//!     .add_str("toString")
//!     .add_separator()
//!     .add_str("()Ljava/lang/String;")
//!     .finalize();
//! assert_eq!(a, b);
//! ```

/// Never produced by UTF-8 encoding, so it cannot be confused with name or descriptor bytes
const SEPARATOR: u8 = 0xFF;

/// Incremental builder for member identity hashes
pub struct MemberHash {
    /// Current FNV-1a state
    state: u64,
}

impl MemberHash {
    /// Create a new hash builder seeded with the FNV-1a offset basis
    #[must_use]
    pub fn new() -> Self {
        MemberHash {
            state: 0xcbf2_9ce4_8422_2325_u64, // FNV-1a 64-bit offset basis
        }
    }

    /// Identity of the member `name` with descriptor `descriptor`
    #[must_use]
    pub fn of(name: &str, descriptor: &str) -> u64 {
        Self::new()
            .add_str(name)
            .add_separator()
            .add_str(descriptor)
            .finalize()
    }

    /// Mix raw bytes into the state
    #[must_use]
    pub fn add_bytes(mut self, bytes: &[u8]) -> Self {
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(0x0100_0000_01b3_u64); // FNV-1a 64-bit prime
        }
        self
    }

    /// Mix the UTF-8 bytes of a string into the state
    #[must_use]
    pub fn add_str(self, value: &str) -> Self {
        self.add_bytes(value.as_bytes())
    }

    /// Mix a separator so that `("ab", "c")` and `("a", "bc")` hash differently
    #[must_use]
    pub fn add_separator(self) -> Self {
        self.add_bytes(&[SEPARATOR])
    }

    /// Apply the final avalanche and return the hash
    #[must_use]
    pub fn finalize(self) -> u64 {
        let mut state = self.state;
        state ^= state >> 33;
        state = state.wrapping_mul(0xff51_afd7_ed55_8ccd_u64);
        state ^= state >> 33;
        state = state.wrapping_mul(0xc4ce_b9fe_1a85_ec53_u64);
        state ^= state >> 33;
        state
    }
}

impl Default for MemberHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(MemberHash::of("f", "()V"), MemberHash::of("f", "()V"));
    }

    #[test]
    fn known_values_are_stable() {
        assert_eq!(MemberHash::of("f", "()V"), 0x0ad4_b329_ac76_97fe);
        assert_eq!(
            MemberHash::of("toString", "()Ljava/lang/String;"),
            0x13e1_9a91_5009_34ef
        );
        assert_eq!(MemberHash::of("<init>", "()V"), 0xfcc7_a37c_2aef_d05a);
    }

    #[test]
    fn fnv_core_matches_reference_vector() {
        let state = MemberHash::new().add_bytes(b"a").state;
        assert_eq!(state, 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn name_and_descriptor_both_count() {
        let base = MemberHash::of("f", "()V");
        assert_ne!(base, MemberHash::of("g", "()V"));
        assert_ne!(base, MemberHash::of("f", "(I)V"));
        assert_ne!(MemberHash::of("ab", "c"), MemberHash::of("a", "bc"));
        assert_ne!(MemberHash::of("x", "I"), MemberHash::of("x", "J"));
    }

    #[test]
    fn common_members_do_not_collide() {
        let members = [
            ("<init>", "()V"),
            ("<init>", "(I)V"),
            ("toString", "()Ljava/lang/String;"),
            ("hashCode", "()I"),
            ("equals", "(Ljava/lang/Object;)Z"),
            ("get", "(I)Ljava/lang/Object;"),
            ("get", "(J)Ljava/lang/Object;"),
            ("set", "(ILjava/lang/Object;)Ljava/lang/Object;"),
            ("size", "()I"),
            ("x", "I"),
            ("y", "I"),
        ];
        let mut seen = std::collections::HashSet::new();
        for (name, descriptor) in members {
            assert!(seen.insert(MemberHash::of(name, descriptor)), "{name}{descriptor}");
        }
    }
}
