use crate::utils::sha256_hex;

/// Merkle root computation over transaction ids.
///
/// Leaves are 64-char hex txids. Each level pairs adjacent entries and hashes
/// the concatenation of their hex strings with SHA-256, duplicating the last
/// entry when the level is odd, until one hash remains. A single leaf is
/// already the root; an empty leaf list hashes the empty byte string.
pub struct MerkleTree;

impl MerkleTree {
    pub fn compute_merkle_root(txids: &[String]) -> String {
        if txids.is_empty() {
            return sha256_hex(b"");
        }

        let mut current_level = txids.to_vec();

        while current_level.len() > 1 {
            let mut next_level = Vec::new();
            let mut i = 0;

            while i < current_level.len() {
                let left = &current_level[i];
                let right = if i + 1 < current_level.len() {
                    &current_level[i + 1]
                } else {
                    // Odd number of nodes: duplicate the last one
                    &current_level[i]
                };
                next_level.push(Self::hash_pair(left, right));
                i += 2;
            }

            current_level = next_level;
        }

        current_level
            .into_iter()
            .next()
            .expect("merkle level is never empty here")
    }

    fn hash_pair(left: &str, right: &str) -> String {
        sha256_hex(format!("{left}{right}").as_bytes())
    }
}
