//! Merkle root over transaction hashes.

use crate::hash::hash256_concat;
use crate::uint::UInt256;

/// Compute the merkle root of a list of hashes.
///
/// Parents are `hash256(left || right)` over the wire bytes. A level with an
/// odd number of nodes pairs its last node with itself. A single hash is its
/// own root, and an empty list gives `UInt256::ZERO`.
pub fn merkle_root(hashes: &[UInt256]) -> UInt256 {
    let Some(first) = hashes.first() else {
        return UInt256::ZERO;
    };
    if hashes.len() == 1 {
        return *first;
    }

    let mut level: Vec<UInt256> = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0].to_array();
                let right = pair.get(1).unwrap_or(&pair[0]).to_array();
                hash256_concat(&[&left, &right])
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash256;

    fn make_hashes(n: usize) -> Vec<UInt256> {
        (0..n).map(|i| hash256(&[i as u8])).collect()
    }

    fn parent(a: &UInt256, b: &UInt256) -> UInt256 {
        let mut joined = a.to_array().to_vec();
        joined.extend_from_slice(&b.to_array());
        hash256(&joined)
    }

    #[test]
    fn test_merkle_root_empty() {
        assert_eq!(merkle_root(&[]), UInt256::ZERO);
    }

    #[test]
    fn test_merkle_root_single() {
        let hashes = make_hashes(1);
        assert_eq!(merkle_root(&hashes), hashes[0]);
    }

    #[test]
    fn test_merkle_root_two() {
        let hashes = make_hashes(2);
        assert_eq!(merkle_root(&hashes), parent(&hashes[0], &hashes[1]));
    }

    #[test]
    fn test_merkle_root_odd_duplicates_last() {
        let h = make_hashes(3);
        let expected = parent(&parent(&h[0], &h[1]), &parent(&h[2], &h[2]));
        assert_eq!(merkle_root(&h), expected);
    }

    #[test]
    fn test_merkle_root_order_matters() {
        let hashes = make_hashes(4);
        let mut reversed = hashes.clone();
        reversed.reverse();
        assert_ne!(merkle_root(&hashes), merkle_root(&reversed));
    }
}
