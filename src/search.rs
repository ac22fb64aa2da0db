//! Search box classification.
//!
//! Turns free-form user input into the lookup it most likely means:
//!
//! - 64 hex characters: transaction hash
//! - all digits: block id
//! - long alphanumeric (> 30 chars): address
//! - anything else: treated as a transaction hash

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchTarget {
    Transaction { hash: String },
    Block { id: u64 },
    Address { address: String },
}

impl SearchTarget {
    /// Explorer route for this target, e.g. `/block/1000`.
    pub fn path(&self) -> String {
        match self {
            SearchTarget::Transaction { hash } => format!("/tx/{hash}"),
            SearchTarget::Block { id } => format!("/block/{id}"),
            SearchTarget::Address { address } => format!("/address/{address}"),
        }
    }
}

const ADDRESS_MIN_LEN: usize = 31;

/// Returns `None` for blank input.
pub fn classify(raw: &str) -> Option<SearchTarget> {
    let query = raw.trim();
    if query.is_empty() {
        return None;
    }

    if query.len() == 64 && query.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Some(SearchTarget::Transaction {
            hash: query.to_string(),
        });
    }

    if query.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(id) = query.parse::<u64>() {
            return Some(SearchTarget::Block { id });
        }
    }

    if query.len() >= ADDRESS_MIN_LEN && query.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Some(SearchTarget::Address {
            address: query.to_string(),
        });
    }

    Some(SearchTarget::Transaction {
        hash: query.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_none() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   "), None);
    }

    #[test]
    fn test_hex_hash() {
        let hash = "a".repeat(64);
        assert_eq!(
            classify(&format!("  {hash} ")),
            Some(SearchTarget::Transaction { hash: hash.clone() })
        );
        assert_eq!(classify(&hash).unwrap().path(), format!("/tx/{hash}"));
    }

    #[test]
    fn test_block_id() {
        assert_eq!(classify("1000"), Some(SearchTarget::Block { id: 1000 }));
        assert_eq!(classify("1000").unwrap().path(), "/block/1000");
    }

    #[test]
    fn test_all_digit_hash_is_transaction() {
        // 64 digits is valid hex and wins over the block rule
        let digits = "1".repeat(64);
        assert!(matches!(classify(&digits), Some(SearchTarget::Transaction { .. })));
        // overflowing u64 falls through
        let big = "9".repeat(25);
        assert!(matches!(classify(&big), Some(SearchTarget::Transaction { .. })));
    }

    #[test]
    fn test_address() {
        let addr = "DWMVFcRTZ8UMaWr2vsb7XkTmh7zaA57BQaDRGiAKB6qX6";
        assert_eq!(
            classify(addr),
            Some(SearchTarget::Address {
                address: addr.to_string()
            })
        );
    }

    #[test]
    fn test_fallback_is_transaction() {
        assert!(matches!(
            classify("coinbase-abc"),
            Some(SearchTarget::Transaction { .. })
        ));
    }
}
