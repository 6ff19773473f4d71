//! Unique identifiers for layers and v-objects.

use uuid::Uuid;

/// Returns a new document-unique id.
///
/// Ids are preserved verbatim through serialization and correlate client
/// state with externally stored state.
pub fn new_unique_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_do_not_collide() {
        let ids: HashSet<String> = (0..1000).map(|_| new_unique_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
