pub mod search {

    pub const RADIUS_OPTIONS: &[u32] = &[500, 1000, 2500, 5000, 10000];

    pub const DEFAULT_RADIUS: u32 = 5000;

    pub const NO_RESULTS_MESSAGE: &str = "No valid locations found for this area";
}

pub mod categories {

    /// Places category filter offered to users, keyed by the upstream category id.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Category {
        pub id: u32,
        pub name: &'static str,
    }

    pub const CATALOG: &[Category] = &[
        Category { id: 10000, name: "Arts and Entertainment" },
        Category { id: 12000, name: "Community" },
        Category { id: 13000, name: "Dining and Drinking" },
        Category { id: 14000, name: "Events" },
        Category { id: 16000, name: "Landmarks and Outdoors" },
        Category { id: 17000, name: "Retail" },
        Category { id: 18000, name: "Sports" },
        Category { id: 19000, name: "Travel and Transportation" },
        Category { id: 19009, name: "Lodging" },
    ];

    #[must_use]
    pub fn find(id: u32) -> Option<&'static Category> {
        CATALOG.iter().find(|c| c.id == id)
    }

    /// Comma-joined id list in the form the places API expects.
    #[must_use]
    pub fn join_ids(ids: &[u32]) -> String {
        ids.iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_find_known_and_unknown() {
            assert_eq!(find(13000).map(|c| c.name), Some("Dining and Drinking"));
            assert_eq!(find(19009).map(|c| c.name), Some("Lodging"));
            assert!(find(11000).is_none());
        }

        #[test]
        fn test_join_ids() {
            assert_eq!(join_ids(&[]), "");
            assert_eq!(join_ids(&[10000]), "10000");
            assert_eq!(join_ids(&[10000, 13000, 19009]), "10000,13000,19009");
        }
    }
}

pub mod limits {

    pub const MAX_POPULAR_LIMIT: u64 = 100;
}
