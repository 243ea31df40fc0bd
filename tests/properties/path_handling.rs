//! Property tests for root containment.

use std::path::Path;

use proptest::prelude::*;

use targetsync::domain::value_objects::{is_path_of, normalize_lexically, resolve_within};

fn requested_path() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        3 => proptest::string::string_regex("[A-Za-z0-9._-]{1,8}").unwrap(),
        1 => Just("..".to_string()),
        1 => Just(".".to_string()),
    ];
    proptest::collection::vec(segment, 0..8).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a resolved path always lies inside the root.
    #[test]
    fn property_resolved_paths_stay_inside(requested in requested_path()) {
        let root = Path::new("/srv/target");
        if let Ok(resolved) = resolve_within(root, &requested) {
            prop_assert!(is_path_of(root, &resolved));
        }
    }

    /// PROPERTY: paths without `..` never escape.
    #[test]
    fn property_plain_segments_always_resolve(requested in requested_path()) {
        prop_assume!(!requested.split('/').any(|s| s == ".."));
        let root = Path::new("/srv/target");
        prop_assert!(resolve_within(root, &requested).is_ok());
    }

    /// PROPERTY: normalization is idempotent.
    #[test]
    fn property_normalize_idempotent(requested in requested_path()) {
        let path = Path::new("/base").join(&requested);
        let once = normalize_lexically(&path);
        prop_assert_eq!(normalize_lexically(&once), once.clone());
    }
}
