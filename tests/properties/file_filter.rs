//! Property tests for include/exclude matching.

use proptest::prelude::*;

use targetsync::FileFilter;

fn relative_path() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9._-]{1,12}").unwrap();
    proptest::collection::vec(segment, 1..=5).prop_map(|segments| segments.join("/"))
}

fn pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("**".to_string()),
        Just("**/*.js".to_string()),
        Just("**/*.txt".to_string()),
        Just("src/**".to_string()),
        Just("*".to_string()),
        proptest::string::string_regex("[a-z]{1,6}/\\*\\*").unwrap(),
        proptest::string::string_regex("\\*\\*/\\*\\.[a-z]{1,3}").unwrap(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: a path matched by an exclude pattern is rejected, whatever is included.
    #[test]
    fn property_exclude_wins(
        path in relative_path(),
        include in proptest::collection::vec(pattern(), 0..4),
    ) {
        let filter = FileFilter::new(include, ["**"]);
        prop_assert!(!filter.matches(&path));
    }

    /// PROPERTY: with no include patterns every path is included.
    #[test]
    fn property_default_includes_everything(path in relative_path()) {
        prop_assert!(FileFilter::all().matches(&path));
        prop_assert!(FileFilter::new(["  "], Vec::<String>::new()).matches(&path));
    }

    /// PROPERTY: the leading slash and separator style never change the outcome.
    #[test]
    fn property_canonical_forms_agree(
        path in relative_path(),
        include in proptest::collection::vec(pattern(), 0..3),
        exclude in proptest::collection::vec(pattern(), 0..2),
    ) {
        let filter = FileFilter::new(include, exclude);
        let plain = filter.matches(&path);
        prop_assert_eq!(plain, filter.matches(&format!("/{}", path)));
        prop_assert_eq!(plain, filter.matches(&path.replace('/', "\\")));
    }

    /// PROPERTY: matching ignores case.
    #[test]
    fn property_case_insensitive(
        path in relative_path(),
        include in proptest::collection::vec(pattern(), 1..3),
    ) {
        let filter = FileFilter::new(include, Vec::<String>::new());
        prop_assert_eq!(filter.matches(&path), filter.matches(&path.to_uppercase()));
    }
}
