//! Property tests for output naming.

use proptest::prelude::*;

use bundleplan::fingerprint::{is_fingerprint, FINGERPRINT_LEN};
use bundleplan::plan::{check_unique, name_for, AssetKind};
use bundleplan::profile::BuildProfile;

fn chunk_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

proptest! {
    #[test]
    fn distinct_chunks_get_distinct_names(
        a in chunk_name(),
        b in chunk_name(),
        production in any::<bool>(),
    ) {
        prop_assume!(a != b);
        let profile = if production { BuildProfile::Production } else { BuildProfile::Development };
        let first = name_for(&a, AssetKind::Script, profile).expect("chunk name should be valid");
        let second = name_for(&b, AssetKind::Script, profile).expect("chunk name should be valid");
        prop_assert_ne!(first.to_string(), second.to_string());
        prop_assert_ne!(first.render(b"same"), second.render(b"same"));
    }

    #[test]
    fn production_names_embed_fingerprint(
        chunk in chunk_name(),
        contents in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let name = name_for(&chunk, AssetKind::Style, BuildProfile::Production)
            .expect("chunk name should be valid")
            .render(&contents);
        let stem = name.strip_suffix(".css").expect("suffix should match");
        let prefix = format!("{}-", chunk);
        let hash = stem.strip_prefix(&prefix).expect("prefix should match");
        prop_assert_eq!(hash.len(), FINGERPRINT_LEN);
        prop_assert!(is_fingerprint(hash));
    }

    #[test]
    fn development_names_ignore_contents(
        chunk in chunk_name(),
        contents in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let template = name_for(&chunk, AssetKind::Script, BuildProfile::Development).expect("chunk name should be valid");
        prop_assert_eq!(template.render(&contents), format!("{}.js", chunk));
    }

    #[test]
    fn same_name_for_two_owners_collides(chunk in chunk_name()) {
        let name = format!("{}.js", chunk);
        let result = check_unique(vec![
            ("group:a".to_string(), name.as_str()),
            ("entry:b".to_string(), name.as_str()),
        ]);
        prop_assert!(result.is_err());
    }
}
