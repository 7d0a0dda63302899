//! Fuzz target for repository hashing and entry point resolution.
//!
//! Run with: cargo +nightly fuzz run fuzz_entry_point

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use turbod_core::{EntryPointRule, RepoRoot, repo_hash};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let rule = EntryPointRule::default();
    let resolved = rule.resolve(Path::new(text));
    assert_eq!(rule.resolve(&resolved), resolved);

    if let Ok(root) = RepoRoot::new(text) {
        let hash = repo_hash(&root);
        assert_eq!(hash.as_str().len(), 16);
        assert!(hash.as_str().bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
});
