//! Fixtures shared by the unit tests.

use crate::trie::Trie;
use crate::variable::Bindings;

/// Who loves whom, with one fact asserted twice.
pub(crate) fn loves_kb() -> (Trie, Bindings) {
    let mut trie = Trie::new();
    let env = Bindings::new();
    for (lover, beloved) in [
        ("Newt", "Newt"),
        ("John", "Mary"),
        ("John", "Kelly"),
        ("John", "Mary"),
        ("Kelly", "Mary"),
    ] {
        trie.store(&env)
            .child(lover)
            .and_then(|s| s.child("loves"))
            .and_then(|s| s.child(beloved))
            .unwrap();
    }
    (trie, env)
}
