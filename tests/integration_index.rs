// =====================================================================
// File: integration_index.rs
// Author: Bob Jack
// Date: Oct. 9, 2025
//
// Description:
//   Integration tests for the B-tree index. These tests exercise the
//   full end-to-end flow of the system, including:
//
//   - The fixed degree-3 insert/delete walkthrough, checking the
//     in-order traversal and every invariant after each step
//   - Word-index style use: one tree keyed by word holding a
//     document -> frequency map, updated in place
//   - The command loop driven through in-memory input/output
// =====================================================================
use std::collections::BTreeMap;

use btree_index::{repl_loop, BTreeIndex, Config, Session};

const INSERT_ORDER: [i32; 23] = [
    1, 3, 7, 10, 11, 13, 14, 15, 18, 16, 19, 24, 25, 26, 21, 4, 5, 20, 22, 2, 17, 12, 6,
];
const DELETE_ORDER: [i32; 23] = [
    19, 10, 2, 20, 16, 22, 17, 5, 6, 24, 26, 3, 7, 12, 15, 4, 21, 1, 13, 25, 11, 18, 14,
];


/// Helper - degree-3 tree filled with the walkthrough keys
fn walkthrough_tree() -> BTreeIndex<i32, String> {
    let mut tree = BTreeIndex::new(3).unwrap();
    for k in INSERT_ORDER {
        assert!(tree.insert(k, format!("Soso{k}")));
        tree.assert_invariants();
    }
    tree
}


/// Runs `script` through the REPL and returns everything it printed.
fn run_script(session: &mut Session, script: &str) -> Vec<String> {
    let mut out = Vec::new();
    repl_loop(session, script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
}


#[test]
fn test_walkthrough_inserts_sorted() {
    let tree = walkthrough_tree();

    let mut expected = INSERT_ORDER.to_vec();
    expected.sort_unstable();
    assert_eq!(tree.keys(), expected);
    assert_eq!(tree.len(), 23);
    assert!(tree.search(&23).is_none());

    for k in INSERT_ORDER {
        assert_eq!(tree.search(&k), Some(&format!("Soso{k}")));
    }
}


#[test]
fn test_walkthrough_deletes_keep_order_and_invariants() {
    let mut tree = walkthrough_tree();
    let mut remaining: Vec<i32> = tree.keys();

    for (step, k) in DELETE_ORDER.into_iter().enumerate() {
        assert!(tree.delete(&k), "step {step}: {k} should be present");
        remaining.retain(|&r| r != k);

        assert_eq!(tree.keys(), remaining, "step {step}: traversal after deleting {k}");
        assert_eq!(tree.search(&k), None);
        tree.assert_invariants();

        // Untouched keys still map to their original payload
        for r in &remaining {
            assert_eq!(tree.search(r), Some(&format!("Soso{r}")));
        }
    }

    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
}


#[test]
fn test_walkthrough_height_changes() {
    let mut tree = walkthrough_tree();
    let tall = tree.height();
    assert!(tall >= 2);

    // Height may only ever go down while deleting
    let mut last = tall;
    for k in DELETE_ORDER {
        tree.delete(&k);
        let h = tree.height();
        assert!(h <= last, "height grew from {last} to {h} on delete");
        last = h;
    }
    assert_eq!(last, 0);
}


#[test]
fn test_word_frequency_index() {
    // word -> (document id -> frequency), updated through search_mut
    let mut words: BTreeIndex<String, BTreeMap<u32, u32>> = BTreeIndex::new(2).unwrap();
    let docs = [
        (1, "the quick brown fox"),
        (2, "the lazy dog"),
        (3, "The fox and THE dog"),
    ];

    for (id, text) in docs {
        for word in text.split_whitespace().map(str::to_lowercase) {
            if let Some(freqs) = words.search_mut(word.as_str()) {
                *freqs.entry(id).or_insert(0) += 1;
            } else {
                words.insert(word, BTreeMap::from([(id, 1)]));
            }
        }
    }
    words.assert_invariants();

    let the = words.search("the").unwrap();
    assert_eq!(the, &BTreeMap::from([(1, 1), (2, 1), (3, 2)]));
    assert_eq!(words.search("fox").unwrap().len(), 2);
    assert!(words.search("cat").is_none());
    assert_eq!(
        words.keys(),
        vec!["and", "brown", "dog", "fox", "lazy", "quick", "the"]
    );
}


#[test]
fn test_repl_end_to_end() {
    let mut session = Session::new(&Config { min_degree: 2 }).unwrap();
    let out = run_script(
        &mut session,
        "SET dog bark\nset cat meow\nSET dog woof\nGET dog\nEXISTS cat\nDEL cat\nDEL cat\nGET cat\nKEYS\nLEN\nCHECK\n",
    );
    assert_eq!(
        out,
        vec!["OK", "OK", "EXISTS", "bark", "1", "1", "0", "NULL", "dog", "END", "1", "OK"]
    );
}


#[test]
fn test_repl_errors_keep_running() {
    let mut session = Session::new(&Config::default()).unwrap();
    let out = run_script(&mut session, "SET lonely\nFLY away\n\nGET\nSET a 1\nGET a\n");

    assert!(out[0].starts_with("ERR: invalid argument"));
    assert_eq!(out[1], "ERR: command 'FLY' not handled");
    assert!(out[2].starts_with("Syntax Usage"));
    assert!(out[3].starts_with("ERR: invalid argument"));
    assert_eq!(&out[4..], ["OK", "1"]);
}


#[test]
fn test_repl_stops_at_exit() {
    let mut session = Session::new(&Config::default()).unwrap();
    let out = run_script(&mut session, "SET a 1\nEXIT\nSET b 2\n");
    assert_eq!(out, vec!["OK"]);
    assert!(session.index.search("b").is_none());
}


#[test]
fn test_repl_many_keys_stay_valid() {
    let mut session = Session::new(&Config { min_degree: 3 }).unwrap();
    let mut script = String::new();
    for i in 0..300 {
        script.push_str(&format!("SET k{i:03} v{i}\n"));
    }
    for i in (0..300).step_by(2) {
        script.push_str(&format!("DEL k{i:03}\n"));
    }
    script.push_str("LEN\nCHECK\n");

    let out = run_script(&mut session, &script);
    assert_eq!(out[out.len() - 2], "150");
    assert_eq!(out[out.len() - 1], "OK");
}
