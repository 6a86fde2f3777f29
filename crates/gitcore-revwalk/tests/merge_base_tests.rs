//! Merge-base computation over in-memory commit graphs.

use bstr::BString;
use gitcore_hash::ObjectId;
use gitcore_object::{Commit, GitDate, Object, Signature, Tree};
use gitcore_odb::{MemoryStore, ObjectStore};
use gitcore_revwalk::{is_ancestor, merge_base, merge_base_one};

fn signature(timestamp: i64) -> Signature {
    Signature {
        name: BString::from("Test Author"),
        email: BString::from("test@example.com"),
        date: GitDate::new(timestamp, 0),
    }
}

fn commit(store: &MemoryStore, parents: &[ObjectId], timestamp: i64) -> ObjectId {
    let tree = store.write(&Object::Tree(Tree::new())).unwrap();
    let commit = Commit {
        tree,
        parents: parents.to_vec(),
        author: signature(timestamp),
        committer: signature(timestamp),
        extra_headers: Vec::new(),
        message: BString::from(format!("commit at {timestamp}\n")),
    };
    store.write(&Object::Commit(commit)).unwrap()
}

#[test]
fn merge_base_of_identical_commits() {
    let store = MemoryStore::new();
    let a = commit(&store, &[], 100);
    assert_eq!(merge_base(&store, &a, &a).unwrap(), vec![a]);
}

#[test]
fn merge_base_linear_history() {
    let store = MemoryStore::new();
    let a = commit(&store, &[], 100);
    let b = commit(&store, &[a], 200);
    let c = commit(&store, &[b], 300);

    // In a linear chain the older commit is the base.
    assert_eq!(merge_base(&store, &b, &c).unwrap(), vec![b]);
    assert_eq!(merge_base_one(&store, &a, &c).unwrap(), Some(a));
}

#[test]
fn merge_base_forked_history() {
    let store = MemoryStore::new();
    let base = commit(&store, &[], 100);
    let left = commit(&store, &[base], 200);
    let right = commit(&store, &[base], 201);

    assert_eq!(merge_base(&store, &left, &right).unwrap(), vec![base]);
}

#[test]
fn merge_base_disjoint_histories_is_empty() {
    let store = MemoryStore::new();
    let a = commit(&store, &[], 100);
    let b = commit(&store, &[], 101);

    assert!(merge_base(&store, &a, &b).unwrap().is_empty());
    assert_eq!(merge_base_one(&store, &a, &b).unwrap(), None);
}

#[test]
fn merge_base_criss_cross_finds_both() {
    // root -> left, right; then each side merges the other:
    //   x has parents (left, right), y has parents (right, left).
    let store = MemoryStore::new();
    let root = commit(&store, &[], 100);
    let left = commit(&store, &[root], 200);
    let right = commit(&store, &[root], 201);
    let x = commit(&store, &[left, right], 300);
    let y = commit(&store, &[right, left], 301);

    let mut bases = merge_base(&store, &x, &y).unwrap();
    bases.sort();
    let mut expected = vec![left, right];
    expected.sort();
    assert_eq!(bases, expected);
}

#[test]
fn is_ancestor_checks() {
    let store = MemoryStore::new();
    let a = commit(&store, &[], 100);
    let b = commit(&store, &[a], 200);
    let c = commit(&store, &[b], 300);
    let unrelated = commit(&store, &[], 150);

    assert!(is_ancestor(&store, &a, &c).unwrap());
    assert!(is_ancestor(&store, &b, &b).unwrap());
    assert!(!is_ancestor(&store, &c, &a).unwrap());
    assert!(!is_ancestor(&store, &unrelated, &c).unwrap());
}

#[test]
fn missing_commit_errors() {
    let store = MemoryStore::new();
    let a = commit(&store, &[], 100);
    let missing = ObjectId::from_hex("1111111111111111111111111111111111111111").unwrap();

    assert!(merge_base(&store, &a, &missing).is_err());
}
