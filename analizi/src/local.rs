//! Scoped local declarations.

use crate::Name;
use alloc::vec::Vec;

/// Immutable HashMap for fast snapshots of declarations.
type FnvHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;

/// Map from names to declarations, remembering the order of declaration.
///
/// Declarations can be grouped into nested scopes:
/// `push` takes a snapshot of the current declarations and
/// `pop` restores the last snapshot, forgetting
/// all declarations added after the matching `push`.
/// A new declaration shadows a previous one with the same name.
///
/// ~~~
/// # use analizi::LocalDecls;
/// let mut decls = LocalDecls::new();
/// decls.insert("x".into(), 1);
/// decls.push();
/// decls.insert("x".into(), 2);
/// decls.insert("y".into(), 3);
/// assert_eq!(decls.get("x"), Some(&2));
/// decls.pop();
/// assert_eq!(decls.get("x"), Some(&1));
/// assert_eq!(decls.index_of("y"), None);
/// ~~~
#[derive(Clone, Debug)]
pub struct LocalDecls<T> {
    map: FnvHashMap<Name, (usize, T)>,
    counter: usize,
    scopes: Vec<(FnvHashMap<Name, (usize, T)>, usize)>,
}

impl<T: Clone> Default for LocalDecls<T> {
    fn default() -> Self {
        Self {
            map: Default::default(),
            counter: 0,
            scopes: Vec::new(),
        }
    }
}

impl<T: Clone> LocalDecls<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration to the current scope.
    pub fn insert(&mut self, name: Name, x: T) {
        self.map.insert(name, (self.counter, x));
        self.counter += 1;
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.map.get(name).map(|(_, x)| x)
    }

    /// Position of the declaration in the sequence of all visible declarations.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.map.get(name).map(|(i, _)| *i)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self) {
        self.scopes.push((self.map.clone(), self.counter))
    }

    /// Restore the declarations before the last `push`.
    ///
    /// Return false if there is no scope to close.
    pub fn pop(&mut self) -> bool {
        match self.scopes.pop() {
            Some((map, counter)) => {
                self.map = map;
                self.counter = counter;
                true
            }
            None => false,
        }
    }

    /// Visible declarations in order of declaration.
    pub fn entries(&self) -> Vec<(&Name, &T)> {
        let mut entries: Vec<_> = self.map.iter().map(|(n, (i, x))| (*i, n, x)).collect();
        entries.sort_by_key(|(i, _, _)| *i);
        entries.into_iter().map(|(_, n, x)| (n, x)).collect()
    }
}

#[test]
fn scopes() {
    let mut decls = LocalDecls::new();
    decls.insert(Name::new("a"), 'a');
    decls.push();
    decls.insert(Name::new("b"), 'b');
    decls.push();
    decls.insert(Name::new("a"), 'c');
    assert_eq!(decls.depth(), 2);
    assert_eq!(decls.get("a"), Some(&'c'));
    assert_eq!(decls.index_of("a"), Some(2));

    let names: Vec<_> = decls.entries().into_iter().map(|(_, x)| *x).collect();
    assert_eq!(names, Vec::from(['b', 'c']));

    assert!(decls.pop());
    assert_eq!(decls.get("a"), Some(&'a'));
    assert!(decls.pop());
    assert_eq!(decls.get("b"), None);
    assert!(!decls.pop());
    assert_eq!(decls.len(), 1);
}
