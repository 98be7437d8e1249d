//! Integration tests for canonical (flyweight) sharing.
//!
//! Trees store only their own position plus a handle to a shared tree type.
//! The tree type holds name, color and texture once per distinct combination.

use lazy_registry::{CanonicalRegistry, ConstructionPolicy, Intrinsic, RegistryOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TreeKind {
    name: String,
    color: String,
    texture: String,
}

impl TreeKind {
    fn new(name: &str, color: &str, texture: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            texture: texture.to_string(),
        }
    }
}

#[derive(Debug)]
struct TreeType {
    name: String,
    color: String,
    texture: String,
}

impl TreeType {
    fn describe(&self, x: i32, y: i32) -> String {
        format!(
            "Tree: {}, Color: {}, Texture: {}, Position: ({}, {})",
            self.name, self.color, self.texture, x, y
        )
    }
}

impl Intrinsic for TreeType {
    type Key = TreeKind;

    fn from_key(key: &TreeKind) -> Self {
        TreeType {
            name: key.name.clone(),
            color: key.color.clone(),
            texture: key.texture.clone(),
        }
    }
}

struct Tree {
    x: i32,
    y: i32,
    kind: Arc<TreeType>,
}

struct Forest {
    types: Arc<CanonicalRegistry<TreeType>>,
    trees: Vec<Tree>,
}

impl Forest {
    fn new(types: Arc<CanonicalRegistry<TreeType>>) -> Self {
        Self {
            types,
            trees: Vec::new(),
        }
    }

    fn plant(&mut self, x: i32, y: i32, name: &str, color: &str, texture: &str) {
        let kind = self.types.get_or_create(TreeKind::new(name, color, texture));
        self.trees.push(Tree { x, y, kind });
    }

    fn describe(&self) -> Vec<String> {
        self.trees.iter().map(|t| t.kind.describe(t.x, t.y)).collect()
    }
}

#[test]
fn test_same_attributes_share_one_instance() {
    let types: CanonicalRegistry<TreeType> = CanonicalRegistry::new();

    let first = types.get_or_create(TreeKind::new("Oak", "Green", "Rough"));
    let second = types.get_or_create(TreeKind::new("Oak", "Green", "Rough"));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(types.stats().constructions, 1);
}

#[test]
fn test_different_attributes_are_independent() {
    let types: CanonicalRegistry<TreeType> = CanonicalRegistry::new();

    let oak = types.get_or_create(TreeKind::new("Oak", "Green", "Rough"));
    let pine = types.get_or_create(TreeKind::new("Pine", "DarkGreen", "Smooth"));

    assert!(!Arc::ptr_eq(&oak, &pine));
    assert_eq!(types.len(), 2);

    let oak_again = types.get(&TreeKind::new("Oak", "Green", "Rough")).unwrap();
    let pine_again = types
        .get(&TreeKind::new("Pine", "DarkGreen", "Smooth"))
        .unwrap();
    assert!(Arc::ptr_eq(&oak, &oak_again));
    assert!(Arc::ptr_eq(&pine, &pine_again));
}

#[test]
fn test_forest_keeps_extrinsic_state_per_tree() {
    let types = Arc::new(CanonicalRegistry::new());
    let mut forest = Forest::new(types.clone());

    forest.plant(10, 20, "Oak", "Green", "Rough");
    forest.plant(15, 25, "Pine", "Dark Green", "Smooth");
    forest.plant(30, 40, "Birch", "Light Green", "Peeling");
    for i in 0..10_000 {
        forest.plant(i, i + 1, "Oak", "Green", "Rough");
    }

    assert_eq!(forest.trees.len(), 10_003);
    assert_eq!(types.len(), 3);

    let oak = &forest.trees[0].kind;
    // One handle per oak tree plus the registry's own.
    assert_eq!(Arc::strong_count(oak), 10_001 + 1);

    let lines = forest.describe();
    assert_eq!(
        lines[0],
        "Tree: Oak, Color: Green, Texture: Rough, Position: (10, 20)"
    );
    assert_eq!(
        lines[10_002],
        "Tree: Oak, Color: Green, Texture: Rough, Position: (9999, 10000)"
    );
}

#[test]
fn test_forests_sharing_one_registry() {
    let types = Arc::new(CanonicalRegistry::new());
    let mut north = Forest::new(types.clone());
    let mut south = Forest::new(types.clone());

    north.plant(0, 0, "Pine", "Dark Green", "Smooth");
    south.plant(5, 5, "Pine", "Dark Green", "Smooth");

    assert!(Arc::ptr_eq(&north.trees[0].kind, &south.trees[0].kind));
    assert_eq!(types.len(), 1);
}

#[test]
fn test_concurrent_planting_converges_on_one_instance() {
    let types: Arc<CanonicalRegistry<TreeType>> = Arc::new(CanonicalRegistry::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let types = types.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                types.get_or_create(TreeKind::new("Oak", "Green", "Rough"))
            })
        })
        .collect();

    let kinds: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(kinds.iter().all(|k| Arc::ptr_eq(k, &kinds[0])));
    assert_eq!(types.len(), 1);
}

#[test]
fn test_strict_policy_builds_each_type_once() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Texture(&'static str);

    struct Loaded;

    impl Intrinsic for Loaded {
        type Key = Texture;

        fn from_key(_key: &Texture) -> Self {
            BUILT.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(10));
            Loaded
        }
    }

    let textures: Arc<CanonicalRegistry<Loaded>> = Arc::new(CanonicalRegistry::with_options(
        RegistryOptions::new()
            .name("textures")
            .policy(ConstructionPolicy::Strict),
    ));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let textures = textures.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                textures.get_or_create(Texture("bark"))
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
}
