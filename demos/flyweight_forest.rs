//! Flyweight forest example for lazy-registry.
//!
//! Demonstrates:
//! - Sharing one immutable `TreeType` per (name, color, texture) combination
//! - Keeping per-tree position outside the shared instance
//! - Passing one registry to every forest instead of using a global
//!
//! Run with: `cargo run --example flyweight_forest`

use lazy_registry::{CanonicalRegistry, Intrinsic};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TreeKind {
    name: &'static str,
    color: &'static str,
    texture: &'static str,
}

/// Shared part of a tree.
struct TreeType {
    name: &'static str,
    color: &'static str,
    texture: &'static str,
}

impl TreeType {
    fn display(&self, x: i32, y: i32) {
        println!(
            "   Tree: {}, Color: {}, Texture: {}, Position: ({}, {})",
            self.name, self.color, self.texture, x, y
        );
    }
}

impl Intrinsic for TreeType {
    type Key = TreeKind;

    fn from_key(key: &TreeKind) -> Self {
        TreeType {
            name: key.name,
            color: key.color,
            texture: key.texture,
        }
    }
}

/// Unique part of a tree plus a handle to its shared type.
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

    fn plant_tree(&mut self, x: i32, y: i32, name: &'static str, color: &'static str, texture: &'static str) {
        let kind = self.types.get_or_create(TreeKind {
            name,
            color,
            texture,
        });
        self.trees.push(Tree { x, y, kind });
    }

    fn display_forest(&self, limit: usize) {
        for tree in self.trees.iter().take(limit) {
            tree.kind.display(tree.x, tree.y);
        }
    }
}

fn main() {
    println!("=== lazy-registry: Flyweight Forest ===\n");

    let types = Arc::new(CanonicalRegistry::new());
    let mut forest = Forest::new(types.clone());

    println!("1. Planting three different trees...");
    forest.plant_tree(10, 20, "Oak", "Green", "Rough");
    forest.plant_tree(15, 25, "Pine", "Dark Green", "Smooth");
    forest.plant_tree(30, 40, "Birch", "Light Green", "Peeling");
    forest.display_forest(3);

    println!("\n2. Planting one million oaks...");
    for i in 0..1_000_000 {
        forest.plant_tree(i, i + 1, "Oak", "Green", "Rough");
    }
    forest.display_forest(5);

    let stats = types.stats();
    println!("\n3. Trees planted: {}", forest.trees.len());
    println!("   Tree types created: {}", types.len());
    println!(
        "   Lookups: hits={} misses={}",
        stats.hits, stats.misses
    );

    println!("\n=== Example completed successfully! ===");
}
