use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// What happens when two genes normalise to the same uppercase name.
/// Genes are always merged in ascending column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    #[default]
    LastWins,
    FirstWins,
    /// Element-wise average over every colliding gene.
    Mean,
}

#[derive(Debug, Clone, PartialEq)]
struct GeneEntry {
    name: String,
    means: Vec<f64>,
    merged: usize,
}

/// Gene -> category -> mean expression. Genes keep the position of their
/// first occurrence; categories share one ordering across all genes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationResult {
    categories: Vec<String>,
    genes: Vec<GeneEntry>,
    positions: HashMap<String, usize>,
    collisions: usize,
}

impl AggregationResult {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            categories,
            genes: Vec::new(),
            positions: HashMap::new(),
            collisions: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Records one gene's means. Returns `true` when the name was already present.
    pub fn insert(&mut self, name: String, means: Vec<f64>, policy: CollisionPolicy) -> bool {
        debug_assert_eq!(means.len(), self.categories.len());
        if let Some(&pos) = self.positions.get(&name) {
            self.collisions += 1;
            let entry = &mut self.genes[pos];
            match policy {
                CollisionPolicy::LastWins => entry.means = means,
                CollisionPolicy::FirstWins => {}
                CollisionPolicy::Mean => {
                    let n = entry.merged as f64;
                    for (acc, v) in entry.means.iter_mut().zip(means) {
                        *acc = (*acc * n + v) / (n + 1.0);
                    }
                }
            }
            entry.merged += 1;
            return true;
        }
        self.positions.insert(name.clone(), self.genes.len());
        self.genes.push(GeneEntry {
            name,
            means,
            merged: 1,
        });
        false
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn gene_names(&self) -> impl Iterator<Item = &str> {
        self.genes.iter().map(|g| g.name.as_str())
    }

    pub fn means(&self, gene: &str) -> Option<&[f64]> {
        self.positions
            .get(gene)
            .map(|&pos| self.genes[pos].means.as_slice())
    }

    pub fn get(&self, gene: &str, category: &str) -> Option<f64> {
        let c = self.categories.iter().position(|c| c == category)?;
        self.means(gene).map(|m| m[c])
    }
}

struct CategoryMeans<'a> {
    categories: &'a [String],
    means: &'a [f64],
}

impl Serialize for CategoryMeans<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, mean) in self.categories.iter().zip(self.means) {
            map.serialize_entry(category, mean)?;
        }
        map.end()
    }
}

impl Serialize for AggregationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.genes.len()))?;
        for gene in &self.genes {
            map.serialize_entry(
                &gene.name,
                &CategoryMeans {
                    categories: &self.categories,
                    means: &gene.means,
                },
            )?;
        }
        map.end()
    }
}
