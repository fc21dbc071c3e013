use std::collections::BTreeMap;

use crate::dataset::{Column, MISSING_LABEL};

/// Cells grouped by label. Categories are ordered by label, members by cell index.
///
/// Every cell belongs to exactly one category, so no category is ever empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryIndex {
    labels: Vec<String>,
    members: Vec<Vec<u32>>,
    category_of: Vec<u32>,
}

impl CategoryIndex {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut n_cells = 0usize;
        for (cell, label) in labels.into_iter().enumerate() {
            let label = label.as_ref();
            if let Some(members) = groups.get_mut(label) {
                members.push(cell as u32);
            } else {
                groups.insert(label.to_string(), vec![cell as u32]);
            }
            n_cells += 1;
        }
        Self::from_groups(groups, n_cells)
    }

    /// Groups directly on categorical codes when available, avoiding one
    /// string per cell.
    pub fn from_column(column: &Column) -> Self {
        match column {
            Column::Categorical { codes, categories } => {
                let missing = categories.len();
                let mut by_code: Vec<Vec<u32>> = vec![Vec::new(); categories.len() + 1];
                for (cell, &code) in codes.iter().enumerate() {
                    let slot = if code < 0 { missing } else { code as usize };
                    by_code[slot].push(cell as u32);
                }
                let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
                for (slot, members) in by_code.into_iter().enumerate() {
                    if members.is_empty() {
                        continue;
                    }
                    let label = if slot == missing {
                        MISSING_LABEL
                    } else {
                        categories[slot].as_str()
                    };
                    groups.entry(label.to_string()).or_default().extend(members);
                }
                for members in groups.values_mut() {
                    members.sort_unstable();
                }
                Self::from_groups(groups, codes.len())
            }
            other => Self::from_labels(other.labels()),
        }
    }

    fn from_groups(groups: BTreeMap<String, Vec<u32>>, n_cells: usize) -> Self {
        let mut labels = Vec::with_capacity(groups.len());
        let mut members = Vec::with_capacity(groups.len());
        let mut category_of = vec![0u32; n_cells];
        for (id, (label, cells)) in groups.into_iter().enumerate() {
            for &cell in &cells {
                category_of[cell as usize] = id as u32;
            }
            labels.push(label);
            members.push(cells);
        }
        Self {
            labels,
            members,
            category_of,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.category_of.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn members(&self, category: usize) -> &[u32] {
        &self.members[category]
    }

    pub fn counts(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    pub fn category_of(&self, cell: usize) -> usize {
        self.category_of[cell] as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.members.iter().map(Vec::as_slice))
    }
}
