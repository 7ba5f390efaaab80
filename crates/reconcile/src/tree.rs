use std::collections::HashSet;

use moneta_core::Category;

/// Two-level category hierarchy for one wallet and kind.
///
/// Input rows are de-duplicated by name before assembly (first occurrence
/// wins, matching how the cache file may repeat rows). Children attach to
/// their parent by id; both sides are compared as text because the service
/// mixes numeric and string ids.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    parents: Vec<Parent>,
}

#[derive(Debug, Clone)]
struct Parent {
    name: String,
    children: Vec<String>,
}

impl CategoryTree {
    pub fn build(categories: &[Category]) -> Self {
        let mut seen = HashSet::new();
        let unique: Vec<&Category> = categories
            .iter()
            .filter(|category| seen.insert(category.name.as_str()))
            .collect();

        let parents = unique
            .iter()
            .filter(|category| category.parent.is_none())
            .map(|parent| Parent {
                name: parent.name.clone(),
                children: unique
                    .iter()
                    .filter(|child| child.parent.as_deref() == Some(parent.id.as_str()))
                    .map(|child| child.name.clone())
                    .collect(),
            })
            .collect();

        Self { parents }
    }

    /// Top-level names with the number of children under each, in input
    /// order.
    pub fn parents(&self) -> Vec<(&str, usize)> {
        self.parents
            .iter()
            .map(|parent| (parent.name.as_str(), parent.children.len()))
            .collect()
    }

    /// Unique child names under a parent; empty for unknown parents.
    pub fn children(&self, parent: &str) -> &[String] {
        self.parents
            .iter()
            .find(|p| p.name == parent)
            .map(|p| p.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

/// One user decision at a picker prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Index(usize),
    /// Return from the child listing to the parent listing.
    Back,
    /// Leave without choosing a category.
    Skip,
    /// Take the currently selected parent as the final category.
    Accept,
}

impl Selection {
    /// Parses a raw prompt token: empty accepts, `b` goes back, `s`
    /// skips, digits select. Anything else is malformed and the caller
    /// re-prompts.
    pub fn parse(input: &str) -> Option<Self> {
        let token = input.trim();
        match token {
            "" => Some(Selection::Accept),
            "b" | "B" => Some(Selection::Back),
            "s" | "S" => Some(Selection::Skip),
            _ => token.parse().ok().map(Selection::Index),
        }
    }
}

/// What the front-end should render before the next selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerView {
    Parents(Vec<(String, usize)>),
    Children {
        parent: String,
        children: Vec<String>,
    },
}

/// Result of feeding one selection to the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// No terminal decision yet; render the current view again.
    Pending,
    Selected(String),
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerState {
    ChoosingParent,
    ChoosingChild { parent: usize },
}

/// Interactive two-level descent over a [`CategoryTree`].
///
/// Picking a childless parent selects it immediately; picking one with
/// children descends. At the child level an index selects the child,
/// empty input accepts the parent itself, and `Back` returns to the
/// parent listing. Skipping is only available at the parent level.
/// Selections that do not apply in the current state leave it unchanged.
#[derive(Debug)]
pub struct TreePicker<'a> {
    tree: &'a CategoryTree,
    state: PickerState,
}

impl<'a> TreePicker<'a> {
    pub fn new(tree: &'a CategoryTree) -> Self {
        Self {
            tree,
            state: PickerState::ChoosingParent,
        }
    }

    pub fn view(&self) -> PickerView {
        match self.state {
            PickerState::ChoosingParent => PickerView::Parents(
                self.tree
                    .parents
                    .iter()
                    .map(|parent| (parent.name.clone(), parent.children.len()))
                    .collect(),
            ),
            PickerState::ChoosingChild { parent } => {
                let parent = &self.tree.parents[parent];
                PickerView::Children {
                    parent: parent.name.clone(),
                    children: parent.children.clone(),
                }
            }
        }
    }

    pub fn feed(&mut self, selection: Selection) -> PickerOutcome {
        match self.state {
            PickerState::ChoosingParent => match selection {
                Selection::Index(index) if index < self.tree.parents.len() => {
                    let parent = &self.tree.parents[index];
                    if parent.children.is_empty() {
                        PickerOutcome::Selected(parent.name.clone())
                    } else {
                        self.state = PickerState::ChoosingChild { parent: index };
                        PickerOutcome::Pending
                    }
                }
                Selection::Skip => PickerOutcome::Skipped,
                _ => PickerOutcome::Pending,
            },
            PickerState::ChoosingChild { parent } => {
                let parent = &self.tree.parents[parent];
                match selection {
                    Selection::Index(index) if index < parent.children.len() => {
                        PickerOutcome::Selected(parent.children[index].clone())
                    }
                    Selection::Accept => PickerOutcome::Selected(parent.name.clone()),
                    Selection::Back => {
                        self.state = PickerState::ChoosingParent;
                        PickerOutcome::Pending
                    }
                    _ => PickerOutcome::Pending,
                }
            }
        }
    }
}
