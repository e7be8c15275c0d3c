//! Card classification into the two comparison groups
//!
//! [`classify`] answers from the static default membership table and is only
//! used to seed state. [`GroupAssignment`] is the mutable, owned state the
//! explorer works on; it guarantees a name sits in at most one group.

use crate::catalog::{Catalog, NameKey};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Default "toxic troop" members, in canonical order.
pub const TOXIC_TROOPS: &[&str] = &["Skeleton Army", "Wizard", "Valkyrie", "Mega Knight"];

/// Default "cheap spell" members, in canonical order.
pub const CHEAP_SPELLS: &[&str] = &["The Log", "Zap"];

/// One of the comparison groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    ToxicTroop,
    CheapSpell,
}

impl GroupKey {
    /// All groups in declaration order (also the projection order).
    pub const ALL: [GroupKey; 2] = [GroupKey::ToxicTroop, GroupKey::CheapSpell];

    pub fn key(self) -> &'static str {
        match self {
            GroupKey::ToxicTroop => "toxic_troop",
            GroupKey::CheapSpell => "cheap_spell",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupKey::ToxicTroop => "Toxic troop",
            GroupKey::CheapSpell => "Cheap spell",
        }
    }

    /// The default member list for this group.
    pub fn defaults(self) -> &'static [&'static str] {
        match self {
            GroupKey::ToxicTroop => TOXIC_TROOPS,
            GroupKey::CheapSpell => CHEAP_SPELLS,
        }
    }

    fn slot(self) -> usize {
        match self {
            GroupKey::ToxicTroop => 0,
            GroupKey::CheapSpell => 1,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for GroupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toxic" | "toxic_troop" | "troop" => Ok(GroupKey::ToxicTroop),
            "cheap" | "cheap_spell" | "spell" => Ok(GroupKey::CheapSpell),
            other => Err(format!(
                "Unknown group '{}' (expected 'toxic' or 'cheap')",
                other
            )),
        }
    }
}

/// Default group of a card name, or `None` for "unclassified".
pub fn classify(name: &str) -> Option<GroupKey> {
    let key = NameKey::new(name);
    GroupKey::ALL.into_iter().find(|group| {
        group
            .defaults()
            .iter()
            .any(|member| NameKey::new(member) == key)
    })
}

/// A group member: normalized key plus the spelling it was added with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub key: NameKey,
    pub name: String,
}

/// Hashable picture of the full membership, in canonical order.
///
/// Two assignments with equal snapshots project identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipSnapshot(Vec<(GroupKey, NameKey)>);

impl MembershipSnapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Mutable group membership
///
/// Each group keeps insertion order. A name is in at most one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAssignment {
    groups: [Vec<Member>; 2],
}

impl GroupAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed straight from the default tables, without consulting a catalog.
    pub fn default_membership() -> Self {
        let mut assignment = Self::new();
        for group in GroupKey::ALL {
            for name in group.defaults() {
                assignment.assign(name, group);
            }
        }
        assignment
    }

    /// Seed by classifying every card of `catalog`, in catalog order.
    pub fn seeded_from(catalog: &Catalog) -> Self {
        let mut assignment = Self::new();
        assignment.reset_to_default(catalog);
        assignment
    }

    /// Move `name` into `group`, removing it from any other group first.
    ///
    /// Returns `false` (and leaves the state untouched) if the name is blank
    /// or already in `group`.
    pub fn assign(&mut self, name: &str, group: GroupKey) -> bool {
        let key = NameKey::new(name);
        if key.is_empty() {
            return false;
        }
        if self.group_of_key(&key) == Some(group) {
            return false;
        }

        for slot in self.groups.iter_mut() {
            slot.retain(|m| m.key != key);
        }
        self.groups[group.slot()].push(Member {
            key,
            name: name.trim().to_string(),
        });
        true
    }

    /// Remove `name` from `group`. Returns whether anything was removed.
    pub fn unassign(&mut self, name: &str, group: GroupKey) -> bool {
        let key = NameKey::new(name);
        let slot = &mut self.groups[group.slot()];
        let before = slot.len();
        slot.retain(|m| m.key != key);
        slot.len() != before
    }

    /// Clear everything and reseed from the default table over `catalog`.
    pub fn reset_to_default(&mut self, catalog: &Catalog) {
        self.clear_all();
        for card in catalog {
            if let Some(group) = classify(&card.name) {
                self.assign(&card.name, group);
            }
        }
    }

    pub fn clear_all(&mut self) {
        for slot in self.groups.iter_mut() {
            slot.clear();
        }
    }

    pub fn group_of(&self, name: &str) -> Option<GroupKey> {
        self.group_of_key(&NameKey::new(name))
    }

    pub fn group_of_key(&self, key: &NameKey) -> Option<GroupKey> {
        GroupKey::ALL
            .into_iter()
            .find(|g| self.groups[g.slot()].iter().any(|m| &m.key == key))
    }

    pub fn contains(&self, name: &str, group: GroupKey) -> bool {
        self.group_of(name) == Some(group)
    }

    /// Members of one group in insertion order.
    pub fn members(&self, group: GroupKey) -> &[Member] {
        &self.groups[group.slot()]
    }

    /// Every assigned member with its group, in canonical order.
    pub fn canonical_order(&self) -> impl Iterator<Item = (GroupKey, &Member)> {
        GroupKey::ALL
            .into_iter()
            .flat_map(move |g| self.groups[g.slot()].iter().map(move |m| (g, m)))
    }

    pub fn snapshot(&self) -> MembershipSnapshot {
        MembershipSnapshot(
            self.canonical_order()
                .map(|(g, m)| (g, m.key.clone()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardRecord;

    fn names(assignment: &GroupAssignment, group: GroupKey) -> Vec<&str> {
        assignment
            .members(group)
            .iter()
            .map(|m| m.name.as_str())
            .collect()
    }

    #[test]
    fn test_classify_defaults() {
        assert_eq!(classify("Skeleton Army"), Some(GroupKey::ToxicTroop));
        assert_eq!(classify("mega knight"), Some(GroupKey::ToxicTroop));
        assert_eq!(classify("ZAP"), Some(GroupKey::CheapSpell));
        assert_eq!(classify("Hog Rider"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_assign_is_exclusive() {
        let mut groups = GroupAssignment::new();
        assert!(groups.assign("Hog Rider", GroupKey::ToxicTroop));
        assert_eq!(groups.group_of("hog rider"), Some(GroupKey::ToxicTroop));

        assert!(groups.assign("HOG RIDER", GroupKey::CheapSpell));
        assert_eq!(groups.group_of("Hog Rider"), Some(GroupKey::CheapSpell));
        assert!(groups.members(GroupKey::ToxicTroop).is_empty());
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_assign_same_group_is_noop() {
        let mut groups = GroupAssignment::new();
        groups.assign("Wizard", GroupKey::ToxicTroop);
        groups.assign("Valkyrie", GroupKey::ToxicTroop);
        let before = groups.clone();

        assert!(!groups.assign("wizard", GroupKey::ToxicTroop));
        assert_eq!(groups, before);
        assert_eq!(names(&groups, GroupKey::ToxicTroop), vec!["Wizard", "Valkyrie"]);
    }

    #[test]
    fn test_unassign() {
        let mut groups = GroupAssignment::default_membership();
        assert!(!groups.unassign("Zap", GroupKey::ToxicTroop));
        assert!(groups.unassign("zap", GroupKey::CheapSpell));
        assert!(!groups.unassign("zap", GroupKey::CheapSpell));
        assert_eq!(groups.group_of("Zap"), None);
    }

    #[test]
    fn test_reset_reproduces_classify() {
        let catalog = Catalog::from_records(vec![
            CardRecord::new("Zap"),
            CardRecord::new("Hog Rider"),
            CardRecord::new("Wizard"),
            CardRecord::new("The Log"),
        ]);
        let mut groups = GroupAssignment::new();
        groups.assign("Hog Rider", GroupKey::CheapSpell);
        groups.assign("Zap", GroupKey::ToxicTroop);

        groups.reset_to_default(&catalog);
        for card in &catalog {
            assert_eq!(groups.group_of(&card.name), classify(&card.name));
        }
        assert_eq!(names(&groups, GroupKey::CheapSpell), vec!["Zap", "The Log"]);
    }

    #[test]
    fn test_clear_all() {
        let mut groups = GroupAssignment::default_membership();
        assert_eq!(groups.len(), 6);
        groups.clear_all();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_default_membership_order() {
        let groups = GroupAssignment::default_membership();
        let order: Vec<_> = groups.canonical_order().map(|(_, m)| m.name.as_str()).collect();
        assert_eq!(
            order,
            vec!["Skeleton Army", "Wizard", "Valkyrie", "Mega Knight", "The Log", "Zap"]
        );
    }

    #[test]
    fn test_snapshot_tracks_membership() {
        let mut a = GroupAssignment::default_membership();
        let b = GroupAssignment::default_membership();
        assert_eq!(a.snapshot(), b.snapshot());

        a.assign("Zap", GroupKey::ToxicTroop);
        assert_ne!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_group_key_parsing() {
        assert_eq!("toxic".parse::<GroupKey>(), Ok(GroupKey::ToxicTroop));
        assert_eq!("Cheap_Spell".parse::<GroupKey>(), Ok(GroupKey::CheapSpell));
        assert!("other".parse::<GroupKey>().is_err());
    }
}
