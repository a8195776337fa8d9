use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::AddAssign;

use tracing::{debug, warn};
use uuid::Uuid;

use super::error::StoreError;
use super::query::WeddingQuery;
use super::record::{for_kind, with_record, DeleteRule, Entity, EntityKind, Record};
use crate::models::{
    Budget, BudgetItem, ChecklistCategory, ChecklistItem, Guest, Share, Timeline, TimelineEvent,
    Validate, Vendor, Wedding,
};

/// Id-keyed arena holding every record the store knows about.
///
/// Relationships live only in the records' back-references, so the wedding
/// side of a relationship can never disagree with the child side: aggregates
/// are rebuilt from back-references whenever they are read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub(crate) weddings: BTreeMap<Uuid, Wedding>,
    pub(crate) guests: BTreeMap<Uuid, Guest>,
    pub(crate) budgets: BTreeMap<Uuid, Budget>,
    pub(crate) budget_items: BTreeMap<Uuid, BudgetItem>,
    pub(crate) categories: BTreeMap<Uuid, ChecklistCategory>,
    pub(crate) checklist_items: BTreeMap<Uuid, ChecklistItem>,
    pub(crate) timelines: BTreeMap<Uuid, Timeline>,
    pub(crate) timeline_events: BTreeMap<Uuid, TimelineEvent>,
    pub(crate) vendors: BTreeMap<Uuid, Vendor>,
    pub(crate) shares: BTreeMap<Uuid, Share>,
}

/// Per-record result of merging remote weddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl MergeOutcome {
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }
}

impl AddAssign for MergeOutcome {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} updated, {} unchanged",
            self.inserted, self.updated, self.unchanged
        )
    }
}

/// Records to write and ids to remove to turn one graph into another.
///
/// Upserts are ordered parents first, deletes children first, so applying
/// them in order never leaves a dangling reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    pub upserts: Vec<Entity>,
    pub deletes: Vec<(EntityKind, Uuid)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletes.len()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<R: Record>(&self, id: Uuid) -> Option<&R> {
        R::table(self).get(&id)
    }

    pub fn all<R: Record>(&self) -> impl Iterator<Item = &R> {
        R::table(self).values()
    }

    /// Records whose back-reference points at `parent`.
    pub fn children<R: Record>(&self, parent: Uuid) -> impl Iterator<Item = &R> {
        R::table(self)
            .values()
            .filter(move |r| r.owner() == Some(parent))
    }

    pub fn contains(&self, kind: EntityKind, id: Uuid) -> bool {
        for_kind!(kind, R => R::table(self).contains_key(&id))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        for_kind!(kind, R => R::table(self).len())
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.count(*kind) == 0)
    }

    pub fn budget_of(&self, wedding_id: Uuid) -> Option<&Budget> {
        self.children::<Budget>(wedding_id).next()
    }

    /// Adds an entity together with any children nested in it.
    ///
    /// Either every record lands or none does.
    pub fn insert(&mut self, entity: impl Into<Entity>) -> Result<(), StoreError> {
        let entity: Entity = entity.into();
        let mut records = entity.flatten();
        for record in &mut records {
            record.attach_by_link()?;
        }
        self.check_insert(&records)?;
        for record in records {
            self.put(record);
        }
        Ok(())
    }

    fn check_insert(&self, records: &[Entity]) -> Result<(), StoreError> {
        let mut staged = HashSet::new();
        let mut budgeted = HashSet::new();

        for record in records {
            let (kind, id) = (record.kind(), record.id());
            if self.contains(kind, id) || !staged.insert((kind, id)) {
                return Err(StoreError::DuplicateKey { kind, id });
            }
            record.validate()?;

            let (Some(parent_kind), Some(owner)) = (kind.parent(), record.owner()) else {
                continue;
            };
            if !self.contains(parent_kind, owner) && !staged.contains(&(parent_kind, owner)) {
                return Err(StoreError::ConstraintViolation(format!(
                    "{} {} refers to missing {} {}",
                    kind, id, parent_kind, owner
                )));
            }
            if kind == EntityKind::Budget
                && (self.budget_of(owner).is_some() || !budgeted.insert(owner))
            {
                return Err(StoreError::ConstraintViolation(format!(
                    "wedding {} already has a budget",
                    owner
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn put(&mut self, entity: Entity) {
        with_record!(entity, r => self.put_record(r))
    }

    fn put_record<R: Record>(&mut self, record: R) {
        R::table_mut(self).insert(record.id(), record);
    }

    /// Applies `f` to a stored record and bumps its `updated_at`.
    ///
    /// Children pushed into the record's collections are inserted with the
    /// same rules as `insert`. Moving a record to another parent through
    /// either its back-reference or its link field moves both.
    pub fn update<R: Record>(
        &mut self,
        id: Uuid,
        f: impl FnOnce(&mut R),
    ) -> Result<R, StoreError> {
        let before = self
            .get::<R>(id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;
        let previous_owner = before.owner();
        let mut record = before.clone();
        f(&mut record);

        if record.id() != id {
            return Err(StoreError::ConstraintViolation(format!(
                "{} {} cannot change its id",
                R::KIND,
                id
            )));
        }
        sync_link(&before, &mut record)?;

        let entity: Entity = record.into();
        let mut parts = entity.flatten();
        let head = parts.remove(0);
        let owner = head.owner();
        if owner != previous_owner {
            if let (Some(parent_kind), Some(owner)) = (R::KIND.parent(), owner) {
                if !self.contains(parent_kind, owner) {
                    return Err(StoreError::ConstraintViolation(format!(
                        "{} {} refers to missing {} {}",
                        R::KIND,
                        id,
                        parent_kind,
                        owner
                    )));
                }
                if R::KIND == EntityKind::Budget && self.budget_of(owner).is_some() {
                    return Err(StoreError::ConstraintViolation(format!(
                        "wedding {} already has a budget",
                        owner
                    )));
                }
            }
        }
        head.validate()?;
        self.check_insert(&parts)?;

        let mut record = R::from_entity(head).ok_or_else(|| {
            StoreError::ConstraintViolation(format!("{} {} changed kind", R::KIND, id))
        })?;
        record.touch();
        self.put_record(record.clone());
        for part in parts {
            self.put(part);
        }
        Ok(record)
    }

    /// Removes a record and applies each dependent's delete rule.
    pub fn delete(&mut self, kind: EntityKind, id: Uuid) -> Result<(), StoreError> {
        if !self.contains(kind, id) {
            return Err(StoreError::NotFound { kind, id });
        }
        self.remove(kind, id, false);
        debug!(%kind, %id, "deleted");
        Ok(())
    }

    /// A record removed by cascade takes all of its own dependents with it.
    fn remove(&mut self, kind: EntityKind, id: Uuid, cascading: bool) {
        for_kind!(kind, R => {
            R::table_mut(self).remove(&id);
        });

        for child in kind.children() {
            let rule = if cascading {
                DeleteRule::Cascade
            } else {
                child.delete_rule()
            };
            match rule {
                DeleteRule::Cascade => {
                    for child_id in self.child_ids(child, id) {
                        self.remove(child, child_id, true);
                    }
                }
                DeleteRule::Nullify => self.nullify(child, id),
            }
        }
    }

    fn child_ids(&self, kind: EntityKind, parent: Uuid) -> Vec<Uuid> {
        for_kind!(kind, R => self.children::<R>(parent).map(|r| r.id()).collect())
    }

    fn nullify(&mut self, kind: EntityKind, parent: Uuid) {
        for_kind!(kind, R => {
            for record in R::table_mut(self).values_mut() {
                if record.owner() == Some(parent) {
                    record.set_owner(None);
                }
            }
        })
    }

    /// Insert-or-update a remote wedding and everything nested in it.
    ///
    /// Each record is resolved on its own: the newer `updated_at` wins and a
    /// tie goes to the incoming copy. Local records the remote copy does not
    /// mention stay attached, except a budget the remote one replaces.
    pub fn upsert_wedding(&mut self, wedding: Wedding) -> MergeOutcome {
        if let Err(e) = wedding.validate() {
            warn!(wedding = %wedding.id, "accepting remote wedding that fails validation: {}", e);
        }

        let wedding_id = wedding.id;
        let incoming_budget = wedding.budget.as_ref().map(|b| b.id);

        let mut outcome = MergeOutcome::default();
        for record in Entity::from(wedding).flatten() {
            outcome += with_record!(record, r => self.merge_record(r));
        }

        if let Some(budget_id) = incoming_budget {
            for budget in self.budgets.values_mut() {
                if budget.wedding == Some(wedding_id) && budget.id != budget_id {
                    debug!(budget = %budget.id, wedding = %wedding_id, "budget replaced by remote copy");
                    budget.wedding = None;
                }
            }
        }

        outcome
    }

    fn merge_record<R: Record>(&mut self, incoming: R) -> MergeOutcome {
        match R::table_mut(self).entry(incoming.id()) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
                MergeOutcome {
                    inserted: 1,
                    ..MergeOutcome::default()
                }
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if incoming.updated_at() >= existing.updated_at() && *existing != incoming {
                    *existing = incoming;
                    MergeOutcome {
                        updated: 1,
                        ..MergeOutcome::default()
                    }
                } else if let (None, Some(owner)) = (existing.owner(), incoming.owner()) {
                    // A detached local copy rejoins the parent the remote
                    // copy names, even when its fields are newer.
                    existing.set_owner(Some(owner));
                    existing.set_link(owner);
                    MergeOutcome {
                        updated: 1,
                        ..MergeOutcome::default()
                    }
                } else {
                    MergeOutcome {
                        unchanged: 1,
                        ..MergeOutcome::default()
                    }
                }
            }
        }
    }

    /// Hydrated weddings matching `query`, ordered by date then name.
    pub fn weddings(&self, query: &WeddingQuery) -> Vec<Wedding> {
        let mut found: Vec<Wedding> = self
            .weddings
            .values()
            .filter(|w| query.matches(w))
            .filter_map(|w| self.hydrate(w.id))
            .collect();
        found.sort_by(|a, b| {
            a.wedding_date
                .cmp(&b.wedding_date)
                .then_with(|| a.name.cmp(&b.name))
        });
        found
    }

    /// Rebuilds the aggregate rooted at `id` from back-references.
    pub fn hydrate(&self, id: Uuid) -> Option<Wedding> {
        let mut wedding = self.weddings.get(&id)?.clone();

        wedding.guests = self.owned_by(id);
        wedding.wedding_vendors = self.owned_by(id);
        wedding.shared_with = self.owned_by(id);

        wedding.budget = self.owned_by::<Budget>(id).into_iter().next().map(|mut budget| {
            budget.items = self.owned_by(budget.id);
            budget
        });

        let mut checklist = self.owned_by::<ChecklistCategory>(id);
        checklist.sort_by_key(|c| c.position);
        for category in &mut checklist {
            category.tasks = self.owned_by(category.id);
            category.tasks.sort_by_key(|t| t.position);
        }
        wedding.checklist = checklist;

        let mut timelines = self.owned_by::<Timeline>(id);
        timelines.sort_by_key(|t| t.date);
        for timeline in &mut timelines {
            timeline.events = self.owned_by(timeline.id);
            timeline.events.sort_by_key(|e| e.start_at);
        }
        wedding.timelines = timelines;

        Some(wedding)
    }

    fn owned_by<R: Record>(&self, parent: Uuid) -> Vec<R> {
        let mut records: Vec<R> = self.children::<R>(parent).cloned().collect();
        records.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        records
    }

    /// What has to be written to turn `old` into `new`.
    pub fn diff(old: &Graph, new: &Graph) -> ChangeSet {
        let mut changes = ChangeSet::default();
        for kind in EntityKind::ALL {
            for_kind!(kind, R => diff_table::<R>(old, new, &mut changes));
        }
        changes.deletes.reverse();
        changes
    }
}

// The back-reference and the link field always name the same parent.
fn sync_link<R: Record>(before: &R, after: &mut R) -> Result<(), StoreError> {
    let owner_moved = after.owner() != before.owner();
    let link_moved = after.link_id() != before.link_id();
    match (owner_moved, link_moved, after.owner()) {
        (true, false, Some(owner)) => after.set_link(owner),
        (false, true, _) => {
            let link = after.link_id();
            after.set_owner(link);
        }
        (true, true, Some(owner)) if Some(owner) != after.link_id() => {
            return Err(StoreError::ConstraintViolation(format!(
                "{} {} is attached to {} but linked to {:?}",
                R::KIND,
                after.id(),
                owner,
                after.link_id()
            )));
        }
        _ => {}
    }
    Ok(())
}

fn diff_table<R: Record>(old: &Graph, new: &Graph, changes: &mut ChangeSet) {
    let (before, after) = (R::table(old), R::table(new));
    for (id, record) in after {
        if before.get(id) != Some(record) {
            changes.upserts.push(record.clone().into());
        }
    }
    for id in before.keys() {
        if !after.contains_key(id) {
            changes.deletes.push((R::KIND, *id));
        }
    }
}
