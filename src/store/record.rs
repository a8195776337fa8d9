//! Detached records and the entity kinds the store knows about.
//!
//! Inside the store every entity is kept *detached*: child collections are
//! empty and relationships are expressed only through the back-reference id
//! (`Guest::wedding`, `BudgetItem::budget`, ...). Aggregates are split into
//! records on the way in and rebuilt from back-references on the way out.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::error::StoreError;
use super::graph::Graph;
use crate::models::{
    Budget, BudgetItem, ChecklistCategory, ChecklistItem, Guest, Share, Timeline, TimelineEvent,
    Validate, ValidationError, Vendor, Wedding,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Wedding,
    Budget,
    BudgetItem,
    ChecklistCategory,
    ChecklistItem,
    Timeline,
    TimelineEvent,
    Guest,
    Vendor,
    Share,
}

/// What happens to a dependent when its parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRule {
    Cascade,
    Nullify,
}

impl EntityKind {
    /// Every kind, parents before their children.
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Wedding,
        EntityKind::Budget,
        EntityKind::BudgetItem,
        EntityKind::ChecklistCategory,
        EntityKind::ChecklistItem,
        EntityKind::Timeline,
        EntityKind::TimelineEvent,
        EntityKind::Guest,
        EntityKind::Vendor,
        EntityKind::Share,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Wedding => "weddings",
            EntityKind::Budget => "budgets",
            EntityKind::BudgetItem => "budget_items",
            EntityKind::ChecklistCategory => "checklist_categories",
            EntityKind::ChecklistItem => "checklist_items",
            EntityKind::Timeline => "timelines",
            EntityKind::TimelineEvent => "timeline_events",
            EntityKind::Guest => "guests",
            EntityKind::Vendor => "vendors",
            EntityKind::Share => "shares",
        }
    }

    pub fn parent(&self) -> Option<EntityKind> {
        match self {
            EntityKind::Wedding => None,
            EntityKind::BudgetItem => Some(EntityKind::Budget),
            EntityKind::ChecklistItem => Some(EntityKind::ChecklistCategory),
            EntityKind::TimelineEvent => Some(EntityKind::Timeline),
            EntityKind::Budget
            | EntityKind::ChecklistCategory
            | EntityKind::Timeline
            | EntityKind::Guest
            | EntityKind::Vendor
            | EntityKind::Share => Some(EntityKind::Wedding),
        }
    }

    /// Rule applied to this kind when its parent is deleted.
    pub fn delete_rule(&self) -> DeleteRule {
        match self {
            EntityKind::ChecklistCategory => DeleteRule::Cascade,
            _ => DeleteRule::Nullify,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = EntityKind> + '_ {
        EntityKind::ALL
            .into_iter()
            .filter(move |kind| kind.parent() == Some(*self))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Wedding => "wedding",
            EntityKind::Budget => "budget",
            EntityKind::BudgetItem => "budget item",
            EntityKind::ChecklistCategory => "checklist category",
            EntityKind::ChecklistItem => "checklist item",
            EntityKind::Timeline => "timeline",
            EntityKind::TimelineEvent => "timeline event",
            EntityKind::Guest => "guest",
            EntityKind::Vendor => "vendor",
            EntityKind::Share => "share",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "wedding" => Ok(EntityKind::Wedding),
            "budget" => Ok(EntityKind::Budget),
            "budgetitem" => Ok(EntityKind::BudgetItem),
            "checklistcategory" | "category" => Ok(EntityKind::ChecklistCategory),
            "checklistitem" | "task" => Ok(EntityKind::ChecklistItem),
            "timeline" => Ok(EntityKind::Timeline),
            "timelineevent" | "event" => Ok(EntityKind::TimelineEvent),
            "guest" => Ok(EntityKind::Guest),
            "vendor" => Ok(EntityKind::Vendor),
            "share" => Ok(EntityKind::Share),
            _ => Err(format!("Unknown entity kind '{}'", s)),
        }
    }
}

/// A detached entity as the store holds it.
pub trait Record:
    Clone + PartialEq + Serialize + DeserializeOwned + Validate + Into<Entity> + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> Uuid;

    /// Back-reference to the parent record.
    fn owner(&self) -> Option<Uuid>;

    fn set_owner(&mut self, owner: Option<Uuid>);

    /// Foreign-key-style link field carried alongside the back-reference.
    fn link_id(&self) -> Option<Uuid>;

    fn set_link(&mut self, link: Uuid);

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> DateTime<Utc>;

    fn touch(&mut self);

    fn table(graph: &Graph) -> &BTreeMap<Uuid, Self>;

    fn table_mut(graph: &mut Graph) -> &mut BTreeMap<Uuid, Self>;

    fn from_entity(entity: Entity) -> Option<Self>;
}

macro_rules! impl_record {
    ($ty:ident, $table:ident, $owner:ident, $link:ident) => {
        impl Record for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn id(&self) -> Uuid {
                self.id
            }

            fn owner(&self) -> Option<Uuid> {
                self.$owner
            }

            fn set_owner(&mut self, owner: Option<Uuid>) {
                self.$owner = owner;
            }

            fn link_id(&self) -> Option<Uuid> {
                Some(self.$link)
            }

            fn set_link(&mut self, link: Uuid) {
                self.$link = link;
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn updated_at(&self) -> DateTime<Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                $ty::touch(self)
            }

            fn table(graph: &Graph) -> &BTreeMap<Uuid, Self> {
                &graph.$table
            }

            fn table_mut(graph: &mut Graph) -> &mut BTreeMap<Uuid, Self> {
                &mut graph.$table
            }

            fn from_entity(entity: Entity) -> Option<Self> {
                match entity {
                    Entity::$ty(record) => Some(record),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Entity {
            fn from(record: $ty) -> Self {
                Entity::$ty(record)
            }
        }
    };
}

impl_record!(Guest, guests, wedding, wedding_id);
impl_record!(Budget, budgets, wedding, wedding_id);
impl_record!(BudgetItem, budget_items, budget, budget_id);
impl_record!(ChecklistCategory, categories, wedding, wedding_id);
impl_record!(ChecklistItem, checklist_items, category, category_id);
impl_record!(Timeline, timelines, wedding, wedding_id);
impl_record!(TimelineEvent, timeline_events, timeline, timeline_id);
impl_record!(Vendor, vendors, wedding, wedding_id);
impl_record!(Share, shares, wedding, wedding_id);

impl Record for Wedding {
    const KIND: EntityKind = EntityKind::Wedding;

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Option<Uuid> {
        None
    }

    fn set_owner(&mut self, _owner: Option<Uuid>) {}

    fn link_id(&self) -> Option<Uuid> {
        None
    }

    fn set_link(&mut self, _link: Uuid) {}

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        Wedding::touch(self)
    }

    fn table(graph: &Graph) -> &BTreeMap<Uuid, Self> {
        &graph.weddings
    }

    fn table_mut(graph: &mut Graph) -> &mut BTreeMap<Uuid, Self> {
        &mut graph.weddings
    }

    fn from_entity(entity: Entity) -> Option<Self> {
        match entity {
            Entity::Wedding(record) => Some(record),
            _ => None,
        }
    }
}

impl From<Wedding> for Entity {
    fn from(record: Wedding) -> Self {
        Entity::Wedding(record)
    }
}

/// Any entity, attached or detached.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Wedding(Wedding),
    Guest(Guest),
    Budget(Budget),
    BudgetItem(BudgetItem),
    ChecklistCategory(ChecklistCategory),
    ChecklistItem(ChecklistItem),
    Timeline(Timeline),
    TimelineEvent(TimelineEvent),
    Vendor(Vendor),
    Share(Share),
}

/// Runs `$body` with `$record` bound to the concrete record inside `$entity`.
macro_rules! with_record {
    ($entity:expr, $record:ident => $body:expr) => {
        match $entity {
            Entity::Wedding($record) => $body,
            Entity::Guest($record) => $body,
            Entity::Budget($record) => $body,
            Entity::BudgetItem($record) => $body,
            Entity::ChecklistCategory($record) => $body,
            Entity::ChecklistItem($record) => $body,
            Entity::Timeline($record) => $body,
            Entity::TimelineEvent($record) => $body,
            Entity::Vendor($record) => $body,
            Entity::Share($record) => $body,
        }
    };
}
pub(crate) use with_record;

/// Runs `$body` with the type alias `$R` bound to the record type of `$kind`.
macro_rules! for_kind {
    ($kind:expr, $R:ident => $body:expr) => {
        match $kind {
            EntityKind::Wedding => {
                type $R = $crate::models::Wedding;
                $body
            }
            EntityKind::Budget => {
                type $R = $crate::models::Budget;
                $body
            }
            EntityKind::BudgetItem => {
                type $R = $crate::models::BudgetItem;
                $body
            }
            EntityKind::ChecklistCategory => {
                type $R = $crate::models::ChecklistCategory;
                $body
            }
            EntityKind::ChecklistItem => {
                type $R = $crate::models::ChecklistItem;
                $body
            }
            EntityKind::Timeline => {
                type $R = $crate::models::Timeline;
                $body
            }
            EntityKind::TimelineEvent => {
                type $R = $crate::models::TimelineEvent;
                $body
            }
            EntityKind::Guest => {
                type $R = $crate::models::Guest;
                $body
            }
            EntityKind::Vendor => {
                type $R = $crate::models::Vendor;
                $body
            }
            EntityKind::Share => {
                type $R = $crate::models::Share;
                $body
            }
        }
    };
}
pub(crate) use for_kind;

impl Entity {
    pub fn kind(&self) -> EntityKind {
        with_record!(self, r => record_kind(r))
    }

    pub fn id(&self) -> Uuid {
        with_record!(self, r => r.id())
    }

    pub fn owner(&self) -> Option<Uuid> {
        with_record!(self, r => r.owner())
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        with_record!(self, r => r.updated_at())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        with_record!(self, r => r.validate())
    }

    /// Attaches a record that only names its parent through the link field.
    /// A back-reference and link field naming different parents is rejected.
    pub(crate) fn attach_by_link(&mut self) -> Result<(), StoreError> {
        with_record!(self, r => attach_by_link(r))
    }

    /// Splits an aggregate into detached records, parents first, pointing
    /// every child's back-reference at the parent it was nested under.
    pub fn flatten(self) -> Vec<Entity> {
        let mut out = Vec::new();
        match self {
            Entity::Wedding(mut wedding) => {
                let id = wedding.id;
                let guests = std::mem::take(&mut wedding.guests);
                let budget = wedding.budget.take();
                let checklist = std::mem::take(&mut wedding.checklist);
                let timelines = std::mem::take(&mut wedding.timelines);
                let vendors = std::mem::take(&mut wedding.wedding_vendors);
                let shares = std::mem::take(&mut wedding.shared_with);
                out.push(Entity::Wedding(wedding));

                if let Some(budget) = budget {
                    push_owned(&mut out, budget, id);
                }
                for category in checklist {
                    push_owned(&mut out, category, id);
                }
                for timeline in timelines {
                    push_owned(&mut out, timeline, id);
                }
                for guest in guests {
                    push_owned(&mut out, guest, id);
                }
                for vendor in vendors {
                    push_owned(&mut out, vendor, id);
                }
                for share in shares {
                    push_owned(&mut out, share, id);
                }
            }
            Entity::Budget(mut budget) => {
                let items = std::mem::take(&mut budget.items);
                let id = budget.id;
                out.push(Entity::Budget(budget));
                for item in items {
                    push_owned(&mut out, item, id);
                }
            }
            Entity::ChecklistCategory(mut category) => {
                let tasks = std::mem::take(&mut category.tasks);
                let id = category.id;
                out.push(Entity::ChecklistCategory(category));
                for task in tasks {
                    push_owned(&mut out, task, id);
                }
            }
            Entity::Timeline(mut timeline) => {
                let events = std::mem::take(&mut timeline.events);
                let id = timeline.id;
                out.push(Entity::Timeline(timeline));
                for event in events {
                    push_owned(&mut out, event, id);
                }
            }
            leaf => out.push(leaf),
        }
        out
    }
}

fn record_kind<R: Record>(_: &R) -> EntityKind {
    R::KIND
}

fn attach_by_link<R: Record>(record: &mut R) -> Result<(), StoreError> {
    if R::KIND.parent().is_none() {
        return Ok(());
    }
    match (record.owner(), record.link_id()) {
        (None, Some(link)) => record.set_owner(Some(link)),
        (Some(owner), Some(link)) if owner != link => {
            return Err(StoreError::ConstraintViolation(format!(
                "{} {} is attached to {} but linked to {}",
                R::KIND,
                record.id(),
                owner,
                link
            )));
        }
        _ => {}
    }
    Ok(())
}

fn push_owned<R: Record>(out: &mut Vec<Entity>, mut record: R, owner: Uuid) {
    record.set_owner(Some(owner));
    record.set_link(owner);
    let entity: Entity = record.into();
    out.extend(entity.flatten());
}
