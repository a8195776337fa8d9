mod budget;
mod checklist;
mod guest;
mod location;
mod share;
mod timeline;
pub mod timestamp;
mod validation;
mod vendor;
mod wedding;

#[cfg(test)]
pub(crate) mod fixtures;

pub use budget::{Budget, BudgetItem, PaymentStatus, PaymentType};
pub use checklist::{
    ChecklistCategory, ChecklistItem, HashImage, DEFAULT_ACTION, DEFAULT_PERCENT_IN_PLANNING,
};
pub use guest::{Address, Guest, GuestAge, InvitationStatus};
pub use location::LocationPoint;
pub use share::{Permission, Share, ShareArea, ShareStatus};
pub use timeline::{Timeline, TimelineEvent, DEFAULT_EVENT_COLOR};
pub use validation::{Validate, ValidationError};
pub use vendor::Vendor;
pub use wedding::{UserInfo, Wedding};
