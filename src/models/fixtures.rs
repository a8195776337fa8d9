//! Shared test data.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use super::*;

pub fn wedding() -> Wedding {
    let date = Utc.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap();
    Wedding::new(
        "Perfect Wedding",
        LocationPoint::prague(),
        date,
        UserInfo::new(Uuid::new_v4(), "info@weddmate.com"),
    )
}

/// Every entity kind present, every collection non-empty. Vendor and share
/// optionals are all populated; `wedding()` covers the all-absent side.
pub fn full_wedding() -> Wedding {
    let w = wedding();
    let date = w.wedding_date;

    let mut guest = Guest::new(w.id, "Jana", "Novak")
        .with_email("jana@example.com")
        .with_status(InvitationStatus::Confirmed)
        .with_plus_ones(1);
    guest.wedding = Some(w.id);
    let child = Guest::new(w.id, "Tom", "Novak").with_age(GuestAge::Child);

    let mut budget = Budget::new(w.id, 300_000.0, 250_000.0, "CZK");
    let mut deposit = BudgetItem::new(
        budget.id,
        "Venue deposit",
        "venue",
        50_000.0,
        "CZK",
        date,
        PaymentType::Deposit,
    );
    deposit.mark_paid(date, Some("Groom".into()));
    budget = budget.with_items(vec![deposit]);

    let category = ChecklistCategory::new(
        w.id,
        "Venue",
        "venue",
        0,
        HashImage::new("https://cdn.example.com/v.jpg", "hash"),
    );
    let task = ChecklistItem::new(category.id, "Sign contract");
    let category = category.with_tasks(vec![task]);

    let timeline = Timeline::new(w.id, "Wedding day", date);
    let event = TimelineEvent::new(timeline.id, "Ceremony", date, date);
    let timeline = timeline.with_events(vec![event]);

    let mut vendor = Vendor::new(w.id, "user-1", "Foto").with_categories(vec!["photo".into()]);
    vendor.email = Some("foto@example.com".into());
    vendor.phone = Some("+420 777 000 111".into());
    vendor.image_url = Some("https://cdn.example.com/foto.jpg".into());
    vendor.address = Some("Karlova 5, Praha".into());
    vendor.web_url = Some("https://foto.example.com".into());
    let mut share = Share::new(w.id, "mom@example.com");
    share.status = ShareStatus::Accepted;
    share.user_id = Some("user-2".into());

    let mut w = w
        .with_guests(vec![guest, child])
        .with_budget(budget)
        .with_checklist(vec![category])
        .with_timelines(vec![timeline])
        .with_vendors(vec![vendor])
        .with_shares(vec![share]);
    w.selected_vendors = vec!["foto".into()];
    w.shortlisted_vendors = vec!["foto".into(), "kvetiny".into()];
    w
}
