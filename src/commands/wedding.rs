use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};
use std::io::{self, Write};
use uuid::Uuid;

use super::OutputFormat;
use crate::models::Wedding;
use crate::store::{EntityKind, StoreHandle, WeddingQuery};

#[derive(Args)]
pub struct WeddingCommand {
    #[command(subcommand)]
    pub command: WeddingSubcommand,
}

#[derive(Subcommand)]
pub enum WeddingSubcommand {
    /// List stored weddings
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only weddings whose name contains this text
        #[arg(long)]
        name: Option<String>,

        /// Only weddings owned by this user id
        #[arg(long)]
        owner: Option<Uuid>,

        /// Only weddings on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Only weddings on or before this date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<NaiveDate>,
    },

    /// Show a wedding's details
    Show {
        /// Wedding ID (UUID) or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a wedding and its checklist
    Delete {
        /// Wedding ID (UUID) or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl WeddingCommand {
    pub async fn run(&self, store: &StoreHandle) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeddingSubcommand::List {
                format,
                name,
                owner,
                from,
                until,
            } => {
                let query = list_query(name.as_deref(), *owner, *from, *until);
                let weddings = store.weddings(&query);

                if weddings.is_empty() {
                    println!("No weddings found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&weddings)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  {:<10}  {:<30}  GUESTS", "ID", "DATE", "NAME");
                        println!("{}", "-".repeat(88));
                        for wedding in &weddings {
                            println!(
                                "{:<36}  {:<10}  {:<30}  {}",
                                wedding.id,
                                wedding.wedding_date.format("%Y-%m-%d"),
                                truncate(&wedding.name, 30),
                                wedding.guests.len()
                            );
                        }
                        println!("\nTotal: {} wedding(s)", weddings.len());
                    }
                }
                Ok(())
            }

            WeddingSubcommand::Show { identifier, format } => {
                let wedding = find_wedding(store, identifier)
                    .ok_or_else(|| format!("Wedding not found: {}", identifier))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&wedding)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", wedding);
                    }
                }
                Ok(())
            }

            WeddingSubcommand::Delete { identifier, force } => {
                let wedding = find_wedding(store, identifier)
                    .ok_or_else(|| format!("Wedding not found: {}", identifier))?;

                if !force {
                    print!("Delete wedding '{}'? [y/N] ", wedding.name);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                store.delete(EntityKind::Wedding, wedding.id).await?;
                store.save().await?;
                println!("Deleted wedding: {}", wedding.name);
                Ok(())
            }
        }
    }
}

fn list_query(
    name: Option<&str>,
    owner: Option<Uuid>,
    from: Option<NaiveDate>,
    until: Option<NaiveDate>,
) -> WeddingQuery {
    let mut query = WeddingQuery::all();
    if let Some(name) = name {
        query = query.name_contains(name);
    }
    if let Some(owner) = owner {
        query = query.owned_by(owner);
    }
    match (from, until) {
        (Some(from), Some(until)) => query.between(start_of_day(from), end_of_day(until)),
        (from, until) => {
            query.from = from.map(start_of_day);
            query.until = until.map(end_of_day);
            query
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + chrono::Duration::days(1) - chrono::Duration::milliseconds(1)
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let head: String = name.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Looks a wedding up by id, then by exact name (case-insensitive).
fn find_wedding(store: &StoreHandle, identifier: &str) -> Option<Wedding> {
    let query = match Uuid::parse_str(identifier) {
        Ok(id) => WeddingQuery::by_id(id),
        Err(_) => WeddingQuery::all(),
    };
    store
        .weddings(&query)
        .into_iter()
        .find(|w| w.id.to_string() == identifier || w.name.eq_ignore_ascii_case(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::wedding;
    use crate::store::Store;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn store_with(weddings: Vec<Wedding>) -> (StoreHandle, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path().join("weddmate.db"))
            .await
            .unwrap();
        store.merge_weddings(weddings).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_find_wedding_by_id_and_name() {
        let w = wedding();
        let id = w.id;
        let (store, _temp) = store_with(vec![w]).await;

        assert_eq!(find_wedding(&store, &id.to_string()).unwrap().id, id);
        assert_eq!(find_wedding(&store, "perfect wedding").unwrap().id, id);
        assert!(find_wedding(&store, "Other").is_none());
        assert!(find_wedding(&store, &Uuid::new_v4().to_string()).is_none());
    }

    #[tokio::test]
    async fn test_delete_command_removes_wedding() {
        let w = wedding();
        let id = w.id;
        let (store, _temp) = store_with(vec![w]).await;

        let cmd = WeddingCommand {
            command: WeddingSubcommand::Delete {
                identifier: id.to_string(),
                force: true,
            },
        };
        cmd.run(&store).await.unwrap();

        assert!(store.weddings(&WeddingQuery::all()).is_empty());
        assert!(!store.has_changes().await.unwrap());
    }

    #[tokio::test]
    async fn test_show_unknown_wedding_fails() {
        let (store, _temp) = store_with(vec![]).await;
        let cmd = WeddingCommand {
            command: WeddingSubcommand::Show {
                identifier: "nobody".into(),
                format: OutputFormat::Text,
            },
        };
        let err = cmd.run(&store).await.unwrap_err();
        assert!(err.to_string().contains("Wedding not found"));
    }

    #[test]
    fn test_list_query_date_bounds_are_inclusive() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let query = list_query(None, None, Some(day), Some(day));

        let mut w = wedding();
        w.wedding_date = Utc.with_ymd_and_hms(2025, 6, 21, 23, 59, 59).unwrap();
        assert!(query.matches(&w));
        w.wedding_date = Utc.with_ymd_and_hms(2025, 6, 22, 0, 0, 0).unwrap();
        assert!(!query.matches(&w));

        let open_ended = list_query(None, None, Some(day), None);
        w.wedding_date = Utc.with_ymd_and_hms(2090, 1, 1, 0, 0, 0).unwrap();
        assert!(open_ended.matches(&w));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate(&"x".repeat(40), 10), "xxxxxxx...");
    }
}
