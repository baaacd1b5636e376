use clap::Subcommand;
use dayplan_core::schedule::Tag;
use dayplan_core::storage::PlanDb;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum TagAction {
    /// Create a new tag
    Add {
        /// Tag name, shown to the advisor as the task category
        name: String,
        /// Display color (e.g. "#3b82f6")
        #[arg(long)]
        color: Option<String>,
    },
    /// List tags
    List,
    /// Delete a tag; its tasks become uncategorized
    Delete {
        /// Tag ID
        id: String,
    },
}

pub fn run(action: TagAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        TagAction::Add { name, color } => {
            if name.trim().is_empty() {
                return Err("tag name must not be empty".into());
            }
            let tag = Tag {
                id: Uuid::new_v4().to_string(),
                name,
                color,
            };
            db.create_tag(&tag)?;
            println!("Tag created: {}", tag.id);
            println!("{}", serde_json::to_string_pretty(&tag)?);
        }
        TagAction::List => {
            println!("{}", serde_json::to_string_pretty(&db.list_tags()?)?);
        }
        TagAction::Delete { id } => {
            db.delete_tag(&id)?;
            println!("Tag deleted: {id}");
        }
    }
    Ok(())
}
