use clap::Args;
use dayplan_core::storage::PlanDb;
use dayplan_core::timeline::{find_free_gaps, layout_day};
use dayplan_core::Config;
use serde::Serialize;

use super::resolve_date;

#[derive(Args)]
pub struct LayoutArgs {
    /// Day (YYYY-MM-DD, default: today)
    #[arg(long)]
    date: Option<String>,
    /// Print placements as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct LayoutRow<'a> {
    title: &'a str,
    start_time: String,
    end_time: String,
    fixed: bool,
    #[serde(flatten)]
    placement: &'a dayplan_core::BlockPlacement,
}

pub fn run(args: LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = PlanDb::open()?;
    let date = resolve_date(args.date.as_deref())?;
    let tasks = db.list_tasks_for_day(date)?;
    let placements = layout_day(&tasks, &config.view);

    let rows: Vec<LayoutRow> = placements
        .iter()
        .filter_map(|placement| {
            let task = tasks.iter().find(|t| t.id == placement.task_id)?;
            Some(LayoutRow {
                title: &task.title,
                start_time: task.start_time.to_string(),
                end_time: task.end_time.to_string(),
                fixed: task.fixed,
                placement,
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Layout for {date}");
    if rows.is_empty() {
        println!("  (no tasks)");
    }
    for row in &rows {
        println!(
            "  {}-{}  lane {}/{}  {:>6.1}px +{:>5.1}px  {}{}",
            row.start_time,
            row.end_time,
            row.placement.lane + 1,
            row.placement.lane_count,
            row.placement.top_px,
            row.placement.height_px,
            row.title,
            if row.fixed { " [fixed]" } else { "" },
        );
    }

    let policy = &config.policy;
    let gaps = find_free_gaps(
        &tasks,
        policy.placement_start as i32,
        policy.placement_end as i32,
        policy.min_gap_minutes as i32,
    );
    if !gaps.is_empty() {
        println!("Free");
        for gap in gaps {
            println!("  {}  {} min ({})", gap.label(), gap.duration_minutes(), gap.size.as_str());
        }
    }
    Ok(())
}
