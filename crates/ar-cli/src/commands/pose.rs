use std::path::Path;

use ar_core::{JulianDate, calculate_pose};
use chrono::{DateTime, Utc};
use colored::Colorize;

pub fn run(path: &Path, name: &str, time: Option<&str>, json: bool) -> Result<(), String> {
    let scene = super::load_scene(path)?;
    let entity = super::find_entity(&scene, name)?;
    let time = parse_time(time)?;

    let pose = calculate_pose(&scene, entity, time).map_err(|e| e.to_string())?;
    let frame = super::frame_label(&scene, pose.reference_frame());

    if json {
        let mut value = serde_json::to_value(&pose).map_err(|e| e.to_string())?;
        value["entity"] = scene.entity_name(entity).into();
        value["reference_frame"] = frame.into();
        let out = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    let undefined = || "undefined".dimmed().to_string();
    let position = pose
        .position()
        .map(|p| format!("({:.6}, {:.6}, {:.6})", p.x, p.y, p.z))
        .unwrap_or_else(undefined);
    let orientation = pose
        .orientation()
        .map(|q| format!("({:.6}, {:.6}, {:.6}, {:.6})", q.x, q.y, q.z, q.w))
        .unwrap_or_else(undefined);

    println!(
        "  {} @ {}",
        scene.entity_name(entity).bold(),
        pose.time().to_rfc3339()
    );
    println!("  frame:       {frame}");
    println!("  position:    {position}");
    println!("  orientation: {orientation}");

    Ok(())
}

fn parse_time(time: Option<&str>) -> Result<JulianDate, String> {
    match time {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| format!("invalid time \"{s}\": {e}")),
        None => Ok(Utc::now()),
    }
}
