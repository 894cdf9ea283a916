//! Human-readable renderings of the family record

use crate::family::{FamilyData, FamilyMember};
use std::fmt::Write;

fn member_line(member: &FamilyMember) -> String {
    let mut line = member.label();
    if let Some(age) = member.age {
        let _ = write!(line, ", age {age}");
    }
    if !member.attributes.is_empty() {
        let attrs: Vec<&str> = member.attributes.iter().map(String::as_str).collect();
        let _ = write!(line, ": {}", attrs.join(", "));
    }
    line
}

fn members_suffix(members: Option<&Vec<String>>) -> String {
    match members {
        Some(members) if !members.is_empty() => format!(" ({})", members.join(", ")),
        _ => String::new(),
    }
}

/// Grouped listing of everything known, used as restore context
pub fn render_context(data: &FamilyData) -> String {
    if data.is_empty() {
        return "No family details were recorded previously.".to_string();
    }

    let mut out = String::new();

    if !data.family_members.is_empty() {
        out.push_str("Family members:\n");
        for member in &data.family_members {
            let _ = writeln!(out, "- {}", member_line(member));
        }
    }

    if !data.relationships.is_empty() {
        out.push_str("Relationships:\n");
        for rel in &data.relationships {
            let _ = write!(out, "- {}", rel.kind);
            if !rel.members.is_empty() {
                let _ = write!(out, " between {}", rel.members.join(" and "));
            }
            let details: Vec<&str> = [rel.quality.as_deref(), rel.duration.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if !details.is_empty() {
                let _ = write!(out, " ({})", details.join(", "));
            }
            out.push('\n');
        }
    }

    if !data.dynamics.is_empty() {
        out.push_str("Dynamics:\n");
        for dynamic in &data.dynamics {
            let _ = writeln!(
                out,
                "- {}: {}{}",
                dynamic.kind,
                dynamic.pattern,
                members_suffix(dynamic.members.as_ref())
            );
        }
    }

    if !data.events.is_empty() {
        out.push_str("Events:\n");
        for event in &data.events {
            let _ = writeln!(
                out,
                "- {}: {}{}",
                event.kind,
                event.description,
                members_suffix(event.members.as_ref())
            );
        }
    }

    out.trim_end().to_string()
}

/// Area a follow-up question could be drawn from, most specific first
pub fn follow_up_area(data: &FamilyData) -> Option<&'static str> {
    if !data.dynamics.is_empty() {
        Some("family dynamics")
    } else if !data.events.is_empty() {
        Some("significant family events")
    } else if !data.relationships.is_empty() {
        Some("family relationships")
    } else if !data.family_members.is_empty() {
        Some("family members")
    } else {
        None
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// One-line summary returned after a save
pub fn render_save_summary(data: &FamilyData) -> String {
    if data.is_empty() {
        return "No family details recorded yet.".to_string();
    }

    let mut out = format!(
        "Recorded {}",
        plural(data.family_members.len(), "family member", "family members")
    );
    if !data.family_members.is_empty() {
        let labels: Vec<String> = data.family_members.iter().map(FamilyMember::label).collect();
        let _ = write!(out, " ({})", labels.join(", "));
    }
    let _ = write!(
        out,
        ", {}, {}, {}.",
        plural(data.relationships.len(), "relationship", "relationships"),
        plural(data.dynamics.len(), "dynamic", "dynamics"),
        plural(data.events.len(), "event", "events"),
    );
    out
}
