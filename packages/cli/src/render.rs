//! Plain terminal rendering of projected dashboard data.

use mls_locator_dashboard::projection::{
    ChartBucket, DashboardView, DetailPanel, TablePage, ViewStateView,
};

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}

pub fn print_table(title: &str, table: &TablePage) {
    println!("{title}");

    let header = ["Code", "Name", "Mandal", "Village", "Status", "Incharge", "Phone"];
    let rows: Vec<[String; 7]> = table
        .rows
        .iter()
        .map(|r| {
            [
                r.code.clone(),
                r.name.clone(),
                r.mandal.clone(),
                r.village.clone(),
                r.status.to_string(),
                r.incharge.clone(),
                r.phone.clone(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, value) in widths.iter_mut().zip(row) {
            *w = (*w).max(value.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(c, w)| pad(c, w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("  {}", line(&header.map(String::from)));
    for row in &rows {
        println!("  {}", line(row));
    }
    if rows.is_empty() {
        println!("  No MLS points match the current filters.");
    }

    let mut nav = Vec::new();
    if table.has_prev {
        nav.push("prev");
    }
    if table.has_next {
        nav.push("next");
    }
    println!(
        "  {} (page {}/{}){}",
        table.info,
        table.page,
        table.page_count.max(1),
        if nav.is_empty() {
            String::new()
        } else {
            format!(" [{}]", nav.join(", "))
        }
    );
}

pub fn print_distribution(title: &str, buckets: &[ChartBucket]) {
    println!("{title}");
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0);
    let width = buckets
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    for bucket in buckets {
        let bar_len = if max == 0 { 0 } else { bucket.count * 30 / max };
        println!(
            "  {} {:>5} {}",
            pad(&bucket.label, width),
            bucket.count,
            "#".repeat(bar_len)
        );
    }
}

pub fn print_detail(panel: &DetailPanel) {
    println!("{} ({})", panel.title, panel.subtitle);
    for section in &panel.sections {
        println!();
        println!("  {}", section.title);
        let width = section
            .fields
            .iter()
            .map(|f| f.label.chars().count())
            .max()
            .unwrap_or(0);
        for field in &section.fields {
            println!("    {}  {}", pad(&field.label, width), field.value);
        }
    }
}

/// Prints one full frame of the dashboard.
pub fn print_view(view: &DashboardView) {
    println!();
    println!(
        "== {} == user: {} | backend: {}",
        view.info.scope_title, view.user, view.connectivity
    );
    println!("{}", view.info.description);
    if let Some(at) = view.info.last_updated {
        println!("Last updated: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    match &view.state {
        ViewStateView::Loading => {
            println!("Loading...");
            return;
        }
        ViewStateView::Error(message) => {
            println!("Error: {message}");
            println!("Use \"Retry\" to reload from a clean selection.");
            return;
        }
        ViewStateView::Ready => {}
    }

    let s = &view.stats;
    println!();
    println!(
        "Total: {}  Active: {} ({:.1}%)  Inactive: {} ({:.1}%)  Mandals: {}",
        s.total, s.active, s.active_percentage, s.inactive, s.inactive_percentage, s.mandals
    );
    println!(
        "Map: {} markers, {} without coordinates",
        view.markers.markers.len(),
        view.markers.skipped
    );

    println!();
    print_distribution(&view.info.chart_title, &view.distribution);
    println!();
    print_table(&view.info.table_title, &view.table);

    if !view.notifications.is_empty() {
        println!();
        for n in &view.notifications {
            println!("[{}] {}", n.level, n.message);
        }
    }

    if !view.activity.is_empty() {
        println!();
        println!("Recent activity");
        for entry in &view.activity {
            println!(
                "  {} {}: {}",
                entry.at.format("%H:%M:%S"),
                entry.title,
                entry.description
            );
        }
    }
}
