use crate::gateway::{Gateway, StudentFilter};
use crate::models::{ChartAggregate, Program, ProgramCount, YearCount, YearLevel};
use chrono::{DateTime, Local};
use futures::future::join_all;
use std::f64::consts::PI;
use tracing::warn;

/// Slice order of the program chart.
pub const PROGRAM_ORDER: [Program; 5] = [
    Program::Engineering,
    Program::Architecture,
    Program::Accountancy,
    Program::Education,
    Program::Medical,
];

pub const PALETTE: [&str; 5] = ["#FFCC33", "#FFB84D", "#FFA500", "#FF8C00", "#FF7F32"];
pub const BAR_COLOR: &str = "#887d61";

/// Runs the nine count queries concurrently and assembles both series.
pub async fn fetch_aggregate(gateway: &Gateway) -> ChartAggregate {
    let programs = join_all(
        PROGRAM_ORDER
            .iter()
            .map(|program| count_matching(gateway, StudentFilter::program(*program))),
    );
    let years = join_all(
        YearLevel::ALL
            .iter()
            .map(|year| count_matching(gateway, StudentFilter::year_level(*year))),
    );
    let (program_counts, year_counts) = futures::join!(programs, years);
    build_aggregate(&program_counts, &year_counts, Local::now())
}

async fn count_matching(gateway: &Gateway, filter: StudentFilter) -> u64 {
    match gateway.view_students(&filter).await {
        Ok(reply) => reply.students.map_or(0, |students| students.len() as u64),
        Err(err) => {
            warn!(%err, ?filter, "count query failed, counting as zero");
            0
        }
    }
}

/// Slots are positional: `program_counts[i]` belongs to `PROGRAM_ORDER[i]`
/// and `year_counts[i]` to year `i + 1`. Missing slots count as zero.
pub fn build_aggregate(
    program_counts: &[u64],
    year_counts: &[u64],
    computed_at: DateTime<Local>,
) -> ChartAggregate {
    let programs = PROGRAM_ORDER
        .iter()
        .enumerate()
        .map(|(index, program)| ProgramCount {
            name: *program,
            value: program_counts.get(index).copied().unwrap_or(0),
        })
        .collect();

    let year_levels = YearLevel::ALL
        .iter()
        .enumerate()
        .map(|(index, year)| YearCount {
            year: format!("Year {year}"),
            count: year_counts.get(index).copied().unwrap_or(0),
        })
        .collect();

    ChartAggregate {
        programs,
        year_levels,
        computed_at,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
    pub share: f64,
    pub color: &'static str,
    pub path: String,
}

/// SVG paths for a pie centred on (`cx`, `cy`). Zero-valued entries get no
/// slice; an all-zero series yields no slices at all.
pub fn pie_slices(programs: &[ProgramCount], cx: f64, cy: f64, radius: f64) -> Vec<PieSlice> {
    let total: u64 = programs.iter().map(|entry| entry.value).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut slices = Vec::new();
    let mut angle = -PI / 2.0;
    for (index, entry) in programs.iter().enumerate() {
        if entry.value == 0 {
            continue;
        }
        let share = entry.value as f64 / total as f64;
        let sweep = share * 2.0 * PI;
        let path = if entry.value == total {
            // A single full slice cannot be drawn as one arc.
            format!(
                "M {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} A {r:.2} {r:.2} 0 1 1 {:.2} {:.2} Z",
                cx,
                cy - radius,
                cx,
                cy + radius,
                cx,
                cy - radius,
                r = radius
            )
        } else {
            let (x1, y1) = (cx + radius * angle.cos(), cy + radius * angle.sin());
            let end = angle + sweep;
            let (x2, y2) = (cx + radius * end.cos(), cy + radius * end.sin());
            let large_arc = if sweep > PI { 1 } else { 0 };
            format!(
                "M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {radius:.2} {radius:.2} 0 {large_arc} 1 {x2:.2} {y2:.2} Z"
            )
        };
        angle += sweep;

        slices.push(PieSlice {
            label: entry.name.to_string(),
            value: entry.value,
            share,
            color: PALETTE[index % PALETTE.len()],
            path,
        });
    }
    slices
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub bars: Vec<Bar>,
    /// Whole-number axis ticks from zero to the axis maximum.
    pub ticks: Vec<u64>,
    pub axis_max: u64,
}

/// Lays out one bar per year inside a plot area `width` by `height`,
/// with the baseline at `height`.
pub fn bar_layout(years: &[YearCount], width: f64, height: f64) -> BarLayout {
    let max = years.iter().map(|entry| entry.count).max().unwrap_or(0);
    let step = max.div_ceil(4).max(1);
    let axis_max = step * 4;
    let ticks = (0..=4).map(|tick| tick * step).collect();

    let slot = if years.is_empty() {
        0.0
    } else {
        width / years.len() as f64
    };
    let bar_width = slot * 0.6;
    let bars = years
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let bar_height = height * entry.count as f64 / axis_max as f64;
            Bar {
                label: entry.year.clone(),
                count: entry.count,
                x: slot * index as f64 + (slot - bar_width) / 2.0,
                y: height - bar_height,
                width: bar_width,
                height: bar_height,
            }
        })
        .collect();

    BarLayout {
        bars,
        ticks,
        axis_max,
    }
}
