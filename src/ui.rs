use crate::charts::{bar_layout, pie_slices, BAR_COLOR};
use crate::dashboard::Dashboard;
use crate::modal::{ActionKind, ActionModal, ModalContent};
use crate::models::{ChartAggregate, Program, StudentRecord, YearLevel};
use crate::wizard::{
    AddWizard, DeleteStep, DeleteWizard, EditStep, EditWizard, SearchMode, SearchWizard,
    StudentForm, Wizard,
};
use std::fmt::Write;

pub fn render_index(dashboard: &Dashboard, alert: Option<&str>) -> String {
    fill_template(
        INDEX_HTML,
        &[
            ("ALERT", render_alert(alert)),
            ("ACTIONS", render_actions()),
            ("ROWS", render_rows(&dashboard.students, dashboard.menu_row)),
            ("MODAL", render_modal(&dashboard.modal)),
            ("PROGRAM_CHART", render_program_chart(dashboard.charts.as_ref())),
            ("YEAR_CHART", render_year_chart(dashboard.charts.as_ref())),
        ],
    )
}

/// Substitutes `{{KEY}}` markers in one left-to-right pass. Inserted values
/// are never scanned again, so record text cannot pull in other sections.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_alert(alert: Option<&str>) -> String {
    match alert {
        Some(message) => {
            let lines: Vec<String> = message.lines().map(escape_html).collect();
            format!(
                r#"<div class="alert" role="alert">{}</div>"#,
                lines.join("<br />")
            )
        }
        None => String::new(),
    }
}

fn render_actions() -> String {
    ActionKind::ALL
        .iter()
        .map(|kind| {
            format!(
                r#"<form method="post" action="/modal/open"><input type="hidden" name="kind" value="{kind}" /><button class="action" type="submit">{kind} Student</button></form>"#
            )
        })
        .collect()
}

fn render_rows(students: &[StudentRecord], menu_row: Option<usize>) -> String {
    if students.is_empty() {
        return r#"<tr><td colspan="6" class="empty">No students found.</td></tr>"#.to_string();
    }

    let mut html = String::new();
    for (index, student) in students.iter().enumerate() {
        let menu = if menu_row == Some(index) {
            format!(
                r#"<div class="row-menu"><form method="post" action="/rows/{index}/download"><button type="submit">Download</button></form></div>"#
            )
        } else {
            String::new()
        };
        let _ = write!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class="row-actions"><form method="post" action="/rows/{index}/menu"><button class="kebab" type="submit" aria-label="Row actions">&#8942;</button></form>{menu}</td></tr>"#,
            escape_html(&student.student_id),
            escape_html(&student.name),
            student.program,
            student.year_level,
            escape_html(&student.email_address),
        );
    }
    html
}

fn render_modal(modal: &ActionModal) -> String {
    let Some(content) = modal.content() else {
        return String::new();
    };

    let close = if modal.shows_close_button() {
        r#"<form method="post" action="/modal/close"><button class="close" type="submit" aria-label="Close">X</button></form>"#
    } else {
        ""
    };
    let body = match content {
        ModalContent::Wizard(Wizard::Add(wizard)) => render_add(wizard),
        ModalContent::Wizard(Wizard::Edit(wizard)) => render_edit(wizard),
        ModalContent::Wizard(Wizard::Delete(wizard)) => render_delete(wizard),
        ModalContent::Wizard(Wizard::Search(wizard)) => render_search(wizard),
        ModalContent::Unknown(_) => "<p>Unknown Action</p>".to_string(),
    };

    format!(
        r#"<div class="overlay"><div class="modal"><div class="modal-head"><h2>{}</h2>{close}</div>{body}</div></div>"#,
        escape_html(&modal.title())
    )
}

fn text_input(label: &str, name: &str, value: &str) -> String {
    format!(
        r#"<label>{label}<input type="text" name="{name}" value="{}" /></label>"#,
        escape_html(value)
    )
}

fn select_input(label: &str, name: &str, options: &[String], selected: &str) -> String {
    let mut html = format!(r#"<label>{label}<select name="{name}">"#);
    for option in options {
        let mark = if option == selected { " selected" } else { "" };
        let option = escape_html(option);
        let _ = write!(html, r#"<option value="{option}"{mark}>{option}</option>"#);
    }
    html.push_str("</select></label>");
    html
}

fn program_options(with_none: bool) -> Vec<String> {
    let lead = if with_none { "None" } else { "" };
    std::iter::once(lead.to_string())
        .chain(Program::ALL.iter().map(Program::to_string))
        .collect()
}

fn year_options(with_none: bool) -> Vec<String> {
    let lead = if with_none { "None" } else { "" };
    std::iter::once(lead.to_string())
        .chain(YearLevel::ALL.iter().map(YearLevel::to_string))
        .collect()
}

fn student_fields(draft: &StudentForm, include_id: bool) -> String {
    let mut html = text_input("Name", "name", &draft.name);
    if include_id {
        html.push_str(&text_input("Student ID", "student_id", &draft.student_id));
    }
    html.push_str(&select_input("Program", "program", &program_options(false), &draft.program));
    html.push_str(&select_input("Year Level", "year_level", &year_options(false), &draft.year_level));
    html.push_str(&text_input("Email Address", "email_address", &draft.email_address));
    html
}

fn render_add(wizard: &AddWizard) -> String {
    format!(
        r#"<form class="wizard" method="post" action="/wizard/add">{}<button type="submit">Add Student</button></form>"#,
        student_fields(&wizard.draft, true)
    )
}

fn render_edit(wizard: &EditWizard) -> String {
    let close = r#"<form method="post" action="/modal/close"><button class="secondary" type="submit">Close</button></form>"#;
    match wizard.step {
        EditStep::Lookup => format!(
            r#"<form class="wizard" method="post" action="/wizard/edit/lookup">{}<button type="submit">Find Student</button></form>{close}"#,
            text_input("Student ID", "student_id", &wizard.student_id)
        ),
        EditStep::Edit => format!(
            r#"<p class="fixed-id">Student ID: <strong>{}</strong></p><form class="wizard" method="post" action="/wizard/edit">{}<button type="submit">Save Changes</button></form>{close}"#,
            escape_html(&wizard.student_id),
            student_fields(&wizard.draft, false)
        ),
    }
}

fn render_delete(wizard: &DeleteWizard) -> String {
    match wizard.step {
        DeleteStep::Unlock => r#"<form class="wizard" method="post" action="/wizard/delete/unlock"><label>Password<input type="password" name="password" /></label><button type="submit">Continue</button></form>"#.to_string(),
        DeleteStep::Confirm => format!(
            r#"<form class="wizard" method="post" action="/wizard/delete">{}<button class="danger" type="submit">Delete Student</button></form>"#,
            text_input("Student ID", "student_id", &wizard.student_id)
        ),
    }
}

fn render_search(wizard: &SearchWizard) -> String {
    let active = wizard.mode();
    let mut modes = String::new();
    for (mode, label) in [
        (SearchMode::Name, "By name"),
        (SearchMode::StudentId, "By student ID"),
        (SearchMode::Filter, "By filter"),
    ] {
        let checked = if mode == active { " checked" } else { "" };
        let _ = write!(
            modes,
            r#"<label class="mode"><input type="radio" name="mode" value="{}"{checked} />{label}</label>"#,
            mode.as_str()
        );
    }

    let criteria = &wizard.criteria;
    format!(
        r#"<form class="wizard" method="post" action="/wizard/search"><div class="modes">{modes}</div>{}{}{}{}<button type="submit">Search</button></form>"#,
        text_input("Name", "name", &criteria.name),
        text_input("Student ID", "student_id", &criteria.student_id),
        select_input("Program", "program", &program_options(true), &criteria.program),
        select_input("Year Level", "year_level", &year_options(true), &criteria.year_level),
    )
}

fn render_program_chart(charts: Option<&ChartAggregate>) -> String {
    let Some(charts) = charts else {
        return r#"<p class="chart-empty">Loading</p>"#.to_string();
    };
    let slices = pie_slices(&charts.programs, 150.0, 130.0, 120.0);
    if slices.is_empty() {
        return r#"<p class="chart-empty">No data yet</p>"#.to_string();
    }

    let mut svg = String::from(
        r#"<svg class="chart" viewBox="0 0 300 260" role="img" aria-label="Program distribution">"#,
    );
    let mut legend = String::from(r#"<div class="legend">"#);
    for slice in &slices {
        let _ = write!(
            svg,
            r#"<path d="{}" fill="{}"><title>{}: {}</title></path>"#,
            slice.path, slice.color, slice.label, slice.value
        );
        let _ = write!(
            legend,
            r#"<span><i style="background:{}"></i>{} ({:.0}%)</span>"#,
            slice.color,
            slice.label,
            slice.share * 100.0
        );
    }
    svg.push_str("</svg>");
    legend.push_str("</div>");
    svg + &legend
}

fn render_year_chart(charts: Option<&ChartAggregate>) -> String {
    let Some(charts) = charts else {
        return r#"<p class="chart-empty">Loading</p>"#.to_string();
    };
    const LEFT: f64 = 36.0;
    const TOP: f64 = 12.0;
    const WIDTH: f64 = 300.0;
    const HEIGHT: f64 = 200.0;

    let layout = bar_layout(&charts.year_levels, WIDTH, HEIGHT);
    let mut svg = String::from(
        r#"<svg class="chart" viewBox="0 0 350 240" role="img" aria-label="Year level count">"#,
    );
    for tick in &layout.ticks {
        let y = TOP + HEIGHT - HEIGHT * *tick as f64 / layout.axis_max as f64;
        let _ = write!(
            svg,
            r#"<line class="grid" x1="{LEFT}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" /><text class="axis" x="{:.2}" y="{:.2}" text-anchor="end">{tick}</text>"#,
            LEFT + WIDTH,
            LEFT - 6.0,
            y + 4.0
        );
    }
    for bar in &layout.bars {
        let _ = write!(
            svg,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{BAR_COLOR}"><title>{}: {}</title></rect><text class="axis" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            LEFT + bar.x,
            TOP + bar.y,
            bar.width,
            bar.height,
            bar.label,
            bar.count,
            LEFT + bar.x + bar.width / 2.0,
            TOP + HEIGHT + 18.0,
            bar.label
        );
    }
    svg.push_str("</svg>");
    let _ = write!(
        svg,
        r#"<p class="chart-note">Counts as of {}</p>"#,
        charts.computed_at.format("%Y-%m-%d %H:%M")
    );
    svg
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Student Information System</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Montserrat:wght@400;600;700&display=swap');

    :root {
      --bg: #ddd7c5;
      --panel: #c7b784;
      --button: #B5A983;
      --head: #9f9271;
      --ink: #111;
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Montserrat", "Trebuchet MS", sans-serif;
    }

    header {
      text-align: center;
      padding: 24px 0 8px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(2rem, 4vw, 3rem);
    }

    header h2 {
      margin: 8px 0 0;
      font-size: clamp(1.4rem, 3vw, 2.2rem);
    }

    .layout {
      display: grid;
      grid-template-columns: 3fr 1fr;
      min-height: calc(100vh - 140px);
    }

    .main {
      display: flex;
      flex-direction: column;
      align-items: center;
      gap: 20px;
      padding: 16px;
    }

    .actions {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 20px;
    }

    button {
      appearance: none;
      cursor: pointer;
      font: inherit;
    }

    .action {
      background: var(--button);
      width: 220px;
      height: 50px;
      border: 2px solid black;
      border-radius: 10px;
      font-size: 1.2rem;
      text-transform: capitalize;
      transition: transform 200ms ease, box-shadow 200ms ease;
    }

    .action:hover {
      transform: translateY(-4px);
      box-shadow: 0 10px 18px rgba(0, 0, 0, 0.2);
    }

    .alert {
      background: #fff4e5;
      border: 2px solid #c63b2b;
      border-radius: 10px;
      padding: 12px 18px;
      color: #7a1f14;
      max-width: 640px;
    }

    .table-panel {
      background: var(--panel);
      width: 85%;
      max-height: 68vh;
      overflow-y: auto;
      border-radius: 24px;
      padding: 24px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      text-align: left;
    }

    th {
      background: var(--head);
      color: white;
    }

    th, td {
      border: 1px solid rgba(0, 0, 0, 0.3);
      padding: 8px;
    }

    td.empty {
      text-align: center;
    }

    .row-actions {
      position: relative;
      text-align: center;
    }

    .kebab {
      background: none;
      border: none;
      font-size: 1.2rem;
    }

    .row-menu {
      position: absolute;
      right: 8px;
      top: 36px;
      z-index: 10;
      background: white;
      border: 1px solid #ccc;
      border-radius: 6px;
      box-shadow: 0 6px 12px rgba(0, 0, 0, 0.15);
    }

    .row-menu button {
      background: none;
      border: none;
      padding: 8px 16px;
    }

    .stats {
      background: var(--button);
      border-left: 4px solid black;
      display: flex;
      flex-direction: column;
      align-items: center;
      gap: 24px;
      padding: 24px 12px;
    }

    .stats h3 {
      margin: 0 0 8px;
      font-size: 1.5rem;
      text-align: center;
    }

    .chart {
      width: 100%;
      max-width: 340px;
      display: block;
    }

    .chart .grid {
      stroke: rgba(0, 0, 0, 0.2);
      stroke-dasharray: 3 3;
    }

    .chart .axis {
      font-size: 11px;
      fill: black;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 6px 14px;
      font-size: 0.85rem;
    }

    .legend i {
      display: inline-block;
      width: 12px;
      height: 12px;
      border-radius: 50%;
      margin-right: 6px;
    }

    .chart-empty, .chart-note {
      text-align: center;
      font-size: 0.85rem;
    }

    .overlay {
      position: fixed;
      inset: 0;
      background: rgba(0, 0, 0, 0.5);
      display: flex;
      justify-content: center;
      align-items: center;
      z-index: 50;
    }

    .modal {
      background: white;
      border-radius: 14px;
      box-shadow: var(--shadow);
      padding: 32px;
      width: 420px;
      display: grid;
      gap: 12px;
    }

    .modal-head {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .modal-head h2 {
      margin: 0;
      font-size: 1.25rem;
    }

    .close {
      background: none;
      border: none;
      font-weight: 700;
      font-size: 1.1rem;
    }

    .wizard {
      display: grid;
      gap: 10px;
    }

    .wizard label {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
    }

    .wizard input, .wizard select {
      padding: 8px;
      border: 1px solid #999;
      border-radius: 6px;
      font: inherit;
    }

    .wizard button, .secondary {
      background: var(--button);
      border: 2px solid black;
      border-radius: 8px;
      padding: 10px;
    }

    .wizard .danger {
      background: #c63b2b;
      color: white;
    }

    .modes {
      display: flex;
      gap: 12px;
    }

    .wizard label.mode {
      display: flex;
      align-items: center;
      gap: 4px;
    }

    @media (max-width: 900px) {
      .layout {
        grid-template-columns: 1fr;
      }
      .stats {
        border-left: none;
        border-top: 4px solid black;
      }
    }
  </style>
</head>
<body>
  <header>
    <h1>Hanlim University</h1>
    <h2>Student Information System</h2>
  </header>

  <div class="layout">
    <main class="main">
      <section class="actions">{{ACTIONS}}</section>
      {{ALERT}}
      <section class="table-panel">
        <table>
          <thead>
            <tr>
              <th>Student ID</th>
              <th>Name</th>
              <th>Program</th>
              <th>Year Level</th>
              <th>Email Address</th>
              <th>Actions</th>
            </tr>
          </thead>
          <tbody>{{ROWS}}</tbody>
        </table>
      </section>
    </main>

    <aside class="stats">
      <div>
        <h3>Program Distribution</h3>
        {{PROGRAM_CHART}}
      </div>
      <div>
        <h3>Year Level Count</h3>
        {{YEAR_CHART}}
      </div>
    </aside>
  </div>

  {{MODAL}}
</body>
</html>
"#;
