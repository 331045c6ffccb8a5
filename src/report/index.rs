//! Renders every month's chart and a small HTML page with a month dropdown
//! that swaps the chart image.

use super::{chart, top_for_month};
use crate::aggregate::TrendRow;
use crate::month::Month;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One chart per month present in `table`, plus `index.html` in `out_dir`.
/// The page defaults to the latest month.
pub fn render_all(table: &[TrendRow], k: usize, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut months: Vec<Month> = table.iter().map(|r| r.month).collect();
    months.sort_unstable();
    months.dedup();
    if months.is_empty() {
        // An index over zero months would point its <img> at nothing.
        anyhow::bail!("monthly table is empty; no charts to render");
    }

    let charts_dir = out_dir.join("charts");
    let mut rendered = Vec::with_capacity(months.len());
    for &month in &months {
        // Cannot be NoData: every month here came from the table itself.
        let rows = top_for_month(table, month, k)?;
        rendered.push(chart::render_month_chart(&rows, month, k, &charts_dir)?);
    }

    let index_path = out_dir.join("index.html");
    fs::write(&index_path, index_html(&months))
        .with_context(|| format!("writing {}", index_path.display()))?;

    info!(
        charts = rendered.len(),
        index = %index_path.display(),
        "rendered all months"
    );
    Ok(rendered)
}

fn index_html(months: &[Month]) -> String {
    let options: Vec<String> = months.iter().map(|m| format!("'{m}'")).collect();
    format!(
        r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>F1 Top-10 by Month</title></head>
  <body>
    <label for="m">Month:</label>
    <select id="m"></select>
    <br/><br/>
    <img id="chart" width="900"/>
    <script>
      const months=[{options}];
      const sel=document.getElementById('m');
      months.forEach(x=>{{const o=document.createElement('option');o.value=x;o.textContent=x;sel.appendChild(o);}});
      function set(x){{document.getElementById('chart').src='charts/top10_'+x+'.png'; sel.value=x;}}
      set(months[months.length-1]);
      sel.onchange=()=>set(sel.value);
    </script>
  </body>
</html>
"#,
        options = options.join(",")
    )
}
